use std::{
    fs::{
        self,
        DirEntry,
    },
    io,
    path::Path,
};

use crate::{
    CancelToken,
    DirEntryEx,
};

pub(crate) struct DirWalker {
    pending_entries: Vec<DirEntry>,
}

impl DirWalker {
    pub fn new() -> Self {
        Self {
            pending_entries: Vec::with_capacity(1024),
        }
    }

    pub fn next_item(&mut self) -> Option<DirEntry> {
        self.pending_entries.pop()
    }

    pub fn insert_entries(&mut self, path: &Path) -> io::Result<()> {
        for entry in fs::read_dir(path)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_err) => continue,
            };

            self.pending_entries.push(entry);
        }

        Ok(())
    }
}

/// Read all entries of a directory ordered by their file name.
/// Entries which fail to be read are skipped.
pub(crate) fn read_dir_sorted(path: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(path)?
        .filter_map(Result::ok)
        .collect::<Vec<_>>();

    entries.sort_by_key(DirEntry::file_name);
    Ok(entries)
}

/// Size of a single file in bytes or zero if it could not be inspected.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map_or(0, |meta| meta.len())
}

/// Sum of all regular file sizes below `dir`.
///
/// Unreadable files and directories contribute nothing. Symbolic links are not followed,
/// which includes `dir` itself: a link to a directory has a size of zero.
/// When `cancel` fires the walk stops and the partial sum is returned.
pub fn directory_size(dir: &Path, cancel: Option<&CancelToken>) -> u64 {
    if fs::symlink_metadata(dir).map_or(false, |meta| meta.file_type().is_symlink()) {
        return 0;
    }

    let mut walker = DirWalker::new();
    let _ = walker.insert_entries(dir);

    let mut size_total = 0;
    while let Some(entry) = walker.next_item() {
        if cancel.map_or(false, CancelToken::is_cancelled) {
            break;
        }

        if entry.is_dir() {
            let _ = walker.insert_entries(&entry.path());
        } else if entry.is_file() {
            size_total += entry.metadata().map_or(0, |meta| meta.len());
        }
    }

    size_total
}
