use std::{
    ffi::OsStr,
    fs::{
        self,
        DirEntry,
    },
    path::Path,
};

static EMPTY_STR: &'static str = "";

/// Utility functions for the systems path library
pub trait PathEx {
    /// Returns the file name from the current path, or an empty string if the file name is empty
    fn file_name_truncate(&self) -> &str;

    /// Tests if the path is `ancestor` itself or located somewhere below it
    fn is_within(&self, ancestor: &Path) -> bool;
}

impl PathEx for Path {
    fn file_name_truncate(&self) -> &str {
        self.file_name()
            .map(OsStr::to_str)
            .flatten()
            .unwrap_or(EMPTY_STR)
    }

    fn is_within(&self, ancestor: &Path) -> bool {
        self.starts_with(ancestor)
    }
}

/// File type helpers which never follow symbolic links.
/// A link is neither a directory nor a regular file.
pub trait DirEntryEx {
    fn is_file(&self) -> bool;
    fn is_dir(&self) -> bool;

    /// Tests if the entry is a symbolic link resolving to a directory.
    fn is_dir_link(&self) -> bool;
}

impl DirEntryEx for DirEntry {
    fn is_file(&self) -> bool {
        self.file_type()
            .map_or(false, |file_type| file_type.is_file())
    }

    fn is_dir(&self) -> bool {
        self.file_type()
            .map_or(false, |file_type| file_type.is_dir())
    }

    fn is_dir_link(&self) -> bool {
        let is_link = self
            .file_type()
            .map_or(false, |file_type| file_type.is_symlink());

        is_link && fs::metadata(self.path()).map_or(false, |meta| meta.is_dir())
    }
}
