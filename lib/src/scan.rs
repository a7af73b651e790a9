use std::{
    collections::VecDeque,
    io,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        atomic::{
            AtomicBool,
            AtomicUsize,
            Ordering,
        },
        mpsc::{
            self,
            Receiver,
        },
        Arc,
        Mutex,
    },
    thread::{
        self,
        JoinHandle,
    },
};

use thiserror::Error;

use crate::{
    fs,
    CancelToken,
    DirEntryEx,
    PatternMatcher,
    PatternSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Folder,
    File,
}

impl MatchKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

/// A filesystem entry which matched one of the scan patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    path: PathBuf,
    kind: MatchKind,
    size_bytes: u64,
    matched_pattern: String,
}

impl MatchRecord {
    pub fn new(path: PathBuf, kind: MatchKind, size_bytes: u64, matched_pattern: String) -> Self {
        Self {
            path,
            kind,
            size_bytes,
            matched_pattern,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// For folders the sum of all regular files below it.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn matched_pattern(&self) -> &str {
        &self.matched_pattern
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("no folder or file patterns given")]
    EmptyPatterns,

    #[error("no scan root given")]
    NoRoots,

    #[error("scan root {0} does not exist")]
    RootMissing(PathBuf),

    #[error("scan root {0} is not a directory")]
    RootNotDirectory(PathBuf),
}

#[derive(Debug)]
pub enum ScanReport {
    RootStarted {
        index: usize,
        total: usize,
        root: PathBuf,
    },
    StatusInspecting(PathBuf),
    /// Summing up the size of a matched folder.
    StatusSizing(PathBuf),
    TargetFound {
        found: usize,
    },
    ErrorFs {
        path: PathBuf,
        error: io::Error,
    },
}

pub trait ScanReportConsumer {
    fn consume_report(&mut self, report: ScanReport);
}

pub struct VoidScanReportConsumer;
impl ScanReportConsumer for VoidScanReportConsumer {
    fn consume_report(&mut self, _report: ScanReport) {}
}

pub struct ScanOptions {
    /// Calculate the size of every match.
    /// For folders this requires walking the whole matched subtree.
    pub include_sizes: bool,

    pub report_consumer: Box<dyn ScanReportConsumer + Send>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_sizes: true,
            report_consumer: Box::new(VoidScanReportConsumer),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    cancel: CancelToken,
    scanning: AtomicBool,
    found: AtomicUsize,
    current_root: Mutex<Option<PathBuf>>,
}

/// Handle to a single scan invocation.
///
/// The handle can be cloned and moved to other threads to observe progress or
/// to cancel the scan it belongs to. Every scan has its own session.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    state: Arc<SessionState>,
}

impl ScanSession {
    pub fn cancel(&self) {
        self.state.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancel.is_cancelled()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.state.cancel.clone()
    }

    /// Advisory only.
    pub fn is_scanning(&self) -> bool {
        self.state.scanning.load(Ordering::Relaxed)
    }

    pub fn found_count(&self) -> usize {
        self.state.found.load(Ordering::Relaxed)
    }

    pub fn current_root(&self) -> Option<PathBuf> {
        self.state
            .current_root
            .lock()
            .ok()
            .and_then(|root| root.clone())
    }
}

pub struct ScanEngine {
    matcher: Arc<PatternMatcher>,
    active_scans: Arc<AtomicUsize>,
}

impl ScanEngine {
    pub fn new(patterns: PatternSet) -> Result<Self, ScanError> {
        if patterns.is_empty() {
            return Err(ScanError::EmptyPatterns);
        }

        Ok(Self {
            matcher: Arc::new(PatternMatcher::new(&patterns)),
            active_scans: Default::default(),
        })
    }

    /// Make sure every root exists and is a directory.
    pub fn validate_roots(roots: &[PathBuf]) -> Result<(), ScanError> {
        if roots.is_empty() {
            return Err(ScanError::NoRoots);
        }

        for root in roots {
            if !root.exists() {
                return Err(ScanError::RootMissing(root.clone()));
            }

            if !root.is_dir() {
                return Err(ScanError::RootNotDirectory(root.clone()));
            }
        }

        Ok(())
    }

    /// Returns true while any scan created by this engine is still alive.
    pub fn is_scanning(&self) -> bool {
        self.active_scans.load(Ordering::Relaxed) > 0
    }

    /// Create a lazy scan over all roots.
    /// No filesystem access happens until the returned iterator is polled.
    pub fn scan(&self, roots: Vec<PathBuf>, options: ScanOptions) -> Scan {
        let session = ScanSession::default();
        session.state.scanning.store(true, Ordering::Relaxed);
        self.active_scans.fetch_add(1, Ordering::Relaxed);

        Scan {
            session,
            matcher: self.matcher.clone(),
            options,

            root_count: roots.len(),
            roots: roots.into(),
            pending_dirs: Vec::with_capacity(64),
            pending_matches: VecDeque::new(),

            active_scans: Some(self.active_scans.clone()),
        }
    }

    /// Scan all roots on a dedicated worker thread.
    ///
    /// Matches are sent through the returned receiver. Dropping the receiver
    /// stops the scan at the next match.
    pub fn execute(
        &self,
        roots: Vec<PathBuf>,
        options: ScanOptions,
    ) -> (ScanSession, JoinHandle<()>, Receiver<MatchRecord>) {
        let scan = self.scan(roots, options);
        let session = scan.session().clone();

        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            for record in scan {
                if tx.send(record).is_err() {
                    /* Abort search */
                    log::debug!("Aborting scan as receiving end has been closed");
                    break;
                }
            }
        });

        (session, handle, rx)
    }
}

struct PendingMatch {
    path: PathBuf,
    kind: MatchKind,
    pattern: String,
}

/// Lazy, pre-order scan over one or more roots.
///
/// Matched folders are reported but never descended into.
pub struct Scan {
    session: ScanSession,
    matcher: Arc<PatternMatcher>,
    options: ScanOptions,

    root_count: usize,
    roots: VecDeque<PathBuf>,
    pending_dirs: Vec<PathBuf>,
    pending_matches: VecDeque<PendingMatch>,

    /* Some(_) until the scan has been finished */
    active_scans: Option<Arc<AtomicUsize>>,
}

impl Scan {
    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    fn finish(&mut self) {
        let Some(active_scans) = self.active_scans.take() else {
            return;
        };

        self.pending_dirs.clear();
        self.pending_matches.clear();
        self.roots.clear();

        self.session.state.scanning.store(false, Ordering::Relaxed);
        active_scans.fetch_sub(1, Ordering::Relaxed);
    }

    fn start_root(&mut self, root: PathBuf) {
        let index = self.root_count - self.roots.len() - 1;
        log::debug!("Scanning root {}", root.display());

        if let Ok(mut current_root) = self.session.state.current_root.lock() {
            *current_root = Some(root.clone());
        }

        self.options
            .report_consumer
            .consume_report(ScanReport::RootStarted {
                index,
                total: self.root_count,
                root: root.clone(),
            });
        self.pending_dirs.push(root);
    }

    fn visit_directory(&mut self, dir: PathBuf) {
        self.options
            .report_consumer
            .consume_report(ScanReport::StatusInspecting(dir.clone()));

        let entries = match fs::read_dir_sorted(&dir) {
            Ok(entries) => entries,
            Err(error) => {
                log::warn!("Failed to read directory {}: {:#}", dir.display(), error);
                self.options
                    .report_consumer
                    .consume_report(ScanReport::ErrorFs { path: dir, error });
                return;
            }
        };

        let mut descend = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let dir_link = entry.is_dir_link();
            if entry.is_dir() || dir_link {
                let name = entry.file_name();
                match self.matcher.match_folder(&name.to_string_lossy()) {
                    Some(pattern) => self.pending_matches.push_back(PendingMatch {
                        path: entry.path(),
                        kind: MatchKind::Folder,
                        pattern: pattern.to_string(),
                    }),
                    None if dir_link => {
                        /* links are never descended into */
                        log::trace!("Skipping directory link {}", entry.path().display());
                    }
                    None => descend.push(entry.path()),
                }
            } else {
                files.push(entry);
            }
        }

        for entry in files {
            let name = entry.file_name();
            if let Some(pattern) = self.matcher.match_file(&name.to_string_lossy()) {
                self.pending_matches.push_back(PendingMatch {
                    path: entry.path(),
                    kind: MatchKind::File,
                    pattern: pattern.to_string(),
                });
            }
        }

        /* the stack pops from the back, keep the name order */
        self.pending_dirs.extend(descend.into_iter().rev());
    }

    fn resolve_match(&mut self, pending: PendingMatch) -> MatchRecord {
        let size_bytes = match (self.options.include_sizes, pending.kind) {
            (false, _) => 0,
            (true, MatchKind::File) => fs::file_size(&pending.path),
            (true, MatchKind::Folder) => {
                self.options
                    .report_consumer
                    .consume_report(ScanReport::StatusSizing(pending.path.clone()));
                fs::directory_size(&pending.path, Some(&self.session.state.cancel))
            }
        };

        MatchRecord::new(pending.path, pending.kind, size_bytes, pending.pattern)
    }
}

impl Iterator for Scan {
    type Item = MatchRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while self.active_scans.is_some() {
            if self.session.is_cancelled() {
                log::debug!(
                    "Scan cancelled after {} matches",
                    self.session.found_count()
                );
                self.finish();
                break;
            }

            if let Some(pending) = self.pending_matches.pop_front() {
                let record = self.resolve_match(pending);
                if self.session.is_cancelled() {
                    /* size calculation may have been cut short */
                    continue;
                }

                let found = self.session.state.found.fetch_add(1, Ordering::Relaxed) + 1;
                log::trace!(
                    "Identified {} {} by {}",
                    record.kind().name(),
                    record.path().display(),
                    record.matched_pattern()
                );
                self.options
                    .report_consumer
                    .consume_report(ScanReport::TargetFound { found });
                return Some(record);
            }

            if let Some(dir) = self.pending_dirs.pop() {
                self.visit_directory(dir);
                continue;
            }

            if let Some(root) = self.roots.pop_front() {
                self.start_root(root);
                continue;
            }

            log::debug!(
                "Scan finished with {} matches",
                self.session.found_count()
            );
            self.finish();
        }

        None
    }
}

impl Drop for Scan {
    fn drop(&mut self) {
        self.finish();
    }
}
