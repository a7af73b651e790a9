use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        Arc,
        Mutex,
    },
};

use dirsweep::{
    sweep::{
        self,
        SweepOptions,
        SweepReport,
        SweepReportConsumer,
    },
    CancelToken,
    MatchKind,
    MatchRecord,
    PatternSet,
    ScanEngine,
    ScanOptions,
    SweepError,
};

#[derive(Clone, Default)]
struct FailureLog {
    failed: Arc<Mutex<Vec<(PathBuf, bool)>>>,
    sweeping: Arc<Mutex<Vec<usize>>>,
}

impl SweepReportConsumer for FailureLog {
    fn consume_report(&mut self, report: SweepReport) {
        match report {
            SweepReport::Failed { path, error } => {
                let vanished = matches!(error, SweepError::Vanished(_));
                self.failed.lock().unwrap().push((path, vanished));
            }
            SweepReport::Sweeping { index, .. } => self.sweeping.lock().unwrap().push(index),
            SweepReport::Swept { .. } => {}
        }
    }
}

fn write_file(root: &Path, relative: &str, size: usize) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![b'x'; size]).unwrap();
}

fn folder(path: PathBuf) -> MatchRecord {
    MatchRecord::new(path, MatchKind::Folder, 0, "test".to_string())
}

fn file(path: PathBuf) -> MatchRecord {
    MatchRecord::new(path, MatchKind::File, 0, "test".to_string())
}

#[test]
fn removes_scanned_targets() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "proj/node_modules/a.txt", 10);
    write_file(root.path(), "proj/__pycache__/x.pyc", 7);
    write_file(root.path(), "proj/debug.log", 3);
    write_file(root.path(), "proj/src/main.py", 5);

    let engine = ScanEngine::new(PatternSet::parse("node_modules, __pycache__", "log")).unwrap();
    let targets = engine
        .scan(vec![root.path().to_owned()], ScanOptions::default())
        .collect::<Vec<_>>();
    assert_eq!(targets.len(), 3);

    let summary = sweep::sweep(&targets, &mut SweepOptions::default());
    assert_eq!(summary.deleted, 3);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.bytes_freed, 20);
    assert!(!summary.cancelled);

    assert!(!root.path().join("proj/node_modules").exists());
    assert!(!root.path().join("proj/__pycache__").exists());
    assert!(!root.path().join("proj/debug.log").exists());
    assert!(root.path().join("proj/src/main.py").exists());
}

#[test]
fn vanished_target_counts_as_error_and_batch_continues() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "a/node_modules/x.js", 1);
    write_file(root.path(), "b/node_modules/y.js", 1);
    write_file(root.path(), "c.log", 1);

    let targets = vec![
        folder(root.path().join("a/node_modules")),
        folder(root.path().join("b/node_modules")),
        file(root.path().join("c.log")),
    ];
    fs::remove_dir_all(root.path().join("b/node_modules")).unwrap();

    let log = FailureLog::default();
    let summary = sweep::sweep(
        &targets,
        &mut SweepOptions {
            report_consumer: Box::new(log.clone()),
            ..Default::default()
        },
    );

    assert_eq!(summary.deleted + summary.errors, targets.len());
    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(
        *log.failed.lock().unwrap(),
        [(root.path().join("b/node_modules"), true)]
    );
    assert_eq!(*log.sweeping.lock().unwrap(), [0, 1, 2]);
    assert!(!root.path().join("a/node_modules").exists());
    assert!(!root.path().join("c.log").exists());
}

#[test]
fn descendant_removed_with_parent_is_not_an_error() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "build/cache/data.bin", 4);
    write_file(root.path(), "build/trace.log", 4);

    /* descendants first, so the parent is processed first */
    let targets = vec![
        file(root.path().join("build/trace.log")),
        folder(root.path().join("build/cache")),
        folder(root.path().join("build")),
    ];

    let summary = sweep::sweep(&targets, &mut SweepOptions::default());
    assert_eq!(summary.deleted, 3);
    assert_eq!(summary.errors, 0);
    assert!(!root.path().join("build").exists());
}

#[test]
fn dry_run_keeps_everything() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "dist/app.js", 2);
    write_file(root.path(), "debug.log", 2);

    let targets = vec![
        folder(root.path().join("dist")),
        file(root.path().join("debug.log")),
        file(root.path().join("gone.log")),
    ];

    let summary = sweep::sweep(
        &targets,
        &mut SweepOptions {
            dry_run: true,
            ..Default::default()
        },
    );

    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.errors, 1);
    assert!(root.path().join("dist/app.js").exists());
    assert!(root.path().join("debug.log").exists());
}

#[test]
fn cancelled_sweep_removes_nothing_more() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "one.log", 1);
    write_file(root.path(), "two.log", 1);

    let targets = vec![
        file(root.path().join("one.log")),
        file(root.path().join("two.log")),
    ];

    let cancel = CancelToken::new();
    cancel.cancel();
    let summary = sweep::sweep(
        &targets,
        &mut SweepOptions {
            cancel,
            ..Default::default()
        },
    );

    assert!(summary.cancelled);
    assert_eq!(summary.deleted, 0);
    assert_eq!(summary.errors, 0);
    assert!(root.path().join("one.log").exists());
}

#[test]
fn execute_runs_on_worker() {
    let root = tempfile::tempdir().unwrap();
    write_file(root.path(), "node_modules/a.js", 1);

    let targets = vec![folder(root.path().join("node_modules"))];
    let summary = sweep::execute(targets, SweepOptions::default())
        .join()
        .unwrap();

    assert_eq!(summary.deleted, 1);
    assert!(!root.path().join("node_modules").exists());
}

#[cfg(unix)]
#[test]
fn linked_folder_is_removed_as_link() {
    let store = tempfile::tempdir().unwrap();
    write_file(store.path(), "pkg/a.js", 9);

    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("proj")).unwrap();
    let link = root.path().join("proj/node_modules");
    std::os::unix::fs::symlink(store.path(), &link).unwrap();

    let engine = ScanEngine::new(PatternSet::parse("node_modules", "")).unwrap();
    let targets = engine
        .scan(vec![root.path().to_owned()], ScanOptions::default())
        .collect::<Vec<_>>();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].kind(), MatchKind::Folder);

    let summary = sweep::sweep(&targets, &mut SweepOptions::default());
    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.errors, 0);

    assert!(fs::symlink_metadata(&link).is_err());
    assert!(store.path().join("pkg/a.js").exists());
}
