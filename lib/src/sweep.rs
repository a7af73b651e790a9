use std::{
    fs,
    io,
    path::{
        Path,
        PathBuf,
    },
    thread::{
        self,
        JoinHandle,
    },
};

use thiserror::Error;

use crate::{
    CancelToken,
    MatchKind,
    MatchRecord,
    PathEx,
};

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("{0} no longer exists")]
    Vanished(PathBuf),

    #[error("io: {0}")]
    IoError(#[from] io::Error),
}

#[derive(Debug)]
pub enum SweepReport {
    Sweeping {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Swept {
        path: PathBuf,
        size_bytes: u64,
    },
    Failed {
        path: PathBuf,
        error: SweepError,
    },
}

pub trait SweepReportConsumer {
    fn consume_report(&mut self, report: SweepReport);
}

pub struct VoidSweepReportConsumer;
impl SweepReportConsumer for VoidSweepReportConsumer {
    fn consume_report(&mut self, _report: SweepReport) {}
}

pub struct SweepOptions {
    /// Do not remove anything, only check that every target still exists.
    pub dry_run: bool,

    /// Checked between two targets.
    pub cancel: CancelToken,

    pub report_consumer: Box<dyn SweepReportConsumer + Send>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            cancel: CancelToken::new(),
            report_consumer: Box::new(VoidSweepReportConsumer),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub deleted: usize,
    pub errors: usize,
    pub bytes_freed: u64,

    /// The batch has been cancelled before all targets were processed.
    pub cancelled: bool,
}

/// Remove all targets one after another.
///
/// Targets are processed in reverse order. For targets in scan order this means
/// nested entries are removed before their parents. A single failure never
/// aborts the batch.
pub fn sweep(targets: &[MatchRecord], options: &mut SweepOptions) -> SweepSummary {
    let mut summary = SweepSummary::default();
    let mut removed = Vec::<&Path>::with_capacity(targets.len());

    for (index, target) in targets.iter().enumerate().rev() {
        if options.cancel.is_cancelled() {
            log::debug!(
                "Sweep cancelled with {} of {} targets left",
                index + 1,
                targets.len()
            );
            summary.cancelled = true;
            break;
        }

        options
            .report_consumer
            .consume_report(SweepReport::Sweeping {
                index: targets.len() - index - 1,
                total: targets.len(),
                path: target.path().to_owned(),
            });

        match sweep_target(target, options.dry_run) {
            Ok(()) => {
                log::trace!("Removed {}", target.path().display());
                summary.deleted += 1;
                summary.bytes_freed += target.size_bytes();
                removed.push(target.path());

                options.report_consumer.consume_report(SweepReport::Swept {
                    path: target.path().to_owned(),
                    size_bytes: target.size_bytes(),
                });
            }
            Err(SweepError::Vanished(_))
                if removed.iter().any(|parent| target.path().is_within(parent)) =>
            {
                /* already removed together with one of its parents */
                log::trace!("{} already removed by parent", target.path().display());
                summary.deleted += 1;

                options.report_consumer.consume_report(SweepReport::Swept {
                    path: target.path().to_owned(),
                    size_bytes: 0,
                });
            }
            Err(error) => {
                log::warn!("Failed to remove {}: {:#}", target.path().display(), error);
                summary.errors += 1;

                options.report_consumer.consume_report(SweepReport::Failed {
                    path: target.path().to_owned(),
                    error,
                });
            }
        }
    }

    summary
}

/// Run [sweep] on a dedicated worker thread.
pub fn execute(targets: Vec<MatchRecord>, mut options: SweepOptions) -> JoinHandle<SweepSummary> {
    thread::spawn(move || {
        let summary = sweep(&targets, &mut options);
        log::debug!(
            "Sweep finished: {} deleted, {} errors",
            summary.deleted,
            summary.errors
        );
        summary
    })
}

fn sweep_target(target: &MatchRecord, dry_run: bool) -> Result<(), SweepError> {
    let path = target.path();
    let vanished = |error: io::Error| {
        if error.kind() == io::ErrorKind::NotFound {
            SweepError::Vanished(path.to_owned())
        } else {
            SweepError::IoError(error)
        }
    };

    /* the set may be stale since it has been scanned */
    let metadata = fs::symlink_metadata(path).map_err(vanished)?;
    if dry_run {
        return Ok(());
    }

    match target.kind() {
        MatchKind::Folder if metadata.is_dir() => fs::remove_dir_all(path).map_err(vanished)?,
        _ => fs::remove_file(path).map_err(vanished)?,
    }

    Ok(())
}
