use std::{
    path::PathBuf,
    sync::{
        Arc,
        Mutex,
    },
    thread::JoinHandle,
};

use crossterm::event::{
    Event,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    format_file_size,
    sweep::{
        self,
        SweepOptions,
        SweepReport,
        SweepReportConsumer,
        SweepSummary,
    },
    CancelToken,
    MatchRecord,
    PathEx,
};
use ratatui::{
    buffer::Buffer,
    layout::{
        Constraint,
        Layout,
        Rect,
    },
    style::Stylize,
    text::Line,
    widgets::{
        Gauge,
        List,
        Widget,
    },
};

const FAILURE_HISTORY: usize = 128;

#[derive(Debug, Default)]
struct SweepProgress {
    current: Option<(usize, PathBuf)>,
    processed: usize,
    failures: Vec<String>,
}

struct UiSweepConsumer {
    progress: Arc<Mutex<SweepProgress>>,
}

impl SweepReportConsumer for UiSweepConsumer {
    fn consume_report(&mut self, report: SweepReport) {
        let Ok(mut progress) = self.progress.lock() else {
            return;
        };

        match report {
            SweepReport::Sweeping { index, path, .. } => progress.current = Some((index, path)),
            SweepReport::Swept { .. } => progress.processed += 1,
            SweepReport::Failed { path, error } => {
                progress.processed += 1;
                if progress.failures.len() < FAILURE_HISTORY {
                    progress
                        .failures
                        .push(format!("{}: {:#}", path.display(), error));
                }
            }
        }
    }
}

pub struct SweepingWidget {
    target_count: usize,
    dry_run: bool,

    cancel: CancelToken,
    progress: Arc<Mutex<SweepProgress>>,
    sweep_handle: Option<JoinHandle<SweepSummary>>,
    summary: Option<SweepSummary>,
}

impl SweepingWidget {
    pub fn new(targets: Vec<MatchRecord>, dry_run: bool) -> Self {
        let progress = Arc::new(Mutex::new(SweepProgress::default()));
        let cancel = CancelToken::new();

        log::info!(
            "Sweeping {} targets{}",
            targets.len(),
            if dry_run { " (dry run)" } else { "" }
        );

        let target_count = targets.len();
        let sweep_handle = sweep::execute(
            targets,
            SweepOptions {
                dry_run,
                cancel: cancel.clone(),
                report_consumer: Box::new(UiSweepConsumer {
                    progress: progress.clone(),
                }),
            },
        );

        Self {
            target_count,
            dry_run,

            cancel,
            progress,
            sweep_handle: Some(sweep_handle),
            summary: None,
        }
    }

    /// True once the worker has been joined and a summary is available.
    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    pub fn poll(&mut self) {
        if !self
            .sweep_handle
            .as_ref()
            .map_or(false, JoinHandle::is_finished)
        {
            return;
        }

        let Some(handle) = self.sweep_handle.take() else {
            return;
        };

        match handle.join() {
            Ok(summary) => {
                log::info!(
                    "Deleted {} items ({} errors, {} freed)",
                    summary.deleted,
                    summary.errors,
                    format_file_size(summary.bytes_freed)
                );
                self.summary = Some(summary);
            }
            Err(_) => {
                log::error!("Sweep worker panicked");
                self.summary = Some(SweepSummary::default());
            }
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        let Event::Key(key) = event else { return };
        if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc && self.summary.is_none() {
            log::info!("Cancelling sweep");
            self.cancel.cancel();
        }
    }

    fn status_line(&self, progress: &SweepProgress) -> Line<'static> {
        let prefix = if self.dry_run { "[dry run] " } else { "" };
        match &self.summary {
            Some(summary) => {
                let mut text = format!(
                    "{}Deleted {} items, {} freed",
                    prefix,
                    summary.deleted,
                    format_file_size(summary.bytes_freed)
                );
                if summary.errors > 0 {
                    text.push_str(&format!(" ({} errors)", summary.errors));
                }
                if summary.cancelled {
                    text.push_str(" - cancelled");
                }

                let line = Line::raw(text);
                if summary.errors > 0 {
                    line.yellow()
                } else {
                    line.green()
                }
            }
            None => {
                let current = progress
                    .current
                    .as_ref()
                    .map(|(index, path)| {
                        format!(
                            "Deleting {}/{}: {}",
                            index + 1,
                            self.target_count,
                            path.file_name_truncate()
                        )
                    })
                    .unwrap_or_else(|| "Preparing".to_string());

                Line::raw(format!("{}{}", prefix, current)).blue()
            }
        }
    }
}

impl Widget for &SweepingWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let Ok(progress) = self.progress.lock() else {
            return;
        };

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(area);

        self.status_line(&progress).render(layout[0], buf);

        let ratio = if self.target_count == 0 {
            1.0
        } else {
            (progress.processed as f64 / self.target_count as f64).min(1.0)
        };
        Gauge::default()
            .ratio(ratio)
            .label(format!("{}/{}", progress.processed, self.target_count))
            .render(layout[1], buf);

        List::new(progress.failures.iter().map(|failure| failure.as_str().red()))
            .render(layout[2], buf);
    }
}
