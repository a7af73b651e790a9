use std::{
    path::PathBuf,
    sync::{
        mpsc::Receiver,
        Arc,
        Mutex,
    },
    thread::JoinHandle,
    time::{
        Duration,
        Instant,
    },
};

use crossterm::event::{
    Event,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    MatchRecord,
    ScanEngine,
    ScanOptions,
    ScanReport,
    ScanReportConsumer,
    ScanSession,
};
use ratatui::{
    buffer::Buffer,
    layout::{
        Constraint,
        Layout,
        Rect,
    },
    style::Stylize,
    text::{
        Line,
        Span,
    },
    widgets::Widget,
};

use super::TuiTargetSelect;
use crate::utils::format_duration;

#[derive(Debug, Default)]
struct UiReportInfo {
    current_dir: Option<PathBuf>,
    root_index: usize,
    root_total: usize,
    error_count: usize,
}

struct UiReportConsumer {
    ui_info: Arc<Mutex<UiReportInfo>>,
}

impl ScanReportConsumer for UiReportConsumer {
    fn consume_report(&mut self, report: ScanReport) {
        let Ok(mut ui_info) = self.ui_info.lock() else {
            return;
        };

        match report {
            ScanReport::StatusInspecting(dir) | ScanReport::StatusSizing(dir) => {
                ui_info.current_dir = Some(dir)
            }
            ScanReport::RootStarted { index, total, .. } => {
                ui_info.root_index = index;
                ui_info.root_total = total;
            }
            ScanReport::ErrorFs { .. } => ui_info.error_count += 1,
            ScanReport::TargetFound { .. } => {}
        }
    }
}

pub struct ScannerWidget {
    time_started: Instant,
    time_total: Option<Duration>,

    roots: Vec<PathBuf>,

    scan_session: ScanSession,
    scan_rx: Receiver<MatchRecord>,
    scan_handle: JoinHandle<()>,
    scan_finished: bool,

    target_select: TuiTargetSelect,
    report_info: Arc<Mutex<UiReportInfo>>,
}

impl ScannerWidget {
    pub fn new(engine: &ScanEngine, roots: Vec<PathBuf>, include_sizes: bool) -> Self {
        let report_info = Arc::new(Mutex::new(UiReportInfo::default()));
        let options = ScanOptions {
            include_sizes,
            report_consumer: Box::new(UiReportConsumer {
                ui_info: report_info.clone(),
            }),
        };

        let (scan_session, scan_handle, scan_rx) = engine.execute(roots.clone(), options);
        Self {
            time_started: Instant::now(),
            time_total: None,

            target_select: TuiTargetSelect::new(roots.clone(), include_sizes),
            roots,

            scan_session,
            scan_rx,
            scan_handle,
            scan_finished: false,

            report_info,
        }
    }

    pub fn poll(&mut self) {
        while let Ok(value) = self.scan_rx.try_recv() {
            self.target_select.add_target(value);
        }

        let finished = self.scan_handle.is_finished();
        if finished == self.scan_finished {
            return;
        }

        /* we finished */
        self.time_total = Some(self.time_started.elapsed());
        self.scan_finished = true;
        log::debug!(
            "Scan finished with {} targets",
            self.target_select.target_count()
        );
    }

    pub fn is_scanning(&self) -> bool {
        !self.scan_finished
    }

    pub fn cancel(&self) {
        if !self.scan_finished {
            log::info!("Cancelling scan");
            self.scan_session.cancel();
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc {
                self.cancel();
                return;
            }
        }

        self.target_select.handle_event(event);
    }

    pub fn selected_target_count(&self) -> usize {
        self.target_select.selected_target_count()
    }

    pub fn selected_size(&self) -> u64 {
        self.target_select.selected_size()
    }

    pub fn remove_selected_targets(&mut self) -> Vec<MatchRecord> {
        self.target_select.remove_selected_targets()
    }

    fn status_line(&self) -> Line {
        let time_elapsed = self
            .time_total
            .unwrap_or_else(|| self.time_started.elapsed());

        let mut line_segments = Vec::with_capacity(8);
        line_segments.push(Span::raw(format_duration(&time_elapsed)));

        let Ok(report_info) = self.report_info.lock() else {
            return Line::from(line_segments);
        };

        if self.scan_finished {
            let state = if self.scan_session.is_cancelled() {
                "Cancelled"
            } else {
                "Finished"
            };
            line_segments.push(Span::raw(format!(
                " {} {} root(s), {} found",
                state,
                self.roots.len(),
                self.scan_session.found_count()
            )));
        } else {
            let current_path = report_info
                .current_dir
                .clone()
                .or_else(|| self.scan_session.current_root())
                .unwrap_or_default();

            line_segments.push(Span::raw(format!(
                " Searching {}/{} ({} found) ",
                report_info.root_index + 1,
                report_info.root_total.max(1),
                self.scan_session.found_count()
            )));
            line_segments.push(Span::raw(format!("{}", current_path.display())).italic());
        }

        if report_info.error_count > 0 {
            line_segments.push(Span::raw(format!(
                " | {} unreadable",
                report_info.error_count
            )));
        }

        let text = Line::from(line_segments);
        if self.scan_finished {
            text.green()
        } else {
            text.blue()
        }
    }
}

impl Widget for &ScannerWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout =
            Layout::vertical(&[Constraint::Percentage(100), Constraint::Length(1)]).split(area);

        self.target_select.render(layout[0], buf);
        self.status_line().render(layout[1], buf);
    }
}
