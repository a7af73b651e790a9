use std::path::PathBuf;

use crossterm::event::{
    Event,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    format_file_size,
    ScanEngine,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    text::Text,
    widgets::{
        Block,
        Borders,
        Clear,
        Paragraph,
        Widget,
        Wrap,
    },
};

use super::{
    ScannerWidget,
    SweepingWidget,
};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    NoSelection,
    ScanRunning,
    ConfirmDelete { count: usize, size: u64 },
}

pub enum AppView {
    TargetSelect {
        view: ScannerWidget,
        popup: Popup,
        dry_run: bool,
    },
    Sweeping {
        view: SweepingWidget,
    },
}

impl AppView {
    pub fn new(engine: &ScanEngine, roots: Vec<PathBuf>, include_sizes: bool, dry_run: bool) -> Self {
        Self::TargetSelect {
            view: ScannerWidget::new(engine, roots, include_sizes),
            popup: Popup::None,
            dry_run,
        }
    }

    pub fn poll(&mut self) {
        match self {
            Self::TargetSelect { view, .. } => view.poll(),
            Self::Sweeping { view, .. } => view.poll(),
        }
    }

    /// A running sweep must not be torn down halfway.
    pub fn can_quit(&self) -> bool {
        match self {
            Self::TargetSelect { .. } => true,
            Self::Sweeping { view } => view.is_finished(),
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        match self {
            Self::TargetSelect {
                view,
                popup,
                dry_run,
            } => {
                let Event::Key(key) = event else {
                    view.handle_event(event);
                    return;
                };

                if key.kind != KeyEventKind::Press {
                    view.handle_event(event);
                    return;
                }

                match (*popup, key.code) {
                    (Popup::ConfirmDelete { .. }, KeyCode::Enter | KeyCode::Char('y')) => {
                        *self = Self::Sweeping {
                            view: SweepingWidget::new(view.remove_selected_targets(), *dry_run),
                        };
                    }
                    (Popup::None, KeyCode::Enter) => {
                        *popup = if view.is_scanning() {
                            Popup::ScanRunning
                        } else if view.selected_target_count() == 0 {
                            Popup::NoSelection
                        } else {
                            Popup::ConfirmDelete {
                                count: view.selected_target_count(),
                                size: view.selected_size(),
                            }
                        };
                    }
                    (Popup::None, _) => view.handle_event(event),
                    /* any other key closes the popup */
                    _ => *popup = Popup::None,
                }
            }
            Self::Sweeping { view, .. } => view.handle_event(event),
        }
    }
}

fn render_popup(title: &str, message: String, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .on_gray();
    let area = utils::centered_rect(60, 20, area);

    let popup = Paragraph::new(Text::raw(message))
        .wrap(Wrap { trim: true })
        .block(block);

    Clear::render(Clear, area, buf);
    popup.render(area, buf);
}

impl Widget for &AppView {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        match self {
            AppView::TargetSelect { view, popup, dry_run } => {
                view.render(area, buf);
                match popup {
                    Popup::None => {}
                    Popup::NoSelection => render_popup(
                        "No targets",
                        "Please select at least one target to delete".to_string(),
                        area,
                        buf,
                    ),
                    Popup::ScanRunning => render_popup(
                        "Scan running",
                        "Please wait for the scan to finish or cancel it with Esc".to_string(),
                        area,
                        buf,
                    ),
                    Popup::ConfirmDelete { count, size } => render_popup(
                        "Confirm",
                        format!(
                            "{} {} selected items ({})?\n\nEnter to confirm, any other key to abort",
                            if *dry_run { "Simulate deleting" } else { "Delete" },
                            count,
                            format_file_size(*size)
                        ),
                        area,
                        buf,
                    ),
                }
            }
            AppView::Sweeping { view } => view.render(area, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{
            Duration,
            Instant,
        },
    };

    use super::AppView;
    use crate::ui::SweepingWidget;

    #[test]
    fn quit_waits_for_the_sweep_summary() {
        let mut view = AppView::Sweeping {
            view: SweepingWidget::new(Vec::new(), true),
        };
        assert!(!view.can_quit());

        let deadline = Instant::now() + Duration::from_secs(5);
        while !view.can_quit() && Instant::now() < deadline {
            view.poll();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(view.can_quit());
    }
}
