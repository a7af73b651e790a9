use std::{
    cell::RefCell,
    path::PathBuf,
};

use crossterm::event::{
    Event,
    KeyCode,
    KeyEventKind,
};
use dirsweep::{
    format_file_size,
    MatchKind,
    MatchRecord,
};
use ratatui::{
    buffer::Buffer,
    layout::{
        Alignment,
        Constraint,
        Layout,
        Rect,
    },
    style::Stylize,
    text::{
        Line,
        Span,
        Text,
    },
    widgets::{
        Cell,
        Paragraph,
        Row,
        Table,
        Widget,
    },
};

use super::ScrollableText;
use crate::utils;

struct TuiTargetSelectState {
    target: MatchRecord,
    selected: bool,

    ui_path: ScrollableText,
}

pub struct TuiTargetSelect {
    targets: Vec<TuiTargetSelectState>,

    cursor_current: usize,
    view_offset: usize,
    view_height: RefCell<usize>,

    strip_root_paths: Vec<PathBuf>,
    show_sizes: bool,
}

impl TuiTargetSelect {
    pub fn new(strip_root_paths: Vec<PathBuf>, show_sizes: bool) -> Self {
        Self {
            targets: Vec::new(),

            cursor_current: 0,
            view_offset: 0,
            view_height: RefCell::new(100),

            strip_root_paths,
            show_sizes,
        }
    }

    /// Every new target starts out selected.
    pub fn add_target(&mut self, target: MatchRecord) {
        let path_text = utils::display_path(target.path(), &self.strip_root_paths);
        self.targets.push(TuiTargetSelectState {
            ui_path: ScrollableText::new(path_text),
            target,
            selected: true,
        });
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn selected_target_count(&self) -> usize {
        self.targets.iter().filter(|target| target.selected).count()
    }

    pub fn selected_size(&self) -> u64 {
        self.targets
            .iter()
            .filter(|target| target.selected)
            .map(|target| target.target.size_bytes())
            .sum()
    }

    /// Remove all selected targets while keeping their scan order.
    pub fn remove_selected_targets(&mut self) -> Vec<MatchRecord> {
        let (selected, kept): (Vec<_>, Vec<_>) = self
            .targets
            .drain(..)
            .partition(|target| target.selected);

        self.targets = kept;
        self.cursor_current = 0;
        self.view_offset = 0;

        selected.into_iter().map(|target| target.target).collect()
    }

    fn set_all_selected(&mut self, selected: bool) {
        for target in self.targets.iter_mut() {
            target.selected = selected;
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        let Event::Key(event) = event else { return };
        if event.kind == KeyEventKind::Press {
            match event.code {
                KeyCode::Char(' ') => {
                    if let Some(target) = self.targets.get_mut(self.cursor_current) {
                        target.selected = !target.selected;
                    }
                }
                KeyCode::Char('a') => self.set_all_selected(true),
                KeyCode::Char('n') => self.set_all_selected(false),
                KeyCode::PageDown => self.set_cursor_index(self.targets.len()),
                KeyCode::PageUp => self.set_cursor_index(0),
                _ => {}
            }
        }

        if !matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return;
        }

        if event.code == KeyCode::Down && self.cursor_current + 1 < self.targets.len() {
            self.set_cursor_index(self.cursor_current + 1);
        }

        if event.code == KeyCode::Up && self.cursor_current > 0 {
            self.set_cursor_index(self.cursor_current - 1);
        }
    }

    fn set_cursor_index(&mut self, index: usize) {
        if self.targets.is_empty() {
            return;
        }

        let index = index.clamp(0, self.targets.len() - 1);
        let view_height = self.view_height.borrow().saturating_sub(1).max(1);

        if index >= self.view_offset + view_height {
            self.view_offset = index - view_height + 1;
        }
        if index < self.view_offset + 1 {
            self.view_offset = index.saturating_sub(1);
        }

        self.cursor_current = index;
        if let Some(target) = self.targets.get_mut(index) {
            target.ui_path.reset_scroll();
        }
    }

    fn size_text(&self, size: u64) -> Span<'static> {
        if self.show_sizes {
            format_file_size(size).into()
        } else {
            Span::raw("-").italic()
        }
    }
}

impl Widget for &TuiTargetSelect {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let layout = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);
        *self.view_height.borrow_mut() = layout[0].height as usize;

        let content = {
            let mut rows = Vec::with_capacity(layout[0].height as usize);

            let width_layout = Layout::horizontal([
                Constraint::Length(16), // Checkbox + space + size + space
                Constraint::Fill(1),    // Path name
                Constraint::Length(26), // Type + pattern + left space
            ])
            .split(layout[0]);

            let max_path_text_width = width_layout[1].width as usize;

            for (index, target) in self.targets.iter().enumerate().skip(self.view_offset) {
                let target_selected = if target.selected { "X" } else { " " };
                let target_kind = match target.target.kind() {
                    MatchKind::Folder => Span::raw("FOLDER").bold(),
                    MatchKind::File => Span::raw("file"),
                };

                let row = Row::new(vec![
                    Cell::new(format!("[{}]", target_selected)),
                    Cell::new(
                        Text::from(self.size_text(target.target.size_bytes()))
                            .alignment(Alignment::Right),
                    ),
                    Cell::new(if index == self.cursor_current {
                        target.ui_path.display_value(max_path_text_width)
                    } else {
                        target.ui_path.fixed_value(max_path_text_width)
                    }),
                    Cell::new(Line::from_iter([
                        target_kind,
                        " ".into(),
                        Span::raw(target.target.matched_pattern().to_string()).italic(),
                    ])),
                ]);
                let row = if index == self.cursor_current {
                    row.on_gray()
                } else {
                    row
                };

                rows.push(row);
            }

            Table::new(
                rows,
                &[
                    Constraint::Length(3),
                    Constraint::Length(12),
                    Constraint::Fill(1),
                    Constraint::Length(24),
                ],
            )
            .header(Row::new(vec![
                Cell::new(""),
                Cell::new("Size"),
                Cell::new("Path"),
                Cell::new("Type"),
            ]))
        };

        let footer = {
            let size_total = self
                .targets
                .iter()
                .map(|target| target.target.size_bytes())
                .sum::<u64>();

            let count_selected = self.selected_target_count();
            let text_total = Span::raw(format!(
                "{} total {}",
                self.targets.len(),
                format_file_size(size_total),
            ));

            let text_selected = if count_selected == 0 {
                Span::raw("No selection")
            } else {
                Span::raw(format!(
                    "{} selected {}",
                    count_selected,
                    format_file_size(self.selected_size()),
                ))
            };
            Paragraph::new(Line::from_iter([
                text_total,
                " | ".into(),
                text_selected,
                " | space toggle, a all, n none, enter delete".italic(),
            ]))
        };

        content.render(layout[0], buf);
        footer.render(layout[1], buf);
    }
}
