use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{
        Color,
        Style,
    },
    widgets::{
        Block,
        Borders,
        Widget,
    },
};
use tui_logger::TuiLoggerWidget;

/// Split screen pane showing everything logged through the `log` facade.
pub struct TuiAppLoggerWidget;

impl Widget for TuiAppLoggerWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let block = Block::new().title("Log").borders(Borders::LEFT);
        TuiLoggerWidget::default()
            .style_error(Style::default().fg(Color::Red))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_debug(Style::default().fg(Color::DarkGray))
            .output_target(false)
            .block(block)
            .render(area, buf);
    }
}
