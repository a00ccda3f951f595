use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{Notice, NoticeLevel},
    ui::theme::Theme,
};

/// Short message in the bottom-right corner, above the hint bar.
pub fn render(frame: &mut Frame<'_>, area: Rect, notice: Option<&Notice>, theme: &Theme) {
    let Some(notice) = notice else {
        return;
    };
    let width = (notice.message.chars().count() + 4).min(area.width as usize) as u16;
    let height = 3u16.min(area.height);
    let x = area.x + area.width.saturating_sub(width);
    let y = area
        .y
        .saturating_add(area.height.saturating_sub(height + 1));
    let rect = Rect { x, y, width, height };

    let style = match notice.level {
        NoticeLevel::Info => Style::default().fg(theme.positive),
        NoticeLevel::Error => Style::default().fg(theme.error),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(style);
    let content = Paragraph::new(Line::from(notice.message.as_str()))
        .style(style.bg(theme.surface))
        .block(block);
    frame.render_widget(Clear, rect);
    frame.render_widget(content, rect);
}
