use engine::TypeFilter;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState},
};

use crate::{
    app::TypePicker,
    ui::{components::centered_fixed, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, picker: &TypePicker, theme: &Theme) {
    let popup = centered_fixed(44, TypeFilter::ALL.len() as u16 + 2, area);

    let items = TypeFilter::ALL
        .iter()
        .map(|filter| {
            let mark = if picker.selection.contains(filter) {
                "[x]"
            } else {
                "[ ]"
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(theme.accent)),
                Span::raw(format!(" {}", filter.label())),
            ]))
        })
        .collect::<Vec<_>>();

    let mut state = ListState::default();
    state.select(Some(picker.cursor));

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Tipo de cobro ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.accent))
                .style(Style::default().bg(theme.surface)),
        )
        .highlight_style(
            Style::default()
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut state);
}
