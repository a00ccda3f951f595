pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use engine::{KeyValueStore, Store};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::{Mode, UiState};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render<S: KeyValueStore>(frame: &mut Frame<'_>, store: &Store<S>, ui: &UiState) {
    let theme = Theme::default();
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),    // Dashboard
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], store, ui, &theme);
    screens::dashboard::render(frame, layout[1], store, ui, &theme);
    render_bottom_bar(frame, layout[2], ui, &theme);

    if ui.mode == Mode::TypePicker {
        components::type_picker::render(frame, area, &ui.picker, &theme);
    }
    if ui.mode == Mode::Detail {
        if let Some(transaction) = store.selected() {
            components::detail::render(
                frame,
                area,
                transaction,
                store.calendar(),
                ui.detail_loading,
                &theme,
            );
        }
    }
    if ui.show_help {
        components::help_overlay::render(frame, area, &theme);
    }
    components::toast::render(frame, area, ui.notice.as_ref(), &theme);
}

fn render_info_bar<S: KeyValueStore>(
    frame: &mut Frame<'_>,
    area: Rect,
    store: &Store<S>,
    ui: &UiState,
    theme: &Theme,
) {
    let refresh = ui
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let load = store.load_state();
    let (status, status_style) = if load.loading {
        ("CARGANDO", Style::default().fg(theme.dim))
    } else if load.error.is_some() {
        ("ERR", Style::default().fg(theme.error))
    } else {
        ("OK", Style::default().fg(theme.positive))
    };

    let line = Line::from(vec![
        Span::styled(
            "txdash",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("API", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", ui.endpoint)),
        Span::styled("Zona", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", store.calendar().name())),
        Span::styled("Actualizado", Style::default().fg(theme.dim)),
        Span::raw(format!(": {refresh}  ")),
        Span::styled(status, status_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, ui: &UiState, theme: &Theme) {
    let hints: &[(&str, &str)] = match ui.mode {
        Mode::Table => &[
            ("h/w/o", "periodo"),
            ("f", "tipo"),
            ("/", "buscar"),
            ("x", "limpiar"),
            ("s/S", "ordenar"),
            ("r", "recargar"),
            ("Enter", "detalle"),
            ("?", "ayuda"),
        ],
        Mode::Search => &[("Enter", "aplicar"), ("Esc", "borrar")],
        Mode::TypePicker => &[
            ("↑↓", "mover"),
            ("Space", "marcar"),
            ("Enter", "aplicar"),
            ("Esc", "cancelar"),
        ],
        Mode::Detail => &[("u", "actualizar"), ("b/Esc", "volver")],
    };

    let mut parts = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            parts.push(Span::raw("  "));
        }
        parts.push(Span::styled(*key, Style::default().fg(theme.accent)));
        parts.push(Span::raw(format!(" {action}")));
    }
    if ui.mode != Mode::Search {
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        parts.push(Span::styled("q", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" salir"));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
