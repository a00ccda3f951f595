use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::{components::centered_rect, theme::Theme};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Filtros",
        &[
            ("h", "ventas de hoy"),
            ("w", "últimos 7 días"),
            ("o", "mes de octubre"),
            ("f", "elegir tipo de cobro (Space marca, Enter aplica)"),
            ("/", "buscar (Enter aplica, Esc borra)"),
            ("x", "limpiar filtros"),
        ],
    ),
    (
        "Tabla",
        &[
            ("↑/↓ j/k", "mover selección"),
            ("Enter", "ver detalle"),
            ("s", "cambiar columna de orden"),
            ("S", "invertir orden"),
            ("r", "recargar transacciones"),
        ],
    ),
    (
        "Detalle",
        &[("u", "volver a consultar la transacción"), ("b/Esc", "cerrar")],
    ),
    ("General", &[("?", "mostrar/ocultar ayuda"), ("q/Ctrl+C", "salir")]),
];

pub fn render(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let popup = centered_rect(70, 80, area);

    let mut lines = Vec::new();
    for (i, (section, keys)) in SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            *section,
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<10}"), Style::default().fg(theme.accent)),
                Span::raw(*action),
            ]));
        }
    }

    let block = Block::default()
        .title(" Ayuda · Esc cierra ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.surface));
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        popup,
    );
}
