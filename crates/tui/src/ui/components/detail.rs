use api_types::transaction::Transaction;
use engine::{Calendar, Pesos};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::{components::centered_fixed, theme::Theme};

/// Modal with every field of the selected transaction.
pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    tx: &Transaction,
    calendar: &Calendar,
    refreshing: bool,
    theme: &Theme,
) {
    let popup = centered_fixed(60, 16, area);

    let status_style = if tx.is_successful() {
        Style::default().fg(theme.positive)
    } else {
        Style::default().fg(theme.error)
    };
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<18}"), Style::default().fg(theme.dim)),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            tx.status.label(),
            status_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            Pesos::new(tx.amount).to_string(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            calendar.format_millis(tx.created_at),
            Style::default().fg(theme.dim),
        )),
        Line::default(),
        field("ID transacción", tx.id.clone()),
        field("Referencia", tx.transaction_reference.to_string()),
        field("Método de pago", tx.payment_method.label().to_string()),
        field("Tipo de pago", tx.sales_type.label().to_string()),
    ];
    if let Some(franchise) = tx.franchise {
        lines.push(field("Franquicia", franchise.label().to_string()));
    }
    if let Some(deduction) = tx.deduction.filter(|_| tx.has_deduction()) {
        lines.push(field("Deducción Bold", format!("-{}", Pesos::new(deduction))));
        lines.push(field("Neto", Pesos::new(tx.net_amount()).to_string()));
    }
    if refreshing {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Consultando…",
            Style::default().fg(theme.dim),
        )));
    }

    let block = Block::default()
        .title(" Detalle de la transacción ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.surface));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true }),
        popup,
    );
}
