use api_types::transaction::Transaction;
use engine::{Calendar, KeyValueStore, Pesos, Store, TypeFilter};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use crate::{
    app::{Mode, UiState},
    ui::{
        components::{
            card::{Card, StatCard},
            charts::ascii_bar,
        },
        theme::Theme,
    },
};

pub fn render<S: KeyValueStore>(
    frame: &mut Frame<'_>,
    area: Rect,
    store: &Store<S>,
    ui: &UiState,
    theme: &Theme,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter bar
            Constraint::Length(5), // Sales and stats
            Constraint::Min(3),    // Table
        ])
        .split(area);

    render_filter_bar(frame, layout[0], store, ui, theme);
    render_cards(frame, layout[1], store, theme);
    render_table(frame, layout[2], store, ui, theme);
}

fn render_filter_bar<S: KeyValueStore>(
    frame: &mut Frame<'_>,
    area: Rect,
    store: &Store<S>,
    ui: &UiState,
    theme: &Theme,
) {
    let criteria = store.criteria();
    let searching = ui.mode == Mode::Search;

    let mut spans = Vec::new();
    for (i, filter) in engine::DateFilter::ALL.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let label = format!(" {} ", filter.label());
        if filter == criteria.date_filter {
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(theme.background)
                    .bg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.dim)));
        }
    }

    spans.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    spans.push(Span::styled("Tipo", Style::default().fg(theme.dim)));
    spans.push(Span::raw(format!(": {}", type_summary(&criteria.type_filter))));

    spans.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    spans.push(Span::styled("Buscar", Style::default().fg(theme.dim)));
    if searching {
        spans.push(Span::styled(
            format!(": {}▏", ui.search_input),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ));
    } else if let Some(term) = criteria.active_search() {
        spans.push(Span::raw(format!(": \"{term}\"")));
    } else {
        spans.push(Span::styled(": -", Style::default().fg(theme.dim)));
    }

    Card::new("Filtros", theme)
        .focused(searching)
        .render_with(frame, area, Paragraph::new(Line::from(spans)));
}

fn type_summary(types: &[TypeFilter]) -> String {
    if engine::is_unrestricted(types) {
        return TypeFilter::All.label().to_string();
    }
    types
        .iter()
        .map(|filter| filter.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_cards<S: KeyValueStore>(
    frame: &mut Frame<'_>,
    area: Rect,
    store: &Store<S>,
    theme: &Theme,
) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let derived = store.derived();
    let stats = &derived.stats;
    let period = store.criteria().date_filter;

    StatCard::new(
        "Total de ventas",
        Pesos::new(derived.total_amount).to_string(),
        theme,
    )
    .subtitle(format!(
        "{} · {} transacciones",
        period.description(),
        stats.total_transactions
    ))
    .render(frame, layout[0]);

    let ratio = ascii_bar(
        stats.successful_transactions as u64,
        stats.total_transactions as u64,
        16,
    );
    StatCard::new(
        "Estadísticas",
        format!(
            "{} exitosas · {} rechazadas",
            stats.successful_transactions, stats.rejected_transactions
        ),
        theme,
    )
    .subtitle(format!(
        "{ratio}  promedio {}",
        Pesos::new(stats.average_amount)
    ))
    .render(frame, layout[1]);
}

fn render_table<S: KeyValueStore>(
    frame: &mut Frame<'_>,
    area: Rect,
    store: &Store<S>,
    ui: &UiState,
    theme: &Theme,
) {
    let derived = store.derived();
    let load = store.load_state();
    let title = format!(
        "Tus ventas de {} · {} {}",
        store.criteria().date_filter.label().to_lowercase(),
        ui.sort.column.label(),
        ui.sort.direction.arrow()
    );
    let card = Card::new(&title, theme).focused(ui.mode == Mode::Table);

    if derived.transactions.is_empty() {
        let (message, style) = if let Some(err) = &load.error {
            (err.as_str(), Style::default().fg(theme.error))
        } else if load.loading {
            ("Cargando transacciones…", Style::default().fg(theme.dim))
        } else {
            (
                "No hay transacciones para los filtros seleccionados.",
                Style::default().fg(theme.dim),
            )
        };
        card.render_with(
            frame,
            area,
            Paragraph::new(Line::from(Span::styled(message, style))).alignment(Alignment::Center),
        );
        return;
    }

    let inner = card.inner(area);
    card.render_frame(frame, area);

    let (table_area, status_area) = match (&load.error, load.loading) {
        (None, false) => (inner, None),
        _ => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(inner);
            (split[0], Some(split[1]))
        }
    };

    let header = Row::new(
        [
            "Transacción",
            "Fecha y hora",
            "Método de pago",
            "ID transacción Bold",
            "Referencia",
            "Monto",
        ]
            .map(|title| Cell::from(title).style(Style::default().fg(theme.dim))),
    );

    let calendar = store.calendar();
    let rows = ui
        .sort
        .view(&derived.transactions)
        .into_iter()
        .map(|tx| transaction_row(tx, calendar, theme))
        .collect::<Vec<_>>();

    let mut table_state = TableState::default();
    table_state.select(Some(ui.selected_row.min(rows.len().saturating_sub(1))));

    let table = Table::new(
        rows,
        [
            Constraint::Length(19),
            Constraint::Length(19),
            Constraint::Length(22),
            Constraint::Min(15),
            Constraint::Length(11),
            Constraint::Length(22),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().bg(theme.selection).add_modifier(Modifier::BOLD))
    .highlight_symbol("» ");

    frame.render_stateful_widget(table, table_area, &mut table_state);

    if let Some(status_area) = status_area {
        let line = match &load.error {
            Some(err) => Span::styled(err.as_str(), Style::default().fg(theme.error)),
            None => Span::styled("Actualizando…", Style::default().fg(theme.dim)),
        };
        frame.render_widget(Paragraph::new(Line::from(line)), status_area);
    }
}

fn transaction_row<'a>(tx: &'a Transaction, calendar: &Calendar, theme: &Theme) -> Row<'a> {
    let status_style = if tx.is_successful() {
        Style::default().fg(theme.positive)
    } else {
        Style::default().fg(theme.error)
    };

    let method = match tx.franchise {
        Some(franchise) => format!("{} {}", tx.payment_method.label(), franchise.label()),
        None => tx.payment_method.label().to_string(),
    };

    let amount = if tx.has_deduction() {
        let deduction = Pesos::new(tx.deduction.unwrap_or_default());
        format!("{} (-{})", Pesos::new(tx.amount), deduction.plain())
    } else {
        Pesos::new(tx.amount).to_string()
    };

    Row::new(vec![
        Cell::from(tx.status.label()).style(status_style),
        Cell::from(calendar.format_millis(tx.created_at)),
        Cell::from(method),
        Cell::from(tx.id.as_str()),
        Cell::from(tx.transaction_reference.to_string()),
        Cell::from(amount).style(Style::default().fg(theme.text)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_summary_collapses_unrestricted_sets() {
        assert_eq!(type_summary(&[]), "Ver todos");
        assert_eq!(
            type_summary(&[TypeFilter::All, TypeFilter::Terminal]),
            "Ver todos"
        );
        assert_eq!(
            type_summary(&[TypeFilter::Terminal, TypeFilter::PaymentLink]),
            "Cobro con datáfono, Cobro con link de pago"
        );
    }
}
