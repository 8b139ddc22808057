use ratatui::{prelude::*, widgets::*};

use crate::api::LineItem;
use crate::tui::status::{PanelFocus, Status};
use crate::tui::ui::{is_focused, panel_block};

/// Render the session ledger, newest row first.
pub fn render_ledger_table(f: &mut Frame, area: Rect, status: &Status) {
    let focused = is_focused(status, PanelFocus::Table);

    let header = Row::new(vec![
        "#", "Provider", "Product", "Category", "Qty", "Weight", "Note",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = status.items.iter().map(item_row).collect();

    let title = format!("Entries ({})", status.items.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(22),
            Constraint::Percentage(22),
            Constraint::Percentage(16),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(panel_block(&title, focused))
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(0, 100, 0))
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    if focused && !status.items.is_empty() {
        state.select(Some(status.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn item_row(item: &LineItem) -> Row<'static> {
    let note = if item.comment.is_empty() {
        String::new()
    } else {
        format!("# {}", item.comment)
    };

    Row::new(vec![
        item.id.to_string(),
        item.provider.clone(),
        item.product.clone(),
        item.category.clone(),
        item.quantity.to_string(),
        format!("{:.2}", item.weight),
        note,
    ])
}
