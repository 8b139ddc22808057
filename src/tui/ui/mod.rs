pub mod components;

use ratatui::{prelude::*, widgets::*};

use crate::tui::status::{PanelFocus, Status};

/// Render the whole console from a status snapshot.
pub fn render_ui(f: &mut Frame, status: &Status) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // weight / provider / filter line
            Constraint::Length(3), // entry field
            Constraint::Min(0),    // ledger table
            Constraint::Length(1), // transient error banner
            Constraint::Length(1), // key help
        ])
        .split(area);

    let title = Paragraph::new("Collecte")
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Rgb(0, 150, 0))
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(title, chunks[0]);

    render_status_line(f, chunks[1], status);
    components::entry_field::render_entry_field(f, chunks[2], status);
    components::ledger_table::render_ledger_table(f, chunks[3], status);
    render_error_banner(f, chunks[4], status);
    render_help(f, chunks[5]);
}

fn render_status_line(f: &mut Frame, area: Rect, status: &Status) {
    let stability = if status.stable { "●" } else { "○" };
    let provider = status.last_provider.as_deref().unwrap_or("-");
    let filter = match status.filter_date {
        Some(date) => format!("today {date}"),
        None => "full history".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {stability} {:7.2} kg ", status.weight),
            Style::default()
                .fg(Color::Rgb(0, 150, 0))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  provider: "),
        Span::styled(provider.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("  [{filter}]")),
    ];
    if let Some(notice) = &status.notice {
        spans.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_error_banner(f: &mut Frame, area: Rect, status: &Status) {
    if let Some(error) = &status.error {
        let banner = Paragraph::new(error.message.clone())
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .bg(Color::Red)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(banner, area);
    }
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "Enter submit | Tab table | d/Del delete row | F5 reload | F6 today/all | F8 export | Esc quit",
    )
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}

// Focus-dependent block styling shared by the two panels.
pub(crate) fn panel_block(title: &str, focused: bool) -> Block<'static> {
    let mut block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Plain);
    if focused {
        block = block.style(
            Style::default()
                .fg(Color::Rgb(0, 150, 0))
                .add_modifier(Modifier::BOLD),
        );
    }
    block
}

pub(crate) fn is_focused(status: &Status, panel: PanelFocus) -> bool {
    status.focus == panel
}
