use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthStr;

use crate::tui::status::{PanelFocus, Status};
use crate::tui::ui::{is_focused, panel_block};

/// Render the barcode entry field. Height expected to be 3 lines.
///
/// A failed scan flashes the field red (white text) until the core thread
/// clears the deadline; the rejected input stays visible underneath.
pub fn render_entry_field(f: &mut Frame, area: Rect, status: &Status) {
    let flashing = status.flash_until.is_some();

    // Keep the tail of a long code visible: drop characters from the front
    // until the text plus cursor block fits the inner width.
    let inner_width = area.width.saturating_sub(3) as usize;
    let mut shown = status.entry.as_str();
    while shown.width() > inner_width && !shown.is_empty() {
        let mut chars = shown.chars();
        chars.next();
        shown = chars.as_str();
    }

    let text_style = if flashing {
        Style::default().bg(Color::Red).fg(Color::White)
    } else {
        Style::default()
    };

    let mut spans = vec![Span::styled(shown.to_string(), text_style)];
    if is_focused(status, PanelFocus::Entry) {
        // Visual cursor block; the terminal cursor stays parked.
        spans.push(Span::styled(
            " ",
            Style::default().bg(Color::Green).fg(Color::Black),
        ));
    }

    let mut block = panel_block("Scan", is_focused(status, PanelFocus::Entry));
    if flashing {
        block = block.style(
            Style::default()
                .bg(Color::Red)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    }

    let field = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(field, area);
}
