use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::ui::theme::ICON_JOURNAL;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let entries = app.session.records().journal().newest_first();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let block = Block::default()
        .title(Span::styled(
            format!(" {ICON_JOURNAL} Journal ({}) ", entries.len()),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.style_border_focused());

    if entries.is_empty() {
        let msg = Paragraph::new("Nothing written yet. Draw a card and press j.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.fg_dim))
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}  ", short_date(&e.created_at)), theme.style_dim()),
                Span::styled(card_title(app, &e.card_id), theme.style_default()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.style_selected())
        .highlight_symbol("▸ ");
    let selected = app.journal_state.selected_index.min(entries.len() - 1);
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, chunks[0], &mut state);

    // ── Right: the selected entry in full ─────────────────────────────
    let entry = entries[selected];
    let detail_block = Block::default()
        .title(Span::styled(
            format!(" {} ", card_title(app, &entry.card_id)),
            theme.style_accent_bold(),
        ))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.style_border());
    let body = vec![
        Line::from(Span::styled(
            entry
                .created_at
                .with_timezone(&Local)
                .format("%A %e %B %Y, %H:%M")
                .to_string(),
            theme.style_dim(),
        )),
        Line::from(""),
        Line::from(Span::styled(entry.entry.as_str(), theme.style_default())),
    ];
    f.render_widget(
        Paragraph::new(body)
            .block(detail_block)
            .wrap(Wrap { trim: false }),
        chunks[1],
    );
}

/// Entries carried over from the old one-note-per-card format have no date
pub(super) fn short_date(at: &DateTime<Utc>) -> String {
    if at.timestamp() == 0 {
        "(undated)".to_string()
    } else {
        at.with_timezone(&Local).format("%Y-%m-%d").to_string()
    }
}

fn card_title(app: &App, card_id: &str) -> String {
    app.catalog
        .get(card_id)
        .map_or_else(|| card_id.to_string(), |c| c.title.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_entries_show_as_undated() {
        assert_eq!(short_date(&DateTime::<Utc>::default()), "(undated)");
        let dated = DateTime::parse_from_rfc3339("2026-05-04T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(short_date(&dated).len(), 10);
    }
}
