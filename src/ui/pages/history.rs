use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::app::App;
use crate::records::HISTORY_LIMIT;
use crate::ui::theme::ICON_FAVORITE;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let history = app.session.records().history();
    let favorites = app.session.records().favorites();

    let block = Block::default()
        .title(Span::styled(
            format!(" Draw History ({}/{HISTORY_LIMIT}) ", history.len()),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.style_border_focused());

    if history.is_empty() {
        let msg = Paragraph::new("No draws yet. Pick a card on the Table.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.fg_dim))
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Drawn"),
        Cell::from("Card"),
        Cell::from(""),
    ])
    .style(
        Style::default()
            .fg(theme.fg_dim)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(1);

    let rows: Vec<Row> = history
        .entries()
        .iter()
        .map(|entry| {
            let when = entry.drawn_at.with_timezone(&Local);
            let fav = if favorites.is_favorite(&entry.card_id) {
                Span::styled(ICON_FAVORITE, theme.style_favorite())
            } else {
                Span::raw("")
            };
            Row::new(vec![
                Cell::from(when.format("%Y-%m-%d %H:%M").to_string())
                    .style(Style::default().fg(theme.fg_dim)),
                Cell::from(entry.title.as_str()).style(Style::default().fg(theme.fg)),
                Cell::from(fav),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Min(20),
            Constraint::Length(2),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(theme.style_selected())
    .highlight_symbol("▸ ");

    let mut state = TableState::default().with_selected(Some(app.history_state.selected_index));
    f.render_stateful_widget(table, area, &mut state);
}
