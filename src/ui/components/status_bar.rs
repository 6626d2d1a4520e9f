use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::animation::spinner;
use crate::app::{App, Mode, Page};
use crate::ui::theme::{Theme, ICON_FAVORITE};

/// Render the bottom status bar with contextual keybindings and status info
pub fn render(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    if app.show_help_bar {
        let keys = get_keybindings(app);
        let key_spans: Vec<Span> = keys
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {} ", key), theme.help_key),
                    Span::styled(format!("{} ", desc), theme.help_desc),
                    Span::styled("│", Style::default().fg(theme.border)),
                ]
            })
            .collect();
        let help = Paragraph::new(Line::from(key_spans)).style(theme.status_bar);
        f.render_widget(help, chunks[0]);
    }

    // Right: mode, shuffle state, favorites
    let session = &app.session;
    let mut status = Vec::new();
    if session.is_shuffling() {
        status.push(Span::styled(
            format!(" {} shuffling ", spinner::shimmer_frame(app.animation.tick_count)),
            Style::default().fg(theme.accent),
        ));
        status.push(Span::raw("│"));
    }
    status.push(Span::styled(
        format!(" {} ", session.mode()),
        Style::default().fg(theme.fg_dim),
    ));
    status.push(Span::raw("│"));
    status.push(Span::styled(
        format!(" {ICON_FAVORITE} {} ", session.records().favorites().count()),
        Style::default().fg(theme.favorite),
    ));

    let status = Paragraph::new(Line::from(status))
        .style(theme.status_bar)
        .alignment(Alignment::Right);
    f.render_widget(status, chunks[1]);
}

fn get_keybindings(app: &App) -> Vec<(&'static str, &'static str)> {
    if app.show_help {
        return vec![("?/Esc", "Close")];
    }
    match app.mode {
        Mode::Normal => {
            let mut keys = vec![("q", "Quit"), ("Tab", "Next"), ("?", "Help")];
            match app.active_page {
                Page::Table if app.session.showing_fan() => {
                    keys.extend([
                        ("←→", "Move"),
                        ("Enter", "Pick"),
                        ("s", "Shuffle"),
                        ("m", "Mode"),
                    ]);
                }
                Page::Table => {
                    keys.extend([
                        ("Enter", "Flip"),
                        ("f", "Favorite"),
                        ("j", "Journal"),
                        ("Esc", "Fan"),
                    ]);
                }
                Page::History => keys.extend([("↑↓", "Select"), ("c", "Clear")]),
                Page::Journal => keys.extend([("↑↓", "Select"), ("x", "Delete")]),
            }
            keys
        }
        Mode::Input => vec![("Enter", "Save"), ("Esc", "Cancel")],
        Mode::Dialog => vec![("y", "Yes"), ("n/Esc", "No")],
    }
}
