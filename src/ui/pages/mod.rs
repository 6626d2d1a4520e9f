pub mod history;
pub mod journal;
pub mod table;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Page};
use crate::ui::components;
use crate::ui::help;
use crate::ui::theme::Theme;

/// Render the full screen: tabs + active page + status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Tab bar
            Constraint::Min(0),    // Page content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    components::tabs::render(f, &app.active_page, &app.catalog.name, &app.theme, chunks[0]);

    match app.active_page {
        Page::Table => table::render(f, app, chunks[1]),
        Page::History => history::render(f, app, chunks[1]),
        Page::Journal => journal::render(f, app, chunks[1]),
    }

    components::status_bar::render(f, app, &app.theme, chunks[2]);

    // Overlay dialogs
    let slide = app.animation.dialog_y_offset();
    app.input_dialog.render(f, &app.theme, slide);
    app.confirm_dialog.render(f, &app.theme, slide);

    if app.show_help {
        help::render(f, app, area);
    }

    if let Some(ref msg) = app.toast_message {
        render_toast(f, msg, app.toast_is_error, &app.theme);
    }
}

/// Render a temporary toast notification at the top-right
fn render_toast(f: &mut Frame, message: &str, is_error: bool, theme: &Theme) {
    let area = f.area();
    if area.width < 8 || area.height < 4 {
        return;
    }
    let width = (message.width() as u16).saturating_add(6).min(area.width - 4);
    let x = area.width.saturating_sub(width + 2);
    let toast_area = Rect::new(x, 1, width, 3);

    f.render_widget(Clear, toast_area);

    let color = if is_error { theme.error } else { theme.success };
    let icon = if is_error { " ✗ " } else { " ✓ " };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(color));

    let text = Paragraph::new(Line::from(vec![
        Span::styled(icon, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(message, Style::default().fg(theme.fg)),
    ]))
    .block(block);

    f.render_widget(text, toast_area);
}
