use ratatui::layout::Rect;
use ratatui::Frame;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::App;

/// Keybinding entries: (key, description). An empty key starts a section.
const KEYBINDINGS: &[(&str, &str)] = &[
    ("", "Table"),
    ("← / h  → / l", "Move along the fan / between cards"),
    ("Enter / Space", "Pick a slot, flip or open a card"),
    ("b / Backspace", "Close card detail"),
    ("s", "Shuffle the deck"),
    ("m", "Switch single / three-card draw"),
    ("f", "Toggle favorite"),
    ("j", "Write a journal entry"),
    ("Esc", "Cancel pick / back to the fan"),
    ("", "History & Journal"),
    ("↑ / k  ↓ / j", "Move selection"),
    ("g / G", "Top / bottom"),
    ("c", "Clear history"),
    ("x / Del", "Delete journal entry"),
    ("", "Anywhere"),
    ("Tab / 1-3", "Switch page"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

/// Render the help overlay
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let width = 58_u16.min(area.width.saturating_sub(4));
    let height = (KEYBINDINGS.len() as u16 + 6).min(area.height.saturating_sub(2));

    let dialog = super::centered_rect_fixed(width, height, area);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .title(Line::from(vec![
            Span::styled(" ✦", t.style_accent()),
            Span::styled(" Keybindings ", t.style_accent_bold()),
        ]))
        .borders(Borders::ALL)
        .border_type(t.border_type)
        .border_style(t.style_accent())
        .style(t.style_default());

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    for (key, desc) in KEYBINDINGS {
        if key.is_empty() {
            lines.push(Line::from(Span::styled(format!(" {desc}"), t.style_accent())));
            continue;
        }
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<16}", key), t.style_key_hint()),
            Span::styled(*desc, t.style_default()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Press ", t.style_dim()),
        Span::styled("?", t.style_key_hint()),
        Span::styled(" or ", t.style_dim()),
        Span::styled("Esc", t.style_key_hint()),
        Span::styled(" to close", t.style_dim()),
    ]));

    let para = Paragraph::new(lines).block(block);
    frame.render_widget(para, dialog);
}
