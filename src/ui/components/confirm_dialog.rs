use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::ui::theme::Theme;

/// A Yes/No confirmation dialog
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub visible: bool,
    /// Extra line shown under the message
    pub context: Option<String>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: &str, message: &str, context: Option<String>) {
        self.title = title.to_string();
        self.message = message.to_string();
        self.context = context;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.context = None;
    }

    pub fn render(&self, f: &mut Frame, theme: &Theme, y_offset: u16) {
        if !self.visible {
            return;
        }

        let area = centered_rect(40, 6, y_offset, f.area());
        f.render_widget(Clear, area);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(theme.warning)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.dialog_border);

        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(1)])
            .split(inner);

        let mut lines = vec![Line::from(Span::styled(
            &self.message,
            Style::default().fg(theme.fg),
        ))];
        if let Some(ref context) = self.context {
            lines.push(Line::from(Span::styled(context, theme.style_dim())));
        }
        let msg = Paragraph::new(lines).alignment(Alignment::Center);
        f.render_widget(msg, chunks[0]);

        let actions = Line::from(vec![
            Span::styled(" y ", theme.help_key),
            Span::styled("Yes ", Style::default().fg(theme.fg_dim)),
            Span::styled("│", Style::default().fg(theme.border)),
            Span::styled(" n ", theme.help_key),
            Span::styled("No ", Style::default().fg(theme.fg_dim)),
        ]);
        let actions_p = Paragraph::new(actions).alignment(Alignment::Center);
        f.render_widget(actions_p, chunks[1]);
    }
}
