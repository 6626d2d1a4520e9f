use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::centered_rect;
use crate::ui::theme::Theme;

/// State for a single-line text input dialog (journal entries)
#[derive(Debug, Clone)]
pub struct InputDialog {
    pub title: String,
    pub prompt: String,
    pub input: String,
    /// Cursor position in chars, not bytes
    pub cursor_pos: usize,
    pub visible: bool,
}

impl InputDialog {
    pub fn new(title: &str, prompt: &str) -> Self {
        Self {
            title: title.to_string(),
            prompt: prompt.to_string(),
            input: String::new(),
            cursor_pos: 0,
            visible: false,
        }
    }

    pub fn show(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.input.clear();
        self.cursor_pos = 0;
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map_or(self.input.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_pos);
        self.input.insert(at, c);
        self.cursor_pos += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let at = self.byte_index(self.cursor_pos);
            self.input.remove(at);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_pos < self.char_count() {
            let at = self.byte_index(self.cursor_pos);
            self.input.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_pos < self.char_count() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_pos = self.char_count();
    }

    pub fn value(&self) -> &str {
        &self.input
    }

    pub fn render(&self, f: &mut Frame, theme: &Theme, y_offset: u16) {
        if !self.visible {
            return;
        }

        let area = centered_rect(60, 7, y_offset, f.area());
        f.render_widget(Clear, area);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.dialog_border);

        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .margin(0)
            .split(inner);

        let prompt = Paragraph::new(Line::from(Span::styled(&self.prompt, theme.input_inactive)));
        f.render_widget(prompt, chunks[0]);

        // Keep the cursor in view on long entries
        let field_width = chunks[1].width.saturating_sub(3) as usize;
        let before: String = self.input.chars().take(self.cursor_pos).collect();
        let skip = before.width().saturating_sub(field_width);
        let visible: String = {
            let mut taken = 0;
            self.input
                .chars()
                .skip_while(|c| {
                    let w = c.to_string().width();
                    if taken + w <= skip {
                        taken += w;
                        true
                    } else {
                        false
                    }
                })
                .collect()
        };

        let input_line = Line::from(vec![
            Span::styled("❯ ", Style::default().fg(theme.accent)),
            Span::styled(visible, theme.input_active),
        ]);
        f.render_widget(Paragraph::new(input_line), chunks[1]);

        let cursor_x = chunks[1].x + 2 + (before.width() - skip.min(before.width())) as u16;
        f.set_cursor_position((cursor_x, chunks[1].y));

        let hint = Paragraph::new(Line::from(Span::styled(
            "Enter to save │ Esc to cancel",
            Style::default().fg(theme.fg_muted),
        )))
        .alignment(Alignment::Center);
        f.render_widget(hint, chunks[2]);
    }
}
