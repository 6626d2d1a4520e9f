use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

use crate::config::ThemeConfig;

// ─── Glyphs ──────────────────────────────────────────────────────────────

pub const ICON_FAVORITE: &str = "♥";
pub const ICON_NOT_FAVORITE: &str = "♡";
pub const ICON_DECK: &str = "✦";
pub const ICON_SELECTED: &str = "▲";
pub const ICON_JOURNAL: &str = "✎";

/// Tiled onto face-down cards
pub const CARD_BACK_PATTERN: &[&str] = &["╱╲", "╲╱"];

// ─── Palette ─────────────────────────────────────────────────────────────

/// Resolved colors and styles, built once from `[theme]`.
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_muted: Color,
    pub accent: Color,
    pub accent_secondary: Color,
    pub border: Color,
    pub border_focused: Color,
    pub card_back: Color,
    pub favorite: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub selected_bg: Color,
    pub border_type: BorderType,

    pub help_key: Style,
    pub help_desc: Style,
    pub status_bar: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub dialog_border: Style,
    pub input_active: Style,
    pub input_inactive: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

impl Theme {
    pub fn from_config(c: &ThemeConfig) -> Self {
        Self {
            bg: c.bg,
            fg: c.fg,
            fg_dim: c.fg_dim,
            fg_muted: c.fg_dim,
            accent: c.accent,
            accent_secondary: c.accent_secondary,
            border: c.border,
            border_focused: c.border_focused,
            card_back: c.card_back,
            favorite: c.favorite,
            success: Color::Green,
            warning: c.warning,
            error: c.error,
            selected_bg: c.selected_bg,
            border_type: BorderType::Rounded,

            help_key: Style::default()
                .fg(c.accent)
                .bg(c.bg)
                .add_modifier(Modifier::BOLD),
            help_desc: Style::default().fg(c.fg_dim).bg(c.bg),
            status_bar: Style::default().bg(c.bg),
            tab_active: Style::default()
                .fg(c.accent)
                .bg(c.bg)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(c.fg_dim).bg(c.bg),
            dialog_border: Style::default().fg(c.border_focused),
            input_active: Style::default().fg(c.fg),
            input_inactive: Style::default().fg(c.fg_dim),
        }
    }

    // ─── Style Constructors ──────────────────────────────────────────────

    pub fn style_default(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn style_dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    pub fn style_accent(&self) -> Style {
        Style::default().fg(self.accent).bg(self.bg)
    }

    pub fn style_accent_bold(&self) -> Style {
        self.style_accent().add_modifier(Modifier::BOLD)
    }

    pub fn style_selected(&self) -> Style {
        Style::default()
            .fg(self.fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn style_key_hint(&self) -> Style {
        self.help_key
    }

    pub fn style_border(&self) -> Style {
        Style::default().fg(self.border).bg(self.bg)
    }

    pub fn style_border_focused(&self) -> Style {
        Style::default().fg(self.border_focused).bg(self.bg)
    }

    pub fn style_card_back(&self) -> Style {
        Style::default().fg(self.card_back).bg(self.bg)
    }

    pub fn style_favorite(&self) -> Style {
        Style::default()
            .fg(self.favorite)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }
}
