use std::f32::consts::{PI, TAU};

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::animation::timeline::PhaseValues;
use crate::animation::{lerp, spinner};
use crate::app::App;
use crate::deck::CardKind;
use crate::machine::{Face, RevealState};
use crate::session::{Snapshot, SpreadView};
use crate::ui::pages::journal::short_date;
use crate::ui::theme::{Theme, CARD_BACK_PATTERN, ICON_FAVORITE, ICON_NOT_FAVORITE, ICON_SELECTED};

const FAN_CARD_W: u16 = 6;
const FAN_CARD_H: u16 = 8;
const SPREAD_CARD_W: u16 = 28;
const SPREAD_CARD_H: u16 = 16;
/// Peak sideways jitter while shaking, in cells
const SHAKE_AMPLITUDE: f32 = 2.0;
/// Orbit radius of swirling slots, in cells
const SWIRL_RADIUS: f32 = 6.0;

/// Offset of one fan slot from the fan's resting centre line, in cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotOffset {
    pub x: f32,
    pub y: f32,
}

/// Where each fan slot sits for the given shuffle values.
///
/// At rest the slots are spread evenly `spacing` apart. Collapse pulls them
/// to the centre, shake jitters alternate slots in opposite directions, and
/// swirl sends every other slot once around a small ellipse.
pub fn fan_offsets(slots: usize, spacing: f32, phase: PhaseValues) -> Vec<SlotOffset> {
    let mid = (slots as f32 - 1.0) / 2.0;
    (0..slots)
        .map(|i| {
            let rest = (i as f32 - mid) * spacing;
            let mut x = lerp(rest, 0.0, phase.collapse);
            let mut y = 0.0;

            let dir = if i % 2 == 0 { 1.0 } else { -1.0 };
            x += dir * phase.shake * SHAKE_AMPLITUDE;

            if i % 2 == 1 {
                let angle = phase.swirl * TAU + i as f32;
                x += SWIRL_RADIUS * (angle.sin() - (i as f32).sin());
                y += SWIRL_RADIUS / 3.0 * (angle.cos() - (i as f32).cos());
            }
            SlotOffset { x, y }
        })
        .collect()
}

/// Visible width of a card mid-flip: full face-on, zero edge-on.
pub fn squeeze_width(full: u16, flip: f32) -> u16 {
    let scale = (flip.clamp(0.0, 1.0) * PI).cos().abs();
    (full as f32 * scale).round() as u16
}

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let snap = app.session.snapshot();
    if snap.showing_fan() {
        render_fan(f, app, &snap, area);
    } else {
        render_spread(f, app, &snap, area);
    }
}

// ── Fan ───────────────────────────────────────────────────────────────

fn render_fan(f: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(FAN_CARD_H + 2), Constraint::Length(2)])
        .split(area);
    let table = chunks[0];

    let spacing = if snap.fan_size > 1 {
        ((table.width.saturating_sub(FAN_CARD_W + 4)) as f32 / (snap.fan_size - 1) as f32)
            .min(FAN_CARD_W as f32 + 2.0)
    } else {
        0.0
    };
    let centre_x = table.x as f32 + table.width as f32 / 2.0 - FAN_CARD_W as f32 / 2.0;
    let centre_y = table.y as f32 + (table.height.saturating_sub(FAN_CARD_H)) as f32 / 2.0;

    for (slot, offset) in fan_offsets(snap.fan_size, spacing, snap.phase)
        .into_iter()
        .enumerate()
    {
        let selected = snap.selection.slots.contains(&slot);
        let lift = if selected {
            // pending picks rise further as the confirm highlight grows
            1.0 + snap.selection.confirm_value
        } else {
            0.0
        };
        let x = centre_x + offset.x;
        let y = centre_y + offset.y - lift;
        let Some(rect) = clip(table, x, y, FAN_CARD_W, FAN_CARD_H) else {
            continue;
        };

        let cursor = slot == app.fan_cursor && !snap.shuffling;
        let border = if cursor {
            theme.style_border_focused().add_modifier(Modifier::BOLD)
        } else if selected {
            Style::default().fg(theme.accent_secondary)
        } else {
            theme.style_border()
        };
        f.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(border);
        let inner = block.inner(rect);
        f.render_widget(block, rect);
        f.render_widget(card_back(inner, theme), inner);

        if selected && rect.y > table.y {
            let marker = Rect::new(rect.x + rect.width / 2, rect.y + rect.height, 1, 1);
            if marker.y < table.y + table.height {
                let arrow =
                    Span::styled(ICON_SELECTED, Style::default().fg(theme.accent_secondary));
                f.render_widget(Paragraph::new(arrow), marker);
            }
        }
    }

    f.render_widget(fan_hint(app, snap, theme), chunks[1]);
}

fn fan_hint<'a>(app: &App, snap: &Snapshot, theme: &Theme) -> Paragraph<'a> {
    let line = if snap.shuffling {
        Line::from(vec![
            Span::styled(
                format!("{} ", spinner::shimmer_frame(app.animation.tick_count)),
                theme.style_accent(),
            ),
            Span::styled("Shuffling…", theme.style_dim()),
            Span::styled(
                format!(" {}", progress_label(snap.shuffle_progress)),
                theme.style_dim(),
            ),
        ])
    } else if snap.selection.confirm_pending {
        Line::from(vec![
            Span::styled(
                format!("{} ", spinner::moon_frame(app.animation.tick_count)),
                theme.style_accent(),
            ),
            Span::styled("Pick again or press y to draw", theme.style_default()),
        ])
    } else {
        let need = snap.mode.required();
        let have = snap.selection.slots.len();
        let text = if need == 1 {
            "Choose a card".to_string()
        } else {
            format!("Choose {} cards ({have}/{need})", need)
        };
        Line::from(Span::styled(text, theme.style_dim()))
    };
    Paragraph::new(line).alignment(Alignment::Center)
}

fn card_back<'a>(inner: Rect, theme: &Theme) -> Paragraph<'a> {
    let lines: Vec<Line> = (0..inner.height)
        .map(|row| {
            let tile = CARD_BACK_PATTERN[row as usize % CARD_BACK_PATTERN.len()];
            let text: String = tile.chars().cycle().take(inner.width as usize).collect();
            Line::from(Span::styled(text, theme.style_card_back()))
        })
        .collect();
    Paragraph::new(lines)
}

fn progress_label(progress: Option<f32>) -> String {
    let pct = (progress.unwrap_or(0.0).clamp(0.0, 1.0) * 100.0).round() as u8;
    format!("{pct:>3}%")
}

/// Rect for a card whose top-left corner is at (`x`, `y`), or `None` if it
/// would fall outside `bounds`.
fn clip(bounds: Rect, x: f32, y: f32, w: u16, h: u16) -> Option<Rect> {
    let x = x.round();
    let y = y.round();
    if x < bounds.x as f32 || y < bounds.y as f32 {
        return None;
    }
    let (x, y) = (x as u16, y as u16);
    if x + w > bounds.x + bounds.width || y + h > bounds.y + bounds.height {
        return None;
    }
    Some(Rect::new(x, y, w, h))
}

// ── Spread ────────────────────────────────────────────────────────────

fn render_spread(f: &mut Frame, app: &App, snap: &Snapshot, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(SPREAD_CARD_H + 1), Constraint::Min(3)])
        .split(area);

    let count = snap.spread.len() as u16;
    let card_w = SPREAD_CARD_W.min(chunks[0].width / count.max(1));
    let total_w = card_w * count;
    let start_x = chunks[0].x + chunks[0].width.saturating_sub(total_w) / 2;

    for (i, view) in snap.spread.iter().enumerate() {
        let slot = Rect::new(
            start_x + card_w * i as u16,
            chunks[0].y,
            card_w,
            SPREAD_CARD_H.min(chunks[0].height),
        );
        render_card(f, &app.theme, view, i == snap.focus, slot);
    }

    if let Some(view) = snap.focused() {
        render_journal_panel(f, app, view, chunks[1]);
    }
}

fn render_card(f: &mut Frame, theme: &Theme, view: &SpreadView, focused: bool, slot: Rect) {
    if slot.width < 4 || slot.height < 3 {
        return;
    }
    let width = squeeze_width(slot.width.saturating_sub(2), view.flip).max(2);
    let rect = Rect::new(
        slot.x + (slot.width.saturating_sub(width)) / 2,
        slot.y,
        width,
        slot.height,
    );

    // A card mid-flip ignores taps; its border stays dim until it settles
    let border = if focused && view.locked {
        theme.style_border().add_modifier(Modifier::BOLD)
    } else if focused {
        theme.style_border_focused()
    } else {
        theme.style_border()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(border);
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    // The back shows until the flip passes edge-on
    if view.flip < 0.5 || width < 8 {
        f.render_widget(card_back(inner, theme), inner);
        return;
    }

    let body = match view.displayed {
        Face::Card => card_face(theme, view),
        Face::Detail => detail_face(theme, view),
    };
    f.render_widget(Paragraph::new(body).wrap(Wrap { trim: true }), inner);
}

fn card_face<'a>(theme: &Theme, view: &'a SpreadView) -> Vec<Line<'a>> {
    let card = &view.card;
    let heart = if view.favorite {
        Span::styled(ICON_FAVORITE, theme.style_favorite())
    } else {
        Span::styled(ICON_NOT_FAVORITE, theme.style_dim())
    };
    let mut lines = vec![
        Line::from(heart).alignment(Alignment::Right),
        Line::from(""),
        Line::from(Span::styled(card.title.as_str(), theme.style_accent_bold()))
            .alignment(Alignment::Center),
        Line::from(""),
    ];
    if !card.image.is_empty() {
        lines.push(
            Line::from(Span::styled(format!("[{}]", card.image), theme.style_dim()))
                .alignment(Alignment::Center),
        );
    }
    if card.kind != CardKind::Ordinary {
        lines.push(
            Line::from(Span::styled(card.kind.to_string(), theme.style_dim()))
                .alignment(Alignment::Center),
        );
    }
    if card.has_detail() {
        lines.push(Line::from(""));
        let hint = match view.state {
            RevealState::Front => "Enter: read more",
            _ => "",
        };
        lines.push(Line::from(Span::styled(hint, theme.style_dim())).alignment(Alignment::Center));
    }
    lines
}

fn detail_face<'a>(theme: &Theme, view: &'a SpreadView) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(Span::styled(
        view.card.title.as_str(),
        theme.style_accent_bold(),
    ))];
    let Some(detail) = view.card.detail.as_ref() else {
        return lines;
    };
    if let Some(ref image) = detail.image {
        lines.push(Line::from(Span::styled(format!("[{image}]"), theme.style_dim())));
    }
    for p in &detail.paragraphs {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(p.as_str(), theme.style_default())));
    }
    for prompt in &detail.prompts {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("? ", Style::default().fg(theme.accent_secondary)),
            Span::styled(prompt.as_str(), theme.style_default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    if view.state == RevealState::Detail {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("b: back", theme.style_dim())));
    }
    lines
}

fn render_journal_panel(f: &mut Frame, app: &App, view: &SpreadView, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .title(Span::styled(
            format!(" Journal · {} ", view.card.title),
            theme.style_accent_bold(),
        ))
        .borders(Borders::TOP)
        .border_style(theme.style_border());

    let entries = app.session.records().journal().entries_for(&view.card.id);
    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled(
            "No entries yet. Press j to write one.",
            theme.style_dim(),
        ))]
    } else {
        entries
            .iter()
            .map(|e| {
                Line::from(vec![
                    Span::styled(format!("{}  ", short_date(&e.created_at)), theme.style_dim()),
                    Span::styled(e.entry.as_str(), theme.style_default()),
                ])
            })
            .collect()
    };
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}
