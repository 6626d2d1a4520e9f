pub mod confirm_dialog;
pub mod input_dialog;
pub mod status_bar;
pub mod tabs;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Create a centered rectangle of given percentage width and fixed height,
/// nudged down by `y_offset` rows while a dialog slides in
pub fn centered_rect(percent_x: u16, height: u16, y_offset: u16, area: Rect) -> Rect {
    let top = (area.height.saturating_sub(height)) / 2 + y_offset;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top.min(area.height.saturating_sub(height))),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_sits_in_the_middle() {
        let area = Rect::new(0, 0, 100, 40);
        let r = centered_rect(50, 10, 0, area);
        assert_eq!((r.x, r.y, r.width, r.height), (25, 15, 50, 10));
        let slid = centered_rect(50, 10, 3, area);
        assert_eq!(slid.y, 18);
    }
}
