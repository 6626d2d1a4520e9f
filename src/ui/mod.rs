pub mod components;
pub mod help;
pub mod pages;
pub mod theme;

use ratatui::layout::Rect;
use ratatui::Frame;

use crate::app::App;

/// Top-level draw function, dispatches to the active page
pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    pages::render(f, app, area);
}

/// Fixed-size rectangle centred in `area`, shrunk to fit when `area` is smaller
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
