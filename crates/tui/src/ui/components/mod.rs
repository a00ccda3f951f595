pub mod card;
pub mod charts;
pub mod detail;
pub mod help_overlay;
pub mod toast;
pub mod type_picker;

use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Rectangle of `percent_x` by `percent_y` of `area`, centered in it.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    rect
}

/// Fixed-size rectangle centered in `area`, shrunk to fit.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rect_never_exceeds_area() {
        let area = Rect::new(0, 0, 20, 6);
        assert_eq!(centered_fixed(60, 12, area), area);
        assert_eq!(centered_fixed(10, 2, area), Rect::new(5, 2, 10, 2));
    }
}
