pub mod issue_list;
pub mod legend;
pub mod map_canvas;
pub mod popup;

use ratatui::style::Color;

use crate::map::Rgb;

/// Terminal color for a palette color
pub fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}
