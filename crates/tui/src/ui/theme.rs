use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub positive: Color,
    pub error: Color,
    pub selection: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(10, 14, 28),
            surface: Color::Rgb(22, 28, 48),
            text: Color::Rgb(225, 228, 235),
            dim: Color::Rgb(140, 146, 160),
            accent: Color::Rgb(238, 66, 76),
            border: Color::Rgb(60, 68, 92),
            border_focused: Color::Rgb(238, 66, 76),
            positive: Color::Rgb(90, 190, 130),
            error: Color::Rgb(220, 90, 90),
            selection: Color::Rgb(40, 50, 84),
        }
    }
}
