use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub keyword: Color,
    pub number: Color,
    pub label: Color,
    pub register: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),
    secondary: Color::Rgb(250, 179, 135),
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    keyword: Color::Rgb(137, 180, 250),        // Mnemonics
    number: Color::Rgb(250, 179, 135),         // Immediates
    label: Color::Rgb(249, 226, 175),          // Yellow for labels
    register: Color::Rgb(148, 226, 213),       // Teal for registers
    border_focused: Color::Rgb(249, 226, 175),
    border_normal: Color::Rgb(108, 112, 134),
    current_line_bg: Color::Rgb(50, 50, 70),
};
