use chipvm_core::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Bytes per pixel in an RGB24 buffer.
pub const RGB24_PIXEL_SIZE: usize = 3;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);
    pub const GREEN: Color = Color::new_rgb(0, 255, 0);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }
}

/// Render the display as text, one line per row: `#` for lit pixels, `.` otherwise.
pub fn render_text(display: &[bool; SCREEN_WIDTH * SCREEN_HEIGHT]) -> String {
    let mut out = String::with_capacity((SCREEN_WIDTH + 1) * SCREEN_HEIGHT);
    for row in display.chunks(SCREEN_WIDTH) {
        out.extend(row.iter().map(|&lit| if lit { '#' } else { '.' }));
        out.push('\n');
    }
    out
}

/// Render the display into a row-major RGB24 buffer.
pub fn render_rgb(
    display: &[bool; SCREEN_WIDTH * SCREEN_HEIGHT],
    on: Color,
    off: Color,
) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(display.len() * RGB24_PIXEL_SIZE);
    for &lit in display.iter() {
        let color = if lit { on } else { off };
        buffer.extend_from_slice(&[color.r, color.g, color.b]);
    }
    buffer
}
