//! Overlay painting on the panel framebuffer.
//!
//! Streamed pixel data lands in the framebuffer verbatim; these helpers
//! only draw the status/error/overlay layer on top of it. The panel
//! itself is driven by the `ac073tc1` crate.

use ac073tc1::{Color, FrameBuffer};
use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_10X20},
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
    text::Text,
};

const FONT: &embedded_graphics::mono_font::MonoFont<'_> = &FONT_10X20;

/// Fills an axis-aligned rectangle.
pub fn fill_rect(frame: &mut FrameBuffer, x: i32, y: i32, width: u32, height: u32, color: Color) {
    let _ = Rectangle::new(Point::new(x, y), Size::new(width, height))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(frame);
}

/// Fills a circle whose bounding box starts at `(x, y)`.
pub fn draw_circle(frame: &mut FrameBuffer, x: i32, y: i32, diameter: u32, color: Color) {
    let _ = Circle::new(Point::new(x, y), diameter)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(frame);
}

/// Draws one line of text with its top-left corner at `(x, y)`.
pub fn draw_text(frame: &mut FrameBuffer, text: &str, x: i32, y: i32, color: Color) {
    let style = MonoTextStyle::new(FONT, color);
    let baseline = y + FONT.baseline as i32;
    let _ = Text::new(text, Point::new(x, baseline), style).draw(frame);
}

/// Pixel extent of one line of text in the overlay font.
pub fn measure_text(text: &str) -> (u32, u32) {
    let width = text.chars().count() as u32 * FONT.character_size.width;
    (width, FONT.character_size.height)
}
