//! In-memory framebuffer for AC073TC1.

use crate::protocol::{BUFFER_SIZE, HEIGHT, LINE_BYTES, WIDTH, pack_pair};

/// Panel palette.
///
/// Nibble values match the controller's data format, so framebuffer
/// bytes go to the panel verbatim.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    White = 1,
    Green = 2,
    Blue = 3,
    Red = 4,
    Yellow = 5,
    Orange = 6,
    Taupe = 7,
}

impl Color {
    pub const fn nibble(self) -> u8 {
        self as u8
    }

    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0 => Some(Self::Black),
            1 => Some(Self::White),
            2 => Some(Self::Green),
            3 => Some(Self::Blue),
            4 => Some(Self::Red),
            5 => Some(Self::Yellow),
            6 => Some(Self::Orange),
            7 => Some(Self::Taupe),
            _ => None,
        }
    }
}

/// 4bpp packed framebuffer for the panel.
///
/// Within one byte the left pixel of the pair is the high nibble.
#[derive(Clone)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Creates a new all-white framebuffer.
    pub const fn new() -> Self {
        Self {
            bytes: [pack_pair(Color::White.nibble(), Color::White.nibble()); BUFFER_SIZE],
        }
    }

    /// Returns the underlying framebuffer bytes.
    pub fn bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.bytes
    }

    /// Returns mutable framebuffer bytes.
    ///
    /// Streamed image data is written here verbatim, starting at
    /// offset 0.
    pub fn bytes_mut(&mut self) -> &mut [u8; BUFFER_SIZE] {
        &mut self.bytes
    }

    /// Fills the whole framebuffer with one color.
    pub fn fill(&mut self, color: Color) {
        self.bytes
            .fill(pack_pair(color.nibble(), color.nibble()));
    }

    /// Sets a pixel.
    ///
    /// Returns `true` when the pixel is in bounds, `false` otherwise.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }

        let byte_index = y * LINE_BYTES + x / 2;
        let byte = self.bytes[byte_index];
        self.bytes[byte_index] = if x % 2 == 0 {
            (color.nibble() << 4) | (byte & 0x0F)
        } else {
            (byte & 0xF0) | color.nibble()
        };
        true
    }

    /// Reads a pixel.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }

        let byte = self.bytes[y * LINE_BYTES + x / 2];
        let nibble = if x % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        Color::from_nibble(nibble)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_nibble_mapping_is_left_high() {
        let mut fb = FrameBuffer::new();

        assert!(fb.set_pixel(0, 0, Color::Red));
        assert!(fb.set_pixel(1, 0, Color::Black));
        assert_eq!(fb.bytes()[0], 0x40);

        assert!(fb.set_pixel(2, 0, Color::Blue));
        assert_eq!(fb.bytes()[1], 0x31);
    }

    #[test]
    fn out_of_bounds_pixel_is_ignored() {
        let mut fb = FrameBuffer::new();

        assert!(!fb.set_pixel(WIDTH, 0, Color::Red));
        assert!(!fb.set_pixel(0, HEIGHT, Color::Red));
        assert_eq!(fb.pixel(WIDTH, HEIGHT), None);
    }

    #[test]
    fn set_and_read_last_pixel() {
        let mut fb = FrameBuffer::new();

        assert!(fb.set_pixel(WIDTH - 1, HEIGHT - 1, Color::Orange));
        assert_eq!(fb.pixel(WIDTH - 1, HEIGHT - 1), Some(Color::Orange));
    }

    #[test]
    fn fill_covers_every_pair() {
        let mut fb = FrameBuffer::new();
        fb.fill(Color::Green);
        assert!(fb.bytes().iter().all(|byte| *byte == 0x22));
    }
}
