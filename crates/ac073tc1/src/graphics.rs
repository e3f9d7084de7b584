use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{
        PixelColor,
        raw::{RawData, RawU4},
    },
};

use crate::{Color, FrameBuffer, protocol};

impl PixelColor for Color {
    type Raw = RawU4;
}

impl From<RawU4> for Color {
    fn from(raw: RawU4) -> Self {
        Color::from_nibble(raw.into_inner() & 0x07).unwrap_or(Color::White)
    }
}

impl From<Color> for RawU4 {
    fn from(color: Color) -> Self {
        RawU4::new(color.nibble())
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }

            let _ = self.set_pixel(point.x as usize, point.y as usize, color);
        }

        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(protocol::WIDTH as u32, protocol::HEIGHT as u32)
    }
}
