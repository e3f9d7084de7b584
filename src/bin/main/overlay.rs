use ac073tc1::{Color, FrameBuffer, protocol};
use radarframe_hal_esp32s3::platform::display;

const MARGIN: i32 = 10;
const PAD: i32 = 4;
const BANNER_HEIGHT: u32 = 40;

/// Image caption in the lower-left corner on a white backing box.
pub(super) fn draw_caption(frame: &mut FrameBuffer, text: &str) {
    if text.is_empty() {
        return;
    }

    let (width, height) = display::measure_text(text);
    let x = MARGIN;
    let y = protocol::HEIGHT as i32 - MARGIN - height as i32;
    display::fill_rect(
        frame,
        x - PAD,
        y - PAD,
        width + 2 * PAD as u32,
        height + 2 * PAD as u32,
        Color::White,
    );
    display::draw_text(frame, text, x, y, Color::Black);
}

/// Battery reading in the upper-right corner.
pub(super) fn draw_battery(frame: &mut FrameBuffer, status: &str) {
    if status.is_empty() {
        return;
    }

    let (width, height) = display::measure_text(status);
    let x = protocol::WIDTH as i32 - MARGIN - width as i32;
    let y = MARGIN;
    display::fill_rect(
        frame,
        x - PAD,
        y - PAD,
        width + 2 * PAD as u32,
        height + 2 * PAD as u32,
        Color::White,
    );
    display::draw_text(frame, status, x, y, Color::Black);
}

/// Red failure banner across the bottom of the frame. Drawn last, over
/// whatever the cycle managed to produce before it failed.
pub(super) fn draw_error(frame: &mut FrameBuffer, message: &str) {
    let banner_y = protocol::HEIGHT as i32 - BANNER_HEIGHT as i32;
    display::fill_rect(frame, 0, banner_y, protocol::WIDTH as u32, BANNER_HEIGHT, Color::Red);

    let (_, text_height) = display::measure_text(message);
    let text_y = banner_y + (BANNER_HEIGHT as i32 - text_height as i32) / 2;
    display::draw_text(frame, message, MARGIN, text_y, Color::White);
}
