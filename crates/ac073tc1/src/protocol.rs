//! Wire-level constants and pixel packing for AC073TC1.

/// Panel width in pixels.
pub const WIDTH: usize = 800;
/// Panel height in pixels.
pub const HEIGHT: usize = 480;
/// Two 4-bit pixels per byte.
pub const LINE_BYTES: usize = WIDTH / 2;
/// Total framebuffer size in bytes.
pub const BUFFER_SIZE: usize = LINE_BYTES * HEIGHT;

/// Controller commands used by the driver.
pub mod cmd {
    pub const PSR: u8 = 0x00;
    pub const PWR: u8 = 0x01;
    pub const POF: u8 = 0x02;
    pub const PON: u8 = 0x04;
    pub const BTST1: u8 = 0x05;
    pub const BTST2: u8 = 0x06;
    pub const DSLP: u8 = 0x07;
    pub const DTM1: u8 = 0x10;
    pub const DRF: u8 = 0x12;
    pub const IPC: u8 = 0x13;
    pub const TRES: u8 = 0x61;
    pub const CDI: u8 = 0x50;
}

/// Packs two palette nibbles into one framebuffer byte.
///
/// The left pixel of the pair occupies the high nibble.
#[inline]
pub const fn pack_pair(left: u8, right: u8) -> u8 {
    ((left & 0x0F) << 4) | (right & 0x0F)
}

/// Splits a framebuffer byte back into `(left, right)` nibbles.
#[inline]
pub const fn unpack_pair(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0F)
}

/// Resolution payload for the `TRES` command.
#[inline]
pub const fn encode_resolution() -> [u8; 4] {
    [
        (WIDTH >> 8) as u8,
        (WIDTH & 0xFF) as u8,
        (HEIGHT >> 8) as u8,
        (HEIGHT & 0xFF) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_packing_is_high_nibble_first() {
        assert_eq!(pack_pair(0x4, 0x1), 0x41);
        assert_eq!(unpack_pair(0x41), (0x4, 0x1));
    }

    #[test]
    fn packing_masks_out_of_range_values() {
        assert_eq!(pack_pair(0xFF, 0xFF), 0xFF);
        assert_eq!(pack_pair(0x17, 0x23), 0x73);
    }

    #[test]
    fn resolution_payload_matches_panel() {
        assert_eq!(encode_resolution(), [0x03, 0x20, 0x01, 0xE0]);
    }

    #[test]
    fn buffer_size_matches_packed_geometry() {
        assert_eq!(BUFFER_SIZE, 192_000);
    }
}
