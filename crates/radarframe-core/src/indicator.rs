//! Connection indicator brightness waveform.
//!
//! The LED pulses sinusoidally at 1 Hz while connection attempts run,
//! sampled on a 50 ms tick. The waveform is a quarter-symmetric lookup
//! table so no floating point is needed on the device.

/// Tick cadence of the pulse driver.
pub const PULSE_TICK_MS: u64 = 50;
/// Full waveform period (1 Hz pulse).
pub const PULSE_PERIOD_MS: u64 = 1_000;

/// Solid-on level shown after a successful connect.
pub const BRIGHTNESS_SOLID: u8 = 100;
/// Off level after total failure.
pub const BRIGHTNESS_OFF: u8 = 0;

/// `sin(2*pi*t/period) * 40 + 60`, one entry per 50 ms tick.
const PULSE_TABLE: [u8; 20] = [
    60, 72, 84, 92, 98, 100, 98, 92, 84, 72, 60, 48, 36, 28, 22, 20, 22, 28, 36, 48,
];

/// Brightness sample for a pulse at `t_ms` since the pulse started.
pub fn pulse_brightness(t_ms: u64) -> u8 {
    let tick = (t_ms / PULSE_TICK_MS) as usize % PULSE_TABLE.len();
    PULSE_TABLE[tick]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_stays_in_pulse_range() {
        for t_ms in (0..2_000).step_by(50) {
            let level = pulse_brightness(t_ms);
            assert!((20..=100).contains(&level), "t_ms={t_ms} level={level}");
        }
    }

    #[test]
    fn waveform_peaks_a_quarter_period_in() {
        assert_eq!(pulse_brightness(0), 60);
        assert_eq!(pulse_brightness(PULSE_PERIOD_MS / 4), 100);
        assert_eq!(pulse_brightness(3 * PULSE_PERIOD_MS / 4), 20);
    }

    #[test]
    fn waveform_repeats_every_period() {
        for t_ms in (0..PULSE_PERIOD_MS).step_by(50) {
            assert_eq!(pulse_brightness(t_ms), pulse_brightness(t_ms + PULSE_PERIOD_MS));
        }
    }
}
