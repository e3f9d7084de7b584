//! Battery voltage sampling over the VBAT divider.

use core::fmt::Write;

use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::peripherals::{ADC1, GPIO4};
use heapless::String;
use log::info;

const SAMPLE_COUNT: u32 = 10;
// VBAT is halved by the on-board divider before it reaches the pin.
const DIVIDER_NUM: u32 = 2;
// 11 dB attenuation full scale, in millivolts, against the 12-bit range.
const FULL_SCALE_MV: u32 = 3_100;
const ADC_MAX: u32 = 4_095;
const MIN_BATTERY_MV: u32 = 3_000;
const MAX_BATTERY_MV: u32 = 4_100;

pub type BatteryStatus = String<16>;

/// Reads the battery divider on GPIO4 via ADC1.
pub struct BatteryMonitor<'d> {
    adc: Adc<'d, ADC1<'d>, esp_hal::Blocking>,
    pin: AdcPin<GPIO4<'d>, ADC1<'d>>,
}

impl<'d> BatteryMonitor<'d> {
    pub fn new(adc1: ADC1<'d>, vbat_pin: GPIO4<'d>) -> Self {
        let mut config = AdcConfig::new();
        let pin = config.enable_pin(vbat_pin, Attenuation::_11dB);
        Self {
            adc: Adc::new(adc1, config),
            pin,
        }
    }

    fn read_millivolts(&mut self) -> Option<u32> {
        let mut sum = 0u32;
        let mut samples = 0u32;

        for _ in 0..SAMPLE_COUNT {
            if let Ok(raw) = self.adc.read_oneshot(&mut self.pin) {
                sum += raw as u32;
                samples += 1;
            }
        }

        if samples == 0 {
            return None;
        }

        Some(sum / samples * FULL_SCALE_MV / ADC_MAX * DIVIDER_NUM)
    }

    fn percentage(millivolts: u32) -> u32 {
        let clamped = millivolts.clamp(MIN_BATTERY_MV, MAX_BATTERY_MV);
        (clamped - MIN_BATTERY_MV) * 100 / (MAX_BATTERY_MV - MIN_BATTERY_MV)
    }

    /// Battery reading for the overlay, `"ERR"` when sampling fails.
    ///
    /// Never fails the cycle; the worst case is an error string.
    pub fn status_string(&mut self) -> BatteryStatus {
        let mut out = BatteryStatus::new();

        match self.read_millivolts() {
            Some(mv) => {
                info!("battery: vbat_mv={}", mv);
                let _ = write!(
                    out,
                    "{}.{}V {}%",
                    mv / 1_000,
                    (mv % 1_000) / 100,
                    Self::percentage(mv)
                );
            }
            None => {
                let _ = out.push_str("ERR");
            }
        }

        out
    }
}
