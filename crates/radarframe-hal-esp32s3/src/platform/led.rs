//! Connection indicator LED on the LEDC peripheral.
//!
//! Brightness is a duty percentage so callers can feed the pulse
//! waveform straight in without knowing about timers or channels.

use esp_hal::gpio::DriveMode;
use esp_hal::ledc::{
    LSGlobalClkSource, Ledc, LowSpeed,
    channel::{self, Channel, ChannelIFace},
    timer::{self, LSClockSource, TimerIFace},
};
use esp_hal::peripherals::{GPIO5, LEDC};
use esp_hal::time::Rate;
use static_cell::StaticCell;

static LEDC_DRIVER: StaticCell<Ledc<'static>> = StaticCell::new();
static LED_TIMER: StaticCell<timer::Timer<'static, LowSpeed>> = StaticCell::new();

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LedError {
    Timer,
    Channel,
}

/// PWM-dimmed status LED.
///
/// A disabled instance swallows brightness updates, so callers never
/// have to branch on whether the LED came up.
pub struct ConnectionLed<'d> {
    channel: Option<Channel<'d, LowSpeed>>,
}

impl ConnectionLed<'static> {
    /// Claims the LEDC peripheral and binds the LED pin to channel 0.
    pub fn init(ledc: LEDC<'static>, pin: GPIO5<'static>) -> Result<Self, LedError> {
        let ledc = LEDC_DRIVER.init(Ledc::new(ledc));
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

        let mut led_timer = ledc.timer::<LowSpeed>(timer::Number::Timer0);
        led_timer
            .configure(timer::config::Config {
                duty: timer::config::Duty::Duty10Bit,
                clock_source: LSClockSource::APBClk,
                frequency: Rate::from_khz(1),
            })
            .map_err(|_| LedError::Timer)?;
        let led_timer = LED_TIMER.init(led_timer);

        let mut channel = ledc.channel(channel::Number::Channel0, pin);
        channel
            .configure(channel::config::Config {
                timer: &*led_timer,
                duty_pct: 0,
                drive_mode: DriveMode::PushPull,
            })
            .map_err(|_| LedError::Channel)?;

        Ok(Self {
            channel: Some(channel),
        })
    }
}

impl ConnectionLed<'_> {
    /// A no-op LED for boards where channel setup failed.
    pub const fn disabled() -> Self {
        Self { channel: None }
    }

    /// Sets brightness as a duty percentage, clamped to 100.
    pub fn set_brightness(&self, percent: u8) {
        if let Some(channel) = &self.channel {
            let _ = channel.set_duty(percent.min(100));
        }
    }

    pub fn off(&self) {
        self.set_brightness(0);
    }
}
