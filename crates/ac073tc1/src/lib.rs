#![cfg_attr(not(test), no_std)]

//! AC073TC1 (7.3" 800x480 seven-color e-paper) driver primitives.

mod framebuffer;
pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use framebuffer::{Color, FrameBuffer};

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Reset pulse width in microseconds.
    pub reset_pulse_us: u32,
    /// Busy poll interval in microseconds.
    pub busy_poll_us: u32,
    /// Busy timeout for a full refresh, in milliseconds. A seven-color
    /// refresh takes on the order of 30 seconds.
    pub refresh_timeout_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reset_pulse_us: 1_000,
            busy_poll_us: 1_000,
            refresh_timeout_ms: 45_000,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, PinErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// Control pin operation failed.
    Pin(PinErr),
    /// BUSY never released within the configured timeout.
    BusyTimeout,
}

pub type DriverResult<SpiErr, PinErr> = Result<(), Error<SpiErr, PinErr>>;

/// AC073TC1 driver over a raw SPI bus with explicit control pins.
#[derive(Debug)]
pub struct Ac073<SPI, CS, DC, RST, BUSY> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: RST,
    busy: BUSY,
    config: Config,
}

impl<SPI, CS, DC, RST, BUSY, PinErr> Ac073<SPI, CS, DC, RST, BUSY>
where
    SPI: SpiBus<u8>,
    CS: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
{
    /// Creates a new driver instance.
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST, busy: BUSY, config: Config) -> Self {
        Self {
            spi,
            cs,
            dc,
            rst,
            busy,
            config,
        }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases owned bus and pins.
    pub fn release(self) -> (SPI, CS, DC, RST, BUSY) {
        (self.spi, self.cs, self.dc, self.rst, self.busy)
    }

    fn command(&mut self, command: u8, data: &[u8]) -> DriverResult<SPI::Error, PinErr> {
        self.cs.set_low().map_err(Error::Pin)?;
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi.write(&[command]).map_err(Error::Spi)?;

        if !data.is_empty() {
            self.dc.set_high().map_err(Error::Pin)?;
            self.spi.write(data).map_err(Error::Spi)?;
        }

        self.spi.flush().map_err(Error::Spi)?;
        self.cs.set_high().map_err(Error::Pin)
    }

    fn wait_idle<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> DriverResult<SPI::Error, PinErr> {
        let polls = timeout_ms.saturating_mul(1_000) / self.config.busy_poll_us.max(1);
        for _ in 0..polls {
            // BUSY is active low on this controller.
            if self.busy.is_high().map_err(Error::Pin)? {
                return Ok(());
            }
            delay.delay_us(self.config.busy_poll_us);
        }

        Err(Error::BusyTimeout)
    }

    /// Pulses RESET and runs the power-on register sequence.
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> DriverResult<SPI::Error, PinErr> {
        self.cs.set_high().map_err(Error::Pin)?;
        self.rst.set_low().map_err(Error::Pin)?;
        delay.delay_us(self.config.reset_pulse_us);
        self.rst.set_high().map_err(Error::Pin)?;
        delay.delay_ms(20);
        self.wait_idle(delay, 1_000)?;

        self.command(protocol::cmd::PSR, &[0x5F, 0x69])?;
        self.command(protocol::cmd::PWR, &[0x3F, 0x00, 0x32, 0x2A, 0x0E, 0x2A])?;
        self.command(protocol::cmd::BTST1, &[0x40, 0x1F, 0x1F, 0x2C])?;
        self.command(protocol::cmd::BTST2, &[0x6F, 0x1F, 0x16, 0x25])?;
        self.command(protocol::cmd::IPC, &[0x00, 0x04])?;
        self.command(protocol::cmd::TRES, &protocol::encode_resolution())?;
        self.command(protocol::cmd::CDI, &[0x3F])?;

        Ok(())
    }

    /// Pushes a full framebuffer and runs a refresh cycle.
    pub fn update<D: DelayNs>(
        &mut self,
        buffer: &[u8; protocol::BUFFER_SIZE],
        delay: &mut D,
    ) -> DriverResult<SPI::Error, PinErr> {
        self.cs.set_low().map_err(Error::Pin)?;
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi.write(&[protocol::cmd::DTM1]).map_err(Error::Spi)?;
        self.dc.set_high().map_err(Error::Pin)?;
        for line in buffer.chunks_exact(protocol::LINE_BYTES) {
            self.spi.write(line).map_err(Error::Spi)?;
        }
        self.spi.flush().map_err(Error::Spi)?;
        self.cs.set_high().map_err(Error::Pin)?;

        self.command(protocol::cmd::PON, &[])?;
        self.wait_idle(delay, 1_000)?;

        self.command(protocol::cmd::DRF, &[0x00])?;
        self.wait_idle(delay, self.config.refresh_timeout_ms)?;

        self.command(protocol::cmd::POF, &[0x00])?;
        self.wait_idle(delay, 1_000)
    }

    /// Puts the controller into deep sleep. Only a RESET pulse wakes it.
    pub fn deep_sleep(&mut self) -> DriverResult<SPI::Error, PinErr> {
        self.command(protocol::cmd::DSLP, &[0xA5])
    }
}
