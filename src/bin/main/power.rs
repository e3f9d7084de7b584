use ac073tc1::Ac073;
use embedded_hal::{
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};
use esp_hal::{
    peripherals::LPWR,
    rtc_cntl::{Rtc, sleep::TimerWakeupSource},
};
use log::info;

pub(super) fn enter_deep_sleep<SPI, CS, DC, RST, BUSY, PinErr>(
    panel: &mut Ac073<SPI, CS, DC, RST, BUSY>,
    wake_after_minutes: u16,
) -> !
where
    SPI: SpiBus<u8>,
    CS: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
{
    // The panel keeps its image unpowered; stop driving it first.
    if panel.deep_sleep().is_err() {
        info!("sleep: panel deep sleep command failed");
    }

    info!("sleep: deep sleep for {} minutes", wake_after_minutes);

    let mut rtc = Rtc::new(unsafe { LPWR::steal() });
    let wake_source = TimerWakeupSource::new(core::time::Duration::from_secs(
        u64::from(wake_after_minutes) * 60,
    ));
    rtc.sleep_deep(&[&wake_source]);
}
