use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use embassy_time::{Duration as EmbassyDuration, Instant, Timer, WithTimeout};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController};
use log::info;
use radarframe_core::{
    error::ErrorKind,
    indicator::{BRIGHTNESS_OFF, BRIGHTNESS_SOLID, PULSE_TICK_MS, pulse_brightness},
    net::{KnownNetwork, rotation},
};
use radarframe_hal_esp32s3::platform::led::ConnectionLed;

const ATTEMPT_TIMEOUT_SECS: u64 = 10;
const ASSOC_SETTLE_SECS: u64 = 2;
const STATUS_POLL_SECS: u64 = 1;
const DHCP_TIMEOUT_SECS: u64 = 15;

/// One association attempt against a single network, bounded by the
/// attempt timeout.
async fn attempt_association(
    controller: &mut WifiController<'static>,
    network: &KnownNetwork,
) -> Result<(), ErrorKind> {
    if controller.is_started().unwrap_or(false) {
        let _ = controller.stop_async().await;
    }

    let client_config = ClientConfig::default()
        .with_ssid(network.ssid.into())
        .with_password(network.password.into());
    controller
        .set_config(&ModeConfig::Client(client_config))
        .map_err(|_| ErrorKind::NotInitialised)?;
    controller
        .start_async()
        .await
        .map_err(|_| ErrorKind::NotInitialised)?;

    let deadline = Instant::now() + EmbassyDuration::from_secs(ATTEMPT_TIMEOUT_SECS);
    match controller
        .connect_async()
        .with_timeout(EmbassyDuration::from_secs(ATTEMPT_TIMEOUT_SECS))
        .await
    {
        Ok(Ok(())) => {}
        // The join can be rejected and still come up moments later;
        // keep polling until the attempt deadline.
        Ok(Err(err)) => info!("wifi: join rejected: {:?}", err),
        Err(_) => return Err(ErrorKind::Timeout),
    }

    Timer::after_secs(ASSOC_SETTLE_SECS).await;
    while Instant::now() < deadline {
        if matches!(controller.is_connected(), Ok(true)) {
            return Ok(());
        }
        Timer::after_secs(STATUS_POLL_SECS).await;
    }

    if matches!(controller.is_connected(), Ok(true)) {
        Ok(())
    } else {
        Err(ErrorKind::Timeout)
    }
}

/// Walks the known-network rotation starting at the preferred index and
/// returns the index that came up, with DHCP configured.
///
/// The indicator LED pulses for the duration of the pass; dropping the
/// pulse future on completion is what stops it. The LED ends solid on
/// success and off on failure.
pub(super) async fn connect(
    controller: &mut WifiController<'static>,
    stack: Stack<'_>,
    networks: &[KnownNetwork],
    preferred_index: usize,
    led: &ConnectionLed<'_>,
) -> Result<usize, ErrorKind> {
    if networks.is_empty() {
        led.off();
        return Err(ErrorKind::NotInitialised);
    }

    let pass_start = Instant::now();
    let pulse = async {
        loop {
            led.set_brightness(pulse_brightness(pass_start.elapsed().as_millis()));
            Timer::after_millis(PULSE_TICK_MS).await;
        }
    };
    let attempts = async {
        for index in rotation(preferred_index, networks.len()) {
            let network = &networks[index];
            info!("wifi: trying \"{}\" (index {})", network.ssid, index);

            match attempt_association(controller, network).await {
                Ok(()) => {
                    match stack
                        .wait_config_up()
                        .with_timeout(EmbassyDuration::from_secs(DHCP_TIMEOUT_SECS))
                        .await
                    {
                        Ok(()) => {
                            info!("wifi: connected to \"{}\", dhcp ready", network.ssid);
                            return Ok(index);
                        }
                        Err(_) => {
                            info!("wifi: dhcp timeout on \"{}\"", network.ssid);
                            let _ = controller.disconnect_async().await;
                        }
                    }
                }
                Err(kind) => {
                    info!("wifi: \"{}\" failed: {}", network.ssid, kind.as_str());
                }
            }
        }
        Err(ErrorKind::Timeout)
    };

    let result = match select(attempts, pulse).await {
        Either::First(result) => result,
        Either::Second(_) => unreachable!(),
    };

    match result {
        Ok(_) => led.set_brightness(BRIGHTNESS_SOLID),
        Err(_) => led.set_brightness(BRIGHTNESS_OFF),
    }
    result
}

/// Brings the interface down after the cycle's fetches are done.
pub(super) async fn teardown(controller: &mut WifiController<'static>) {
    let _ = controller.disconnect_async().await;
    let _ = controller.stop_async().await;
    info!("wifi: interface down");
}
