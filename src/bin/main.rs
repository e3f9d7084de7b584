#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use core::fmt::Write as FmtWrite;

use ac073tc1::{Ac073, Color, FrameBuffer};
use embassy_executor::Spawner;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    rng::Rng,
    rtc_cntl::{SocResetReason, reset_reason, wakeup_cause},
    spi::master::Spi,
    system::Cpu,
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::WifiController;
use heapless::{String as HeaplessString, Vec as HeaplessVec};
use log::{LevelFilter, info};
use radarframe_core::{
    clock::ServerDateTime,
    cursor::ImageCursor,
    cycle::{CycleFailure, CycleStage, preference_update},
    net::KnownNetwork,
    prefs::PersistedPreference,
    schedule::{DayNightPolicy, compute_next_wake, wake_delay_minutes},
};
use radarframe_hal_esp32s3::{
    platform::{battery::BatteryMonitor, led::ConnectionLed},
    storage::flash_prefs::FlashPrefsStore,
};
use static_cell::StaticCell;

#[path = "main/fetch.rs"]
mod fetch;
#[path = "main/overlay.rs"]
mod overlay;
#[path = "main/power.rs"]
mod power;
#[path = "main/wifi.rs"]
mod wifi;

const PANEL_SPI_HZ: u32 = 10_000_000;
const SERVER_PORT: u16 = 443;
const MAX_KNOWN_NETWORKS: usize = 3;
const CAPTION_RAW_BYTES: usize = 128;
const CAPTION_BYTES: usize = 64;

const SERVER_HOST: &str = env!(
    "RADARFRAME_SERVER_HOST",
    "Set RADARFRAME_SERVER_HOST in your environment before building/flashing."
);
const WIFI_SSID: &str = env!(
    "RADARFRAME_WIFI_SSID",
    "Set RADARFRAME_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "RADARFRAME_WIFI_PASSWORD",
    "Set RADARFRAME_WIFI_PASSWORD in your environment before building/flashing."
);
const WIFI_SSID_2: Option<&str> = option_env!("RADARFRAME_WIFI_SSID_2");
const WIFI_PASSWORD_2: Option<&str> = option_env!("RADARFRAME_WIFI_PASSWORD_2");
const WIFI_SSID_3: Option<&str> = option_env!("RADARFRAME_WIFI_SSID_3");
const WIFI_PASSWORD_3: Option<&str> = option_env!("RADARFRAME_WIFI_PASSWORD_3");

static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();
static FRAME: StaticCell<FrameBuffer> = StaticCell::new();
static TLS_BUFFERS: StaticCell<fetch::TlsBuffers> = StaticCell::new();

fn known_networks() -> HeaplessVec<KnownNetwork, MAX_KNOWN_NETWORKS> {
    let mut networks = HeaplessVec::new();
    let _ = networks.push(KnownNetwork::new(WIFI_SSID, WIFI_PASSWORD));
    if let (Some(ssid), Some(password)) = (WIFI_SSID_2, WIFI_PASSWORD_2) {
        let _ = networks.push(KnownNetwork::new(ssid, password));
    }
    if let (Some(ssid), Some(password)) = (WIFI_SSID_3, WIFI_PASSWORD_3) {
        let _ = networks.push(KnownNetwork::new(ssid, password));
    }
    networks
}

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: radarframe starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    let boot_reset_reason = reset_reason(Cpu::ProCpu);
    let boot_wakeup_cause = wakeup_cause();
    let woke_from_deep_sleep = boot_reset_reason == Some(SocResetReason::CoreDeepSleep);
    info!(
        "boot reset_reason={:?} wakeup_cause={:?} from_deep_sleep={}",
        boot_reset_reason, boot_wakeup_cause, woke_from_deep_sleep
    );

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Panel wiring:
    // SCK=GPIO12, MOSI=GPIO11, CS=GPIO10, DC=GPIO9, RST=GPIO8, BUSY=GPIO13
    let panel_cs = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    let panel_dc = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let panel_rst = Output::new(peripherals.GPIO8, Level::High, OutputConfig::default());
    let panel_busy = Input::new(
        peripherals.GPIO13,
        InputConfig::default().with_pull(Pull::Up),
    );

    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(PANEL_SPI_HZ))
        // AC073TC1 uses CPOL=0, CPHA=0.
        .with_mode(esp_hal::spi::Mode::_0);
    let spi = Spi::new(peripherals.SPI2, spi_config)
        .unwrap()
        .with_sck(peripherals.GPIO12)
        .with_mosi(peripherals.GPIO11);

    let mut delay = Delay::new();
    let mut panel = Ac073::new(
        spi,
        panel_cs,
        panel_dc,
        panel_rst,
        panel_busy,
        ac073tc1::Config::default(),
    );
    if let Err(err) = panel.initialize(&mut delay) {
        info!("display: initialize failed: {:?}", err);
    }

    // Status LED on GPIO5, battery divider on GPIO4.
    let led = match ConnectionLed::init(peripherals.LEDC, peripherals.GPIO5) {
        Ok(led) => led,
        Err(err) => {
            info!("led: init failed: {:?}", err);
            ConnectionLed::disabled()
        }
    };
    let mut battery = BatteryMonitor::new(peripherals.ADC1, peripherals.GPIO4);

    let frame = FRAME.init_with(FrameBuffer::new);
    let tls_buffers = TLS_BUFFERS.init_with(fetch::TlsBuffers::new);
    let rng = Rng::new();

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            fail_to_sleep(&mut panel, frame, &mut delay)
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                fail_to_sleep(&mut panel, frame, &mut delay)
            }
        };

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        seed,
    );

    let networks = known_networks();
    info!(
        "boot: {} known networks, server {}:{}",
        networks.len(),
        SERVER_HOST,
        SERVER_PORT
    );
    info!("Panel pins: SCK=GPIO12 MOSI=GPIO11 CS=GPIO10 DC=GPIO9 RST=GPIO8 BUSY=GPIO13");
    info!("Indicator LED: GPIO5, battery sense: GPIO4");

    let net_future = net_runner.run();
    let cycle_future = run_cycle(
        &mut wifi_controller,
        stack,
        &networks,
        &led,
        &mut battery,
        rng,
        tls_buffers,
        frame,
        &mut panel,
        &mut delay,
    );

    let _ = embassy_futures::join::join(net_future, cycle_future).await;
    unreachable!()
}

/// One linear pass: restore config, connect, fetch, draw, schedule,
/// tear down, present, sleep. A failed stage short-circuits the rest of
/// the network work and lands in the error banner; the cycle always
/// ends in deep sleep.
#[allow(clippy::too_many_arguments)]
async fn run_cycle<SPI, CS, DC, RST, BUSY, PinErr>(
    wifi_controller: &mut WifiController<'static>,
    stack: embassy_net::Stack<'_>,
    networks: &[KnownNetwork],
    led: &ConnectionLed<'_>,
    battery: &mut BatteryMonitor<'_>,
    rng: Rng,
    tls_buffers: &mut fetch::TlsBuffers,
    frame: &mut FrameBuffer,
    panel: &mut Ac073<SPI, CS, DC, RST, BUSY>,
    delay: &mut Delay,
) -> !
where
    SPI: embedded_hal::spi::SpiBus<u8>,
    SPI::Error: core::fmt::Debug,
    CS: embedded_hal::digital::OutputPin<Error = PinErr>,
    DC: embedded_hal::digital::OutputPin<Error = PinErr>,
    RST: embedded_hal::digital::OutputPin<Error = PinErr>,
    BUSY: embedded_hal::digital::InputPin<Error = PinErr>,
    PinErr: core::fmt::Debug,
{
    let mut failure: Option<CycleFailure> = None;
    let mut connected_index: Option<usize> = None;
    let mut server_time = ServerDateTime::NONE;
    let mut caption: HeaplessString<CAPTION_BYTES> = HeaplessString::new();
    let mut image_shown = false;

    // Restore the preferred-network hint; any failure reads as default.
    let mut prefs_store = match FlashPrefsStore::new(networks.len()) {
        Ok(store) => Some(store),
        Err(err) => {
            info!("prefs: storage unavailable ({:?}); defaults volatile", err);
            None
        }
    };
    let preference = prefs_store
        .as_mut()
        .map(|store| store.load())
        .unwrap_or(PersistedPreference::DEFAULT);
    info!(
        "prefs: preferred_network_index={}",
        preference.preferred_network_index
    );

    match wifi::connect(
        wifi_controller,
        stack,
        networks,
        preference.preferred_network_index as usize,
        led,
    )
    .await
    {
        Ok(index) => {
            connected_index = Some(index);
            if let Some(new_pref) =
                preference_update(preference.preferred_network_index, index as u8)
                && let Some(store) = prefs_store.as_mut()
                && let Err(err) = store.save(&PersistedPreference {
                    preferred_network_index: new_pref,
                })
            {
                info!("prefs: save failed: {:?}", err);
            }
        }
        Err(kind) => failure = Some(CycleFailure::new(CycleStage::ConnectNetwork, kind)),
    }

    if let Some(index) = connected_index
        && failure.is_none()
    {
        let mut path: HeaplessString<48> = HeaplessString::new();
        let _ = write!(path, "/{index}/image_info.txt");
        let mut caption_raw = [0u8; CAPTION_RAW_BYTES];
        let mut sink = ImageCursor::new(&mut caption_raw);
        match fetch::fetch_into(
            stack,
            SERVER_HOST,
            SERVER_PORT,
            &path,
            rng,
            tls_buffers,
            &mut sink,
        )
        .await
        {
            Ok(stamp) => {
                if !stamp.is_none() {
                    server_time = stamp;
                }
                let written = sink.finish().unwrap_or(0);
                if let Ok(text) = core::str::from_utf8(&caption_raw[..written]) {
                    let _ = caption.push_str(text.trim());
                }
            }
            Err(kind) => failure = Some(CycleFailure::new(CycleStage::FetchInfo, kind)),
        }
    }

    if let Some(index) = connected_index
        && failure.is_none()
    {
        frame.fill(Color::White);
        let mut path: HeaplessString<48> = HeaplessString::new();
        let _ = write!(path, "/{index}/quantized.bin");
        let mut sink = ImageCursor::new(frame.bytes_mut());
        match fetch::fetch_into(
            stack,
            SERVER_HOST,
            SERVER_PORT,
            &path,
            rng,
            tls_buffers,
            &mut sink,
        )
        .await
        {
            Ok(stamp) => {
                if !stamp.is_none() {
                    server_time = stamp;
                }
                image_shown = true;
            }
            Err(kind) => failure = Some(CycleFailure::new(CycleStage::FetchImage, kind)),
        }
    }

    // Overlays are opportunistic; they never fail the cycle.
    if image_shown {
        overlay::draw_caption(frame, caption.as_str());
        let battery_status = battery.status_string();
        overlay::draw_battery(frame, battery_status.as_str());
    }

    if let Some(failure) = failure {
        info!(
            "cycle: failed at {:?}: {}",
            failure.stage,
            failure.kind.as_str()
        );
        overlay::draw_error(frame, failure.message());
    }

    let schedule = compute_next_wake(&server_time, &DayNightPolicy::DEFAULT);
    let wake_minutes = wake_delay_minutes(schedule, &server_time);
    info!(
        "schedule: next wake {:?} ({} minutes from now)",
        schedule, wake_minutes
    );

    if connected_index.is_some() {
        wifi::teardown(wifi_controller).await;
    }

    if let Err(err) = panel.update(frame.bytes(), delay) {
        info!("display: update failed: {:?}", err);
    }

    power::enter_deep_sleep(panel, wake_minutes)
}

/// Radio bring-up failed before the cycle could start: show the banner,
/// present whatever is on the frame, and retry after the fallback
/// delay.
fn fail_to_sleep<SPI, CS, DC, RST, BUSY, PinErr>(
    panel: &mut Ac073<SPI, CS, DC, RST, BUSY>,
    frame: &mut FrameBuffer,
    delay: &mut Delay,
) -> !
where
    SPI: embedded_hal::spi::SpiBus<u8>,
    SPI::Error: core::fmt::Debug,
    CS: embedded_hal::digital::OutputPin<Error = PinErr>,
    DC: embedded_hal::digital::OutputPin<Error = PinErr>,
    RST: embedded_hal::digital::OutputPin<Error = PinErr>,
    BUSY: embedded_hal::digital::InputPin<Error = PinErr>,
    PinErr: core::fmt::Debug,
{
    overlay::draw_error(frame, "Radio init failed");
    if let Err(err) = panel.update(frame.bytes(), delay) {
        info!("display: update failed: {:?}", err);
    }
    power::enter_deep_sleep(panel, u16::from(DayNightPolicy::DEFAULT.retry_minutes))
}
