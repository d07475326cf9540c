//! br-remote firmware entry point (nRF52840 + SoftDevice S140).
//!
//! Boot sequence:
//! 1. Bring up the SoftDevice, buttons, OLED and battery ADC.
//! 2. Holding A at power-up forces pairing; otherwise reconnect to the
//!    camera on record, pairing only if there is none.
//! 3. Show battery and camera screens, then run the 10 ms main loop:
//!    buttons → link poll → mode machine.

#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::interrupt::{self, InterruptExt};
use embassy_nrf::saadc::{self, Saadc};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Instant, Timer};
use nrf_softdevice::{self as sd, Softdevice};
use panic_probe as _;
use static_cell::StaticCell;

use br_remote::ble::bonder::Bonder;
use br_remote::ble::link_watch::{self, WatchSlot};
use br_remote::ble::transport::SoftdeviceTransport;
use br_remote::config::{
    BATTERY_SCREEN_MS, BUTTON_DEBOUNCE_MS, MAIN_LOOP_TICK_MS, PAIR_TIMEOUT_SECS, REMOTE_NAME,
};
use br_remote::flash_store::FlashPeerStore;
use br_remote::remote::input_logic::{Button, ButtonEdge, ButtonTracker};
use br_remote::remote::{self, StatusSink};
use br_remote::ui::display::{self, OledStatus};
use br_remote::ui::{buttons, EdgeChannel};
use br_remote::{power, ConnectionState, IntervalScheduler, LinkInbox, RemoteModeMachine, ShutterLink};

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static EDGES: EdgeChannel = EdgeChannel::new();
static LINK_INBOX: LinkInbox = LinkInbox::new();
static LINK_WATCH: WatchSlot = WatchSlot::new();

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("br-remote booting");

    let mut c = embassy_nrf::config::Config::default();
    c.gpiote_interrupt_priority = interrupt::Priority::P2;
    c.time_interrupt_priority = interrupt::Priority::P2;
    let p = embassy_nrf::init(c);

    // P0, P1 and P4 belong to the SoftDevice.
    interrupt::SAADC.set_priority(interrupt::Priority::P3);
    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(interrupt::Priority::P3);

    let config = nrf_softdevice::Config {
        clock: Some(sd::raw::nrf_clock_lf_cfg_t {
            source: sd::raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: sd::raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(sd::raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(sd::raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gap_role_count: Some(sd::raw::ble_gap_cfg_role_count_t {
            adv_set_count: 0,
            periph_role_count: 0,
            central_role_count: 1,
            central_sec_count: 1,
            _bitfield_1: sd::raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(sd::raw::ble_gap_cfg_device_name_t {
            p_value: REMOTE_NAME.as_ptr() as _,
            current_len: REMOTE_NAME.len() as u16,
            max_len: REMOTE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: sd::raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                sd::raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    let sd = Softdevice::enable(&config);
    spawner.must_spawn(softdevice_task(sd));

    // ── Buttons ─────────────────────────────────────────────────────────
    let button_a = Input::new(p.P0_11, Pull::Up);
    let button_b = Input::new(p.P0_12, Pull::Up);
    let button_aux = Input::new(p.P0_24, Pull::Up);

    Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
    let pair_mode = button_a.is_low();

    spawner.must_spawn(button_task(button_a, Button::A, EDGES.sender()));
    spawner.must_spawn(button_task(button_b, Button::B, EDGES.sender()));
    spawner.must_spawn(button_task(button_aux, Button::Aux, EDGES.sender()));

    // ── Display ─────────────────────────────────────────────────────────
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut oled = display::init(i2c);
    display::draw_boot(&mut oled, pair_mode);

    // ── Battery ─────────────────────────────────────────────────────────
    let channel = saadc::ChannelConfig::single_ended(p.P0_04);
    let mut adc = Saadc::new(p.SAADC, Irqs, saadc::Config::default(), [channel]);
    let telemetry = power::sample(sd, &mut adc).await;

    // ── Camera link ─────────────────────────────────────────────────────
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    let bonder: &'static Bonder = BONDER.init(Bonder::new());
    spawner.must_spawn(link_watch_task());

    let transport = SoftdeviceTransport::new(sd, bonder, &LINK_WATCH);
    let store = FlashPeerStore::new(sd::Flash::take(sd));
    let mut link = ShutterLink::new(transport, store, &LINK_INBOX);

    if pair_mode {
        info!("Pairing requested at boot");
    } else {
        link.initialize(now_ms()).await;
    }

    if pair_mode || link.state() == ConnectionState::Idle {
        loop {
            match link.pair(PAIR_TIMEOUT_SECS).await {
                Ok(()) => break,
                Err(e) => {
                    warn!("Pairing attempt failed: {}, retrying", e);
                    display::draw_pairing(&mut oled, "", "Pairing...");
                }
            }
        }
    }

    display::draw_battery(&mut oled, &telemetry);
    Timer::after(Duration::from_millis(BATTERY_SCREEN_MS)).await;

    let address = link.paired_address();
    display::draw_pairing(&mut oled, address.as_str(), "Paired");
    Timer::after(Duration::from_millis(BATTERY_SCREEN_MS)).await;

    // ── Main loop ───────────────────────────────────────────────────────
    let mut status = OledStatus::new(oled);
    let mut machine = RemoteModeMachine::new(IntervalScheduler::new());
    let mut tracker = ButtonTracker::new();
    status.show(machine.steady_status());

    let edges = EDGES.receiver();
    loop {
        while let Ok(edge) = edges.try_receive() {
            tracker.record(edge);
        }

        let now = now_ms();
        let mut input = tracker.snapshot(now);

        link.poll(now).await;
        remote::retry_failed_link(&mut input, &mut link, now).await;

        machine.tick(&input, now, &mut link, &mut status).await;

        Timer::after(Duration::from_millis(MAIN_LOOP_TICK_MS)).await;
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task(pool_size = 3)]
async fn button_task(
    btn: Input<'static>,
    button: Button,
    tx: Sender<'static, CriticalSectionRawMutex, ButtonEdge, 8>,
) -> ! {
    buttons::button_task(btn, button, tx).await
}

#[embassy_executor::task]
async fn link_watch_task() -> ! {
    link_watch::link_watch_task(&LINK_WATCH, &LINK_INBOX).await
}
