//! Link-loss detection.
//!
//! The transport hands every freshly established connection to this
//! task.  When that connection goes away the task posts `LinkLost` into
//! the link inbox; `ShutterLink` picks it up on its next poll.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::Connection;

use crate::config::LINK_WATCH_PERIOD_MS;
use crate::link::{LinkEvent, LinkInbox};

/// Latest connection to watch; a new one replaces the old.
pub type WatchSlot = Signal<CriticalSectionRawMutex, Connection>;

async fn wait_disconnected(conn: &Connection) {
    while conn.is_connected() {
        Timer::after(Duration::from_millis(LINK_WATCH_PERIOD_MS)).await;
    }
}

pub async fn link_watch_task(slot: &'static WatchSlot, inbox: &'static LinkInbox) -> ! {
    let mut conn = slot.wait().await;
    loop {
        let event = select(slot.wait(), wait_disconnected(&conn)).await;
        match event {
            Either::First(next) => {
                debug!("Link watch: new connection");
                conn = next;
            }
            Either::Second(()) => {
                info!("Link watch: connection lost");
                inbox.signal(LinkEvent::LinkLost);
                conn = slot.wait().await;
            }
        }
    }
}
