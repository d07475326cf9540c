//! Camera link subsystem.
//!
//! `ShutterLink` owns the connection lifecycle to the one bonded camera:
//!
//! 1. **Pairing** - scan for a camera advertising the shutter service,
//!    bond with it, and persist its identity.
//! 2. **Reconnect** - bring the link back after power-up or link loss,
//!    with a bounded retry budget.
//! 3. **Trigger** - write the shutter press/release values.
//!
//! The radio itself sits behind `ShutterTransport`; the nRF SoftDevice
//! implementation lives in the firmware-only `ble` module.

pub mod adv_parser;
pub mod protocol;
mod shutter_link;

pub use shutter_link::ShutterLink;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::error::{Error, TransportError};
use crate::storage::{PeerAddress, PeerIdentity};

/// Connection state of the camera link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// No link and nothing in progress.
    Idle,
    /// Looking for a camera in pairing mode.
    Scanning,
    /// Bonding with the camera that was found.
    Pairing,
    /// Link up; triggers are allowed.
    Connected,
    /// Link expected but down; retries pending.
    Reconnecting,
    /// Retry budget exhausted; waits for `reset`.
    Failed,
}

/// Events the transport publishes from outside the main loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// The established connection went away.
    LinkLost,
}

/// Single-slot inbox from the transport to `ShutterLink`.
///
/// The transport side signals, the main loop drains on its next poll.
pub type LinkInbox = Signal<CriticalSectionRawMutex, LinkEvent>;

/// A camera found by `ShutterTransport::scan`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sighting {
    pub address: PeerAddress,
    /// How long the scan ran before the camera showed up.
    pub elapsed_ms: u64,
}

/// Radio operations `ShutterLink` needs from the BLE stack.
///
/// Every method must return within a bounded time.
#[allow(async_fn_in_trait)]
pub trait ShutterTransport {
    /// Scan for a camera advertising the shutter service.
    async fn scan(&mut self, timeout_ms: u64) -> Result<Sighting, TransportError>;

    /// Connect, bond and perform the vendor pairing write.
    ///
    /// On success the link stays up and the returned identity carries
    /// the bonding keys.
    async fn bond(
        &mut self,
        address: &PeerAddress,
        timeout_ms: u64,
    ) -> Result<PeerIdentity, TransportError>;

    /// Re-establish an encrypted link to an already bonded camera.
    async fn connect(&mut self, peer: &PeerIdentity) -> Result<(), TransportError>;

    /// Write one value to the shutter characteristic.
    async fn write_shutter(&mut self, value: u8) -> Result<(), TransportError>;

    /// Drop the current link, if any.
    async fn disconnect(&mut self);
}

/// Anything that can fire the camera shutter.
#[allow(async_fn_in_trait)]
pub trait Shutter {
    async fn trigger(&mut self) -> Result<(), Error>;
}
