//! br-remote - BLE shutter remote for cameras with the vendor remote
//! service.
//!
//! The core (link state machine, time-lapse scheduler, operator mode
//! machine, peer record) is plain `no_std` logic with no hardware
//! dependency, so it builds and tests on the host:
//!
//! Usage: `cargo test`
//!
//! The nRF52840 firmware glue (SoftDevice transport, flash store, OLED,
//! GPIO buttons, battery ADC) is compiled only with the `embedded`
//! feature and is driven by `main.rs`.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod config;
pub mod error;
pub mod link;
pub mod power_logic;
pub mod remote;
pub mod storage;
pub mod timelapse;

// ═══════════════════════════════════════════════════════════════════════════
// Firmware-only modules (nRF52840 + SoftDevice S140)
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(feature = "embedded")]
pub mod ble;
#[cfg(feature = "embedded")]
pub mod flash_store;
#[cfg(feature = "embedded")]
pub mod power;
#[cfg(feature = "embedded")]
pub mod ui;

pub use error::{Error, TransportError};
pub use link::{
    ConnectionState, LinkEvent, LinkInbox, Shutter, ShutterLink, ShutterTransport, Sighting,
};
pub use remote::{ButtonSnapshot, OperatorMode, RemoteModeMachine, StatusLabel, StatusUpdate};
pub use storage::{PeerIdentity, PeerStore};
pub use timelapse::IntervalScheduler;
