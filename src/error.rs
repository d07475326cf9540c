//! Unified error type for br-remote.
//!
//! We avoid `alloc` - all error variants are fieldless and `Copy`.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Pairing
    /// No camera answered within the pairing window.
    PairingTimeout,

    /// The camera refused the bonding exchange.
    PairingRejected,

    // Trigger
    /// A trigger was requested while the link was not `Connected`.
    NotConnected,

    /// The shutter write failed; the link is still up.
    WriteFailed,

    /// The link dropped while a shutter write was in flight.
    Disconnected,

    /// The transport reported an unsolicited link loss.
    LinkLost,

    // Time-lapse
    /// Interval adjustment hit `min` or `max`; the interval is unchanged.
    IntervalAtBound,

    /// Interval adjustment attempted while time-lapse is armed.
    IntervalLocked,

    // Storage
    /// Reading or writing the bonded-peer record failed.
    Storage,
}

/// Subset of transport errors a `ShutterTransport` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The operation ran past its deadline.
    Timeout,
    /// The peer refused pairing / bonding.
    Rejected,
    /// GAP connection could not be established.
    ConnectFailed,
    /// The vendor GATT service was not found on the peer.
    DiscoveryFailed,
    /// A GATT write completed with an error.
    WriteFailed,
    /// The link went away during the operation.
    LinkDropped,
}

impl TransportError {
    /// Classify a failure seen while pairing.
    pub fn into_pairing_error(self) -> Error {
        match self {
            TransportError::Timeout => Error::PairingTimeout,
            _ => Error::PairingRejected,
        }
    }

    /// Classify a failure seen while writing the shutter command.
    pub fn into_trigger_error(self) -> Error {
        match self {
            TransportError::LinkDropped => Error::Disconnected,
            _ => Error::WriteFailed,
        }
    }
}
