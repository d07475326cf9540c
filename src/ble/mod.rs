//! Bluetooth Low Energy glue for the nRF SoftDevice S140.
//!
//! This module drives the SoftDevice in **Central** role and implements
//! `ShutterTransport` on top of it:
//!
//! 1. **Transport** - pairing scan, bonding, reconnect and shutter writes
//!    against the camera's vendor GATT service.
//! 2. **Bonder** - SoftDevice security handler holding the one bonded
//!    camera's keys.
//! 3. **Link watch** - a task that notices when the connection drops and
//!    posts `LinkEvent::LinkLost` into the link inbox.

pub mod bonder;
pub mod link_watch;
pub mod transport;

use nrf_softdevice::ble::{Address, AddressType};

use crate::storage::{AddressKind, PeerAddress};

pub(crate) fn to_peer_address(address: &Address) -> PeerAddress {
    let kind = match address.address_type() {
        AddressType::Public => AddressKind::Public,
        AddressType::RandomStatic => AddressKind::RandomStatic,
        AddressType::RandomPrivateResolvable => AddressKind::RandomPrivateResolvable,
        AddressType::RandomPrivateNonResolvable | AddressType::Anonymous => {
            AddressKind::RandomPrivateNonResolvable
        }
    };
    PeerAddress::new(kind, address.bytes())
}

pub(crate) fn to_sd_address(address: &PeerAddress) -> Address {
    let kind = match address.kind {
        AddressKind::Public => AddressType::Public,
        AddressKind::RandomStatic => AddressType::RandomStatic,
        AddressKind::RandomPrivateResolvable => AddressType::RandomPrivateResolvable,
        AddressKind::RandomPrivateNonResolvable => AddressType::RandomPrivateNonResolvable,
    };
    Address::new(kind, address.bytes)
}
