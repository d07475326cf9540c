//! SoftDevice security handler for the single bonded camera.

use core::cell::RefCell;

use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{
    Connection, EncryptionInfo, IdentityKey, IdentityResolutionKey, MasterId, SecurityMode,
};
use nrf_softdevice::raw;

use crate::ble::{to_peer_address, to_sd_address};
use crate::storage::{BondKeys, PeerAddress, PeerIdentity};

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

/// Keeps the keys of the one camera we bond with.
///
/// A new bond replaces the previous one.
pub struct Bonder {
    peer: RefCell<Option<PeerBond>>,
}

impl Bonder {
    pub const fn new() -> Self {
        Self {
            peer: RefCell::new(None),
        }
    }

    /// Seed the handler with keys read back from flash.
    pub fn restore(&self, identity: &PeerIdentity) {
        let Some(keys) = identity.keys else {
            *self.peer.borrow_mut() = None;
            return;
        };
        let addr = to_sd_address(&identity.address);
        *self.peer.borrow_mut() = Some(PeerBond {
            master_id: MasterId {
                ediv: keys.ediv,
                rand: keys.rand,
            },
            key: EncryptionInfo {
                ltk: keys.ltk,
                flags: keys.ltk_flags,
            },
            peer_id: IdentityKey {
                irk: IdentityResolutionKey::from_raw(raw::ble_gap_irk_t { irk: keys.irk }),
                addr,
            },
        });
    }

    /// Identity address and keys of the current bond, if any.
    pub fn bond(&self) -> Option<(PeerAddress, BondKeys)> {
        self.peer.borrow().as_ref().map(|p| {
            let keys = BondKeys {
                ediv: p.master_id.ediv,
                rand: p.master_id.rand,
                ltk: p.key.ltk,
                ltk_flags: p.key.flags,
                irk: p.peer_id.irk.as_raw().irk,
            };
            (to_peer_address(&p.peer_id.addr), keys)
        })
    }

    pub fn forget(&self) {
        *self.peer.borrow_mut() = None;
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        info!("Bonded with camera");
        *self.peer.borrow_mut() = Some(PeerBond {
            master_id,
            key,
            peer_id,
        });
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peer
            .borrow()
            .as_ref()
            .and_then(|p| (p.master_id == master_id).then_some(p.key))
    }

    fn get_peripheral_key(&self, conn: &Connection) -> Option<(MasterId, EncryptionInfo)> {
        self.peer.borrow().as_ref().and_then(|p| {
            p.peer_id
                .is_match(conn.peer_address())
                .then_some((p.master_id, p.key))
        })
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}
