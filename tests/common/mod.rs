//! Simulated camera radio and in-memory peer store.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use br_remote::error::TransportError;
use br_remote::storage::{AddressKind, BondKeys, PeerAddress, PeerIdentity, PeerStore, StoreError};
use br_remote::link::protocol::SHUTTER_RELEASE;
use br_remote::{ShutterTransport, Sighting};

pub const CAMERA: PeerAddress = PeerAddress::new(
    AddressKind::Public,
    [0x9A, 0x78, 0x56, 0x34, 0x12, 0x00],
);

pub fn camera_identity() -> PeerIdentity {
    PeerIdentity::new(
        CAMERA,
        Some(BondKeys {
            ediv: 0x1234,
            rand: [7; 8],
            ltk: [0x42; 16],
            ltk_flags: 0x01,
            irk: [0; 16],
        }),
    )
}

pub fn other_identity() -> PeerIdentity {
    PeerIdentity::new(
        PeerAddress::new(AddressKind::RandomStatic, [1, 2, 3, 4, 5, 0xC6]),
        None,
    )
}

/// Knobs and counters of the simulated camera.
#[derive(Default)]
pub struct Camera {
    /// Scans that time out before the camera starts answering.
    pub silent_scans: usize,
    /// The camera refuses bonding.
    pub rejects_bond: bool,
    /// Connect attempts that fail before one succeeds.
    pub connect_failures: usize,
    /// Error returned by every shutter write, if any.
    pub write_error: Option<TransportError>,
    /// Error returned by the next release write only.
    pub release_error: Option<TransportError>,
    /// Time a successful scan reports before the camera answered.
    pub scan_elapsed_ms: u64,

    pub scans: usize,
    pub bonds: usize,
    pub connects: usize,
    pub disconnects: usize,
    pub writes: Vec<u8>,
    /// Budget handed to each scan.
    pub timeouts_seen: Vec<u64>,
    /// Budget handed to each bond.
    pub bond_timeouts_seen: Vec<u64>,
}

#[derive(Clone, Default)]
pub struct SimTransport(pub Rc<RefCell<Camera>>);

impl SimTransport {
    pub fn camera(&self) -> std::cell::RefMut<'_, Camera> {
        self.0.borrow_mut()
    }
}

impl ShutterTransport for SimTransport {
    async fn scan(&mut self, timeout_ms: u64) -> Result<Sighting, TransportError> {
        let mut cam = self.0.borrow_mut();
        cam.scans += 1;
        cam.timeouts_seen.push(timeout_ms);
        if cam.scans <= cam.silent_scans {
            return Err(TransportError::Timeout);
        }
        Ok(Sighting {
            address: CAMERA,
            elapsed_ms: cam.scan_elapsed_ms.min(timeout_ms),
        })
    }

    async fn bond(
        &mut self,
        address: &PeerAddress,
        timeout_ms: u64,
    ) -> Result<PeerIdentity, TransportError> {
        let mut cam = self.0.borrow_mut();
        cam.bonds += 1;
        cam.bond_timeouts_seen.push(timeout_ms);
        if cam.rejects_bond {
            return Err(TransportError::Rejected);
        }
        assert_eq!(*address, CAMERA);
        Ok(camera_identity())
    }

    async fn connect(&mut self, _peer: &PeerIdentity) -> Result<(), TransportError> {
        let mut cam = self.0.borrow_mut();
        cam.connects += 1;
        if cam.connect_failures > 0 {
            cam.connect_failures -= 1;
            return Err(TransportError::ConnectFailed);
        }
        Ok(())
    }

    async fn write_shutter(&mut self, value: u8) -> Result<(), TransportError> {
        let mut cam = self.0.borrow_mut();
        if let Some(e) = cam.write_error {
            return Err(e);
        }
        if value == SHUTTER_RELEASE {
            if let Some(e) = cam.release_error.take() {
                return Err(e);
            }
        }
        cam.writes.push(value);
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.0.borrow_mut().disconnects += 1;
    }
}

#[derive(Default)]
pub struct Flash {
    pub record: Option<PeerIdentity>,
    pub saves: usize,
    pub broken: bool,
}

#[derive(Clone, Default)]
pub struct MemStore(pub Rc<RefCell<Flash>>);

impl MemStore {
    pub fn with(identity: PeerIdentity) -> Self {
        let store = Self::default();
        store.0.borrow_mut().record = Some(identity);
        store
    }

    pub fn flash(&self) -> std::cell::RefMut<'_, Flash> {
        self.0.borrow_mut()
    }
}

impl PeerStore for MemStore {
    async fn load(&mut self) -> Result<Option<PeerIdentity>, StoreError> {
        let flash = self.0.borrow();
        if flash.broken {
            return Err(StoreError);
        }
        Ok(flash.record)
    }

    async fn save(&mut self, identity: &PeerIdentity) -> Result<(), StoreError> {
        let mut flash = self.0.borrow_mut();
        if flash.broken {
            return Err(StoreError);
        }
        flash.record = Some(*identity);
        flash.saves += 1;
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        let mut flash = self.0.borrow_mut();
        if flash.broken {
            return Err(StoreError);
        }
        flash.record = None;
        Ok(())
    }
}
