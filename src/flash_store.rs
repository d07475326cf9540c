//! `PeerStore` on the nRF52840's internal flash.
//!
//! The bonded camera is kept as a single item in a `sequential-storage`
//! key-value map; the crate handles wear levelling and page GC.

use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use crate::storage::{PeerIdentity, PeerStore, StoreError, RECORD_SIZE};

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

const KEY_BONDED_PEER: u8 = 0x01;

/// Scratch space for one map entry plus item header.
const BUF_SIZE: usize = 128;

pub struct FlashPeerStore<F> {
    flash: F,
}

impl<F: NorFlash> FlashPeerStore<F> {
    pub fn new(flash: F) -> Self {
        Self { flash }
    }
}

impl<F: NorFlash> PeerStore for FlashPeerStore<F> {
    async fn load(&mut self) -> Result<Option<PeerIdentity>, StoreError> {
        let mut buf = [0u8; BUF_SIZE];

        let item = map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            STORAGE_START..STORAGE_END,
            &mut NoCache::new(),
            &mut buf,
            &KEY_BONDED_PEER,
        )
        .await
        .map_err(|e| {
            error!("Flash read error: {:?}", defmt::Debug2Format(&e));
            StoreError
        })?;

        match item {
            Some(data) => {
                let peer = PeerIdentity::deserialize(data);
                if peer.is_none() {
                    warn!("Stored peer record not understood, ignoring");
                }
                Ok(peer)
            }
            None => Ok(None),
        }
    }

    async fn save(&mut self, identity: &PeerIdentity) -> Result<(), StoreError> {
        let mut record = [0u8; RECORD_SIZE];
        let len = identity.serialize(&mut record);
        let item: &[u8] = &record[..len];

        let mut buf = [0u8; BUF_SIZE];
        map::store_item::<u8, &[u8], _>(
            &mut self.flash,
            STORAGE_START..STORAGE_END,
            &mut NoCache::new(),
            &mut buf,
            &KEY_BONDED_PEER,
            &item,
        )
        .await
        .map_err(|e| {
            error!("Flash write error: {:?}", defmt::Debug2Format(&e));
            StoreError
        })?;

        info!("Bonded camera saved to flash");
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        let mut buf = [0u8; BUF_SIZE];
        map::remove_item::<u8, _>(
            &mut self.flash,
            STORAGE_START..STORAGE_END,
            &mut NoCache::new(),
            &mut buf,
            &KEY_BONDED_PEER,
        )
        .await
        .map_err(|e| {
            error!("Flash erase error: {:?}", defmt::Debug2Format(&e));
            StoreError
        })
    }
}
