//! Bonded-peer identity and its persistent record.
//!
//! Exactly one camera is remembered.  The record is written once at the
//! end of a successful pairing and read once at start-up; everything
//! else lives in RAM and is lost on power-off.
//!
//! Record layout (fixed length, little-endian):
//!   `[version][6 addr][1 kind][1 has_keys][2 ediv][8 rand][16 ltk][1 ltk_flags][16 irk]`

use core::fmt::Write;

use heapless::String;

/// Layout version of the serialized record.
const RECORD_VERSION: u8 = 1;

/// Serialized size of a `PeerIdentity` record.
pub const RECORD_SIZE: usize = 1 + 6 + 1 + 1 + 2 + 8 + 16 + 1 + 16;

/// BLE address type of the bonded camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressKind {
    Public,
    RandomStatic,
    RandomPrivateResolvable,
    RandomPrivateNonResolvable,
}

impl AddressKind {
    fn to_byte(self) -> u8 {
        match self {
            AddressKind::Public => 0,
            AddressKind::RandomStatic => 1,
            AddressKind::RandomPrivateResolvable => 2,
            AddressKind::RandomPrivateNonResolvable => 3,
        }
    }

    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(AddressKind::Public),
            1 => Some(AddressKind::RandomStatic),
            2 => Some(AddressKind::RandomPrivateResolvable),
            3 => Some(AddressKind::RandomPrivateNonResolvable),
            _ => None,
        }
    }
}

/// Address of a camera seen on air, before bonding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddress {
    /// Address bytes as transmitted (least-significant byte first).
    pub bytes: [u8; 6],
    pub kind: AddressKind,
}

impl PeerAddress {
    pub const fn new(kind: AddressKind, bytes: [u8; 6]) -> Self {
        Self { bytes, kind }
    }

    /// `AA:BB:CC:DD:EE:FF`, most-significant byte first.
    pub fn to_display_string(&self) -> String<17> {
        let mut s = String::new();
        for (i, b) in self.bytes.iter().rev().enumerate() {
            if i > 0 {
                let _ = s.push(':');
            }
            let _ = write!(s, "{:02X}", b);
        }
        s
    }
}

/// Keys exchanged during bonding, enough to re-encrypt without re-pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BondKeys {
    /// Encrypted diversifier of the LTK.
    pub ediv: u16,
    /// Random number identifying the LTK.
    pub rand: [u8; 8],
    /// Long-term key.
    pub ltk: [u8; 16],
    /// SoftDevice LTK flags (authenticated / LESC / key length).
    pub ltk_flags: u8,
    /// Identity resolving key, all zero when the peer sent none.
    pub irk: [u8; 16],
}

/// The bonded camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerIdentity {
    pub address: PeerAddress,
    pub keys: Option<BondKeys>,
}

impl PeerIdentity {
    pub const fn new(address: PeerAddress, keys: Option<BondKeys>) -> Self {
        Self { address, keys }
    }

    /// Serialize to bytes for flash storage.
    ///
    /// Returns the number of bytes written, or 0 if `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < RECORD_SIZE {
            return 0;
        }
        let buf = &mut buf[..RECORD_SIZE];
        buf.fill(0);

        buf[0] = RECORD_VERSION;
        buf[1..7].copy_from_slice(&self.address.bytes);
        buf[7] = self.address.kind.to_byte();

        if let Some(keys) = &self.keys {
            buf[8] = 1;
            buf[9..11].copy_from_slice(&keys.ediv.to_le_bytes());
            buf[11..19].copy_from_slice(&keys.rand);
            buf[19..35].copy_from_slice(&keys.ltk);
            buf[35] = keys.ltk_flags;
            buf[36..52].copy_from_slice(&keys.irk);
        }

        RECORD_SIZE
    }

    /// Deserialize from bytes.
    pub fn deserialize(data: &[u8]) -> Option<Self> {
        if data.len() < RECORD_SIZE || data[0] != RECORD_VERSION {
            return None;
        }

        let mut addr = [0u8; 6];
        addr.copy_from_slice(&data[1..7]);
        let kind = AddressKind::from_byte(data[7])?;

        let keys = match data[8] {
            0 => None,
            1 => {
                let mut rand = [0u8; 8];
                rand.copy_from_slice(&data[11..19]);
                let mut ltk = [0u8; 16];
                ltk.copy_from_slice(&data[19..35]);
                let mut irk = [0u8; 16];
                irk.copy_from_slice(&data[36..52]);
                Some(BondKeys {
                    ediv: u16::from_le_bytes([data[9], data[10]]),
                    rand,
                    ltk,
                    ltk_flags: data[35],
                    irk,
                })
            }
            _ => return None,
        };

        Some(Self {
            address: PeerAddress::new(kind, addr),
            keys,
        })
    }
}

/// Failure reading or writing the peer record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreError;

/// Persistence for the single bonded peer.
#[allow(async_fn_in_trait)]
pub trait PeerStore {
    /// Read the stored identity, `Ok(None)` if nothing was ever saved.
    async fn load(&mut self) -> Result<Option<PeerIdentity>, StoreError>;

    /// Replace the stored identity.
    async fn save(&mut self, identity: &PeerIdentity) -> Result<(), StoreError>;

    /// Forget the stored identity.
    async fn clear(&mut self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bonded() -> PeerIdentity {
        PeerIdentity::new(
            PeerAddress::new(
                AddressKind::RandomStatic,
                [0x66, 0x55, 0x44, 0x33, 0x22, 0xC1],
            ),
            Some(BondKeys {
                ediv: 0xBEEF,
                rand: [1, 2, 3, 4, 5, 6, 7, 8],
                ltk: [0xA5; 16],
                ltk_flags: 0x03,
                irk: [0x5A; 16],
            }),
        )
    }

    #[test]
    fn address_string_is_msb_first() {
        let id = bonded();
        assert_eq!(id.address.to_display_string().as_str(), "C1:22:33:44:55:66");
    }

    #[test]
    fn record_layout_is_fixed_length() {
        let mut buf = [0xFFu8; 64];
        let written = bonded().serialize(&mut buf);
        assert_eq!(written, RECORD_SIZE);
        assert_eq!(buf[0], RECORD_VERSION);
        assert_eq!(&buf[1..7], &[0x66, 0x55, 0x44, 0x33, 0x22, 0xC1]);
        assert_eq!(buf[7], 1);
        assert_eq!(buf[8], 1);
        assert_eq!(&buf[9..11], &[0xEF, 0xBE]);
        // Bytes past the record are untouched.
        assert_eq!(buf[RECORD_SIZE], 0xFF);
    }

    #[test]
    fn record_without_keys_zeroes_key_fields() {
        let id = PeerIdentity::new(
            PeerAddress::new(AddressKind::Public, [1, 2, 3, 4, 5, 6]),
            None,
        );
        let mut buf = [0xFFu8; RECORD_SIZE];
        id.serialize(&mut buf);
        assert_eq!(buf[8], 0);
        assert!(buf[9..].iter().all(|&b| b == 0));
        assert_eq!(PeerIdentity::deserialize(&buf), Some(id));
    }

    #[test]
    fn bonded_record_reads_back() {
        let mut buf = [0u8; RECORD_SIZE];
        bonded().serialize(&mut buf);
        assert_eq!(PeerIdentity::deserialize(&buf), Some(bonded()));
    }

    #[test]
    fn serialize_buffer_too_small() {
        let mut buf = [0u8; RECORD_SIZE - 1];
        assert_eq!(bonded().serialize(&mut buf), 0);
    }

    #[test]
    fn deserialize_rejects_bad_records() {
        let mut buf = [0u8; RECORD_SIZE];
        bonded().serialize(&mut buf);

        assert!(PeerIdentity::deserialize(&buf[..RECORD_SIZE - 1]).is_none());

        let mut wrong_version = buf;
        wrong_version[0] = 9;
        assert!(PeerIdentity::deserialize(&wrong_version).is_none());

        let mut wrong_kind = buf;
        wrong_kind[7] = 4;
        assert!(PeerIdentity::deserialize(&wrong_kind).is_none());

        let mut wrong_flag = buf;
        wrong_flag[8] = 2;
        assert!(PeerIdentity::deserialize(&wrong_flag).is_none());
    }
}
