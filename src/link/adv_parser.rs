use heapless::String;

use super::protocol::SERVICE_UUID_LE;

/// AD types carrying lists of 128-bit service UUIDs.
const AD_INCOMPLETE_UUID128: u8 = 0x06;
const AD_COMPLETE_UUID128: u8 = 0x07;

/// AD types carrying the local name.
const AD_SHORT_NAME: u8 = 0x08;
const AD_COMPLETE_NAME: u8 = 0x09;

/// Walk the AD structures, yielding `(ad_type, payload)` pairs.
fn ad_structures<'a>(data: &'a [u8]) -> impl Iterator<Item = (u8, &'a [u8])> + 'a {
    let mut i = 0;
    core::iter::from_fn(move || {
        if i >= data.len() {
            return None;
        }
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            return None;
        }
        let item = (data[i + 1], &data[i + 2..i + 1 + len]);
        i += len + 1;
        Some(item)
    })
}

/// Check if raw advertisement data lists the camera's shutter service.
pub fn contains_shutter_service_uuid(data: &[u8]) -> bool {
    ad_structures(data)
        .filter(|(ad_type, _)| matches!(*ad_type, AD_INCOMPLETE_UUID128 | AD_COMPLETE_UUID128))
        .any(|(_, uuids)| uuids.chunks_exact(16).any(|uuid| uuid == SERVICE_UUID_LE))
}

/// Extract complete/shortened local name from advertisement data.
pub fn extract_device_name(data: &[u8]) -> String<32> {
    let mut name = String::new();
    let found = ad_structures(data)
        .find(|(ad_type, _)| matches!(*ad_type, AD_SHORT_NAME | AD_COMPLETE_NAME));
    match found {
        Some((_, bytes)) => {
            for &b in bytes {
                if name.push(b as char).is_err() {
                    break;
                }
            }
        }
        None => {
            let _ = name.push_str("Unknown");
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adv_with_uuid(ad_type: u8) -> [u8; 18] {
        let mut ad = [0u8; 18];
        ad[0] = 17;
        ad[1] = ad_type;
        ad[2..].copy_from_slice(&SERVICE_UUID_LE);
        ad
    }

    #[test]
    fn detect_service_in_complete_list() {
        assert!(contains_shutter_service_uuid(&adv_with_uuid(0x07)));
    }

    #[test]
    fn detect_service_in_incomplete_list() {
        assert!(contains_shutter_service_uuid(&adv_with_uuid(0x06)));
    }

    #[test]
    fn detect_service_after_flags() {
        let mut ad = [0u8; 21];
        ad[..3].copy_from_slice(&[0x02, 0x01, 0x06]);
        ad[3..].copy_from_slice(&adv_with_uuid(0x07));
        assert!(contains_shutter_service_uuid(&ad));
    }

    #[test]
    fn other_uuid128_rejected() {
        let mut ad = adv_with_uuid(0x07);
        ad[2] ^= 0xFF;
        assert!(!contains_shutter_service_uuid(&ad));
    }

    #[test]
    fn uuid_under_wrong_ad_type_rejected() {
        // Service data (0x21) carrying the same bytes is not a UUID list.
        assert!(!contains_shutter_service_uuid(&adv_with_uuid(0x21)));
    }

    #[test]
    fn malformed_lengths() {
        assert!(!contains_shutter_service_uuid(&[]));
        assert!(!contains_shutter_service_uuid(&[0x00]));
        let truncated = &adv_with_uuid(0x07)[..10];
        assert!(!contains_shutter_service_uuid(truncated));
    }

    #[test]
    fn extract_complete_local_name() {
        let ad = [0x06, 0x09, b'E', b'O', b'S', b' ', b'R'];
        assert_eq!(extract_device_name(&ad).as_str(), "EOS R");
    }

    #[test]
    fn extract_shortened_local_name() {
        let ad = [0x02, 0x01, 0x06, 0x04, 0x08, b'E', b'O', b'S'];
        assert_eq!(extract_device_name(&ad).as_str(), "EOS");
    }

    #[test]
    fn no_name_in_advertisement() {
        let ad = [0x02, 0x01, 0x06];
        assert_eq!(extract_device_name(&ad).as_str(), "Unknown");
    }

    #[test]
    fn name_truncated_to_capacity() {
        let mut ad = [0u8; 40];
        ad[0] = 35;
        ad[1] = 0x09;
        for b in &mut ad[2..37] {
            *b = b'X';
        }
        assert_eq!(extract_device_name(&ad).len(), 32);
    }
}
