//! Vendor shutter-remote protocol.
//!
//! The camera exposes one primary service with a pairing characteristic
//! and a shutter characteristic.  A shutter value is a button bitfield
//! OR'd with a capture mode.

/// Primary service, `00050000-0000-1000-0000-d8492fffa821`, as it appears
/// in advertisement data (little-endian).
pub const SERVICE_UUID_LE: [u8; 16] = [
    0x21, 0xa8, 0xff, 0x2f, 0x49, 0xd8, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x05, 0x00,
];

/// Leading byte of the pairing write.
pub const PAIRING_OPCODE: u8 = 0x03;

/// Maximum length of the pairing write (opcode + name).
pub const PAIRING_PAYLOAD_MAX: usize = 20;

/// Release (shutter) button bit.
pub const BUTTON_RELEASE: u8 = 0b1000_0000;

/// Capture mode: shoot immediately.
pub const MODE_IMMEDIATE: u8 = 0b0000_1100;

/// Shutter value that presses the release button.
pub const SHUTTER_PRESS: u8 = BUTTON_RELEASE | MODE_IMMEDIATE;

/// Shutter value that lets every button go.
pub const SHUTTER_RELEASE: u8 = MODE_IMMEDIATE;

/// Build the pairing payload `[0x03, name...]`.
///
/// Names longer than the payload allows are truncated.  Returns the
/// number of bytes written, or 0 if `buf` cannot hold the opcode.
pub fn pairing_payload(name: &str, buf: &mut [u8]) -> usize {
    let cap = buf.len().min(PAIRING_PAYLOAD_MAX);
    if cap == 0 {
        return 0;
    }
    buf[0] = PAIRING_OPCODE;
    let name = name.as_bytes();
    let n = name.len().min(cap - 1);
    buf[1..1 + n].copy_from_slice(&name[..n]);
    1 + n
}
