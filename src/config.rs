//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// Remote identity

/// Name announced to the camera during the pairing write.
pub const REMOTE_NAME: &str = "BR-M5";

// BLE

/// Default pairing window passed to `ShutterLink::pair` (seconds).
pub const PAIR_TIMEOUT_SECS: u32 = 10;

/// Bound on a single reconnect attempt (seconds).
pub const BLE_CONNECT_TIMEOUT_SECS: u64 = 3;

/// Bound on a single GATT write to the shutter characteristic (ms).
pub const BLE_WRITE_TIMEOUT_MS: u64 = 1_000;

/// BLE connection interval range (in 1.25 ms units).
/// 24..40 = 30..50 ms; the shutter needs no low-latency link.
pub const BLE_CONN_INTERVAL_MIN: u16 = 24;
pub const BLE_CONN_INTERVAL_MAX: u16 = 40;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// How often the link watcher checks an established connection (ms).
pub const LINK_WATCH_PERIOD_MS: u64 = 100;

// Reconnect policy

/// Reconnect attempts before the link gives up and reports `Failed`.
pub const RECONNECT_MAX_ATTEMPTS: u8 = 5;

/// Wait after the first failed reconnect attempt (ms); doubles per attempt.
pub const RECONNECT_BACKOFF_BASE_MS: u64 = 500;

/// Upper bound on the reconnect backoff (ms).
pub const RECONNECT_BACKOFF_MAX_MS: u64 = 8_000;

// Operator input / main loop

/// Main control loop period (ms).
pub const MAIN_LOOP_TICK_MS: u64 = 10;

/// Hold time on button B that counts as a mode-change long-press (ms).
pub const LONG_PRESS_MS: u64 = 700;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// How long "Cheese" stays up after a successful capture (ms).
pub const CAPTURE_FLASH_MS: u64 = 200;

/// How long "Trigger Failed" stays up before the steady label returns (ms).
pub const FAILURE_HOLD_MS: u64 = 1_000;

/// How long the battery screen is shown at boot (ms).
pub const BATTERY_SCREEN_MS: u64 = 2_000;

// Time-lapse

/// Interval the scheduler starts with (ms).
pub const TIMELAPSE_DEFAULT_INTERVAL_MS: u64 = 5_000;

/// Smallest selectable interval (ms).
pub const TIMELAPSE_MIN_INTERVAL_MS: u64 = 1_000;

/// Largest selectable interval (ms). One hour.
pub const TIMELAPSE_MAX_INTERVAL_MS: u64 = 3_600_000;

/// Increment/decrement step (ms).
pub const TIMELAPSE_STEP_MS: u64 = 1_000;

// Battery

/// Cell voltage reported as 0 % (mV).
pub const BATTERY_EMPTY_MV: u32 = 3_000;

/// Cell voltage reported as 100 % (mV).
pub const BATTERY_FULL_MV: u32 = 4_150;

/// SAADC full scale with gain 1/6 and the 0.6 V internal reference (mV).
pub const ADC_FULL_SCALE_MV: u32 = 3_600;

/// SAADC counts at full scale (12-bit).
pub const ADC_MAX_COUNTS: u32 = 4_096;

/// The cell is sensed through a 1:2 resistor divider.
pub const BATTERY_DIVIDER: u32 = 2;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button A (shutter)    → P0.11
//   Button B (mode)       → P0.12
//   Button AUX (step -)   → P0.24
//   I²C SDA               → P0.26
//   I²C SCL               → P0.27
//   Battery sense (AIN2)  → P0.04

// Bonded-peer storage

/// Flash page index where the peer record starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for the peer record.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 2;
