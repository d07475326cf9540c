//! User interface subsystem - OLED display + physical buttons.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C; one-time boot, battery
//!   and pairing screens plus the running `StatusSink`
//! - **Buttons**: 3 tactile switches with debouncing (A, B, AUX), each
//!   publishing press and release edges

pub mod buttons;
pub mod display;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::remote::input_logic::ButtonEdge;

/// Debounced edges from the button tasks to the main loop.
pub type EdgeChannel = Channel<CriticalSectionRawMutex, ButtonEdge, 8>;
