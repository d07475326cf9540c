//! GPIO button input with async debouncing.
//!
//! Three physical buttons (active-low with internal pull-up):
//!   - A   - shutter / arm / interval up
//!   - B   - long-press cycles mode
//!   - AUX - interval down
//!
//! Each button is handled by an async task that waits for a GPIO edge,
//! debounces it, and sends a `ButtonEdge` for both press and release so
//! the main loop can time how long B is held.

use embassy_nrf::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Instant, Timer};

use crate::config::BUTTON_DEBOUNCE_MS;
use crate::remote::input_logic::{Button, ButtonEdge};

/// Run a single button polling loop.
pub async fn button_task(
    mut btn: Input<'static>,
    button: Button,
    tx: Sender<'static, CriticalSectionRawMutex, ButtonEdge, 8>,
) -> ! {
    loop {
        btn.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if !btn.is_low() {
            continue;
        }

        debug!("Button {} down", button);
        tx.send(edge(button, true)).await;

        // Stay in the pressed state until a clean release.
        loop {
            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
            if btn.is_high() {
                break;
            }
        }

        debug!("Button {} up", button);
        tx.send(edge(button, false)).await;
    }
}

fn edge(button: Button, pressed: bool) -> ButtonEdge {
    ButtonEdge {
        button,
        pressed,
        at_ms: Instant::now().as_millis(),
    }
}
