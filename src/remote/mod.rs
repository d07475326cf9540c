//! Operator-facing remote logic.
//!
//! The mode machine reacts to one `ButtonSnapshot` per main-loop tick,
//! fires the shutter through a `Shutter`, and reports what the screen
//! should show through a `StatusSink`.
//!
//! ## Buttons
//!
//! - **A**: shutter / arm / interval up, depending on mode
//! - **B**: long-press cycles Shooting → Settings → TimeLapse
//! - **AUX**: interval down in Settings

pub mod input_logic;
mod machine;

pub use machine::RemoteModeMachine;

use core::fmt::Write;

use heapless::String;

use crate::link::{ConnectionState, ShutterLink, ShutterTransport};
use crate::storage::PeerStore;

/// Which handler runs and what the screen shows.
///
/// The `*Transition` variants wait for button B to be released after
/// the long-press that entered them, so a held button cannot cycle
/// through more than one mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatorMode {
    Shooting,
    ShootingTransition,
    Settings,
    SettingsTransition,
    TimeLapse,
    TimeLapseTransition,
}

/// Debounced button state for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSnapshot {
    /// Button A went down since the last tick.
    pub a_pressed: bool,
    /// Button B went up since the last tick.
    pub b_released: bool,
    /// How long B has been held down, 0 when up.
    pub b_held_ms: u64,
    /// The auxiliary button went down since the last tick.
    pub aux_pressed: bool,
}

/// Status line shown under the interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusLabel {
    SingleShooting,
    Cheese,
    TriggerFailed,
    SettingInterval,
    Timelapse,
    ReadyForTimelapse,
    ShootingTimelapse,
}

impl StatusLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::SingleShooting => "Single Shooting",
            StatusLabel::Cheese => "Cheese",
            StatusLabel::TriggerFailed => "Trigger Failed",
            StatusLabel::SettingInterval => "Setting interval",
            StatusLabel::Timelapse => "Timelapse",
            StatusLabel::ReadyForTimelapse => "Ready for timelapse",
            StatusLabel::ShootingTimelapse => "Shooting timelapse",
        }
    }
}

/// One display-update request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusUpdate {
    /// Time-lapse interval (ms), `None` where it does not apply.
    pub interval_ms: Option<u64>,
    pub label: StatusLabel,
}

impl StatusUpdate {
    /// Interval line for the screen: whole seconds, or `--` when the
    /// current mode has no interval.
    pub fn interval_text(&self) -> String<24> {
        let mut text = String::new();
        match self.interval_ms {
            Some(ms) => {
                let _ = write!(text, "{} s", ms / 1_000);
            }
            None => {
                let _ = text.push_str("--");
            }
        }
        text
    }
}

/// Receiver of display-update requests.
pub trait StatusSink {
    fn show(&mut self, update: StatusUpdate);
}

/// Turn an A press into a link reset while the link is `Failed`.
///
/// The press is consumed so the mode machine does not also fire the
/// shutter.  Returns true when the link was reset.
pub async fn retry_failed_link<T, S>(
    input: &mut ButtonSnapshot,
    link: &mut ShutterLink<'_, T, S>,
    now_ms: u64,
) -> bool
where
    T: ShutterTransport,
    S: PeerStore,
{
    if !input.a_pressed || link.state() != ConnectionState::Failed {
        return false;
    }
    info!("Retrying camera link");
    input.a_pressed = false;
    link.reset(now_ms).await;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_text_in_seconds() {
        let update = StatusUpdate {
            interval_ms: Some(12_000),
            label: StatusLabel::SettingInterval,
        };
        assert_eq!(update.interval_text().as_str(), "12 s");
    }

    #[test]
    fn interval_text_placeholder() {
        let update = StatusUpdate {
            interval_ms: None,
            label: StatusLabel::SingleShooting,
        };
        assert_eq!(update.interval_text().as_str(), "--");
    }
}
