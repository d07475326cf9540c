//! Fold debounced button edges into one snapshot per tick.

use super::ButtonSnapshot;

/// Physical buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
    Aux,
}

/// A debounced press or release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEdge {
    pub button: Button,
    /// `true` on press, `false` on release.
    pub pressed: bool,
    /// Clock reading of the edge (ms).
    pub at_ms: u64,
}

pub struct ButtonTracker {
    /// When B went down, if it is down.
    b_down_since: Option<u64>,
    pending: ButtonSnapshot,
}

impl ButtonTracker {
    pub const fn new() -> Self {
        Self {
            b_down_since: None,
            pending: ButtonSnapshot {
                a_pressed: false,
                b_released: false,
                b_held_ms: 0,
                aux_pressed: false,
            },
        }
    }

    pub fn record(&mut self, edge: ButtonEdge) {
        match (edge.button, edge.pressed) {
            (Button::A, true) => self.pending.a_pressed = true,
            (Button::Aux, true) => self.pending.aux_pressed = true,
            (Button::B, true) => self.b_down_since = Some(edge.at_ms),
            (Button::B, false) => {
                self.b_down_since = None;
                self.pending.b_released = true;
            }
            (Button::A | Button::Aux, false) => {}
        }
    }

    /// Edges recorded since the last call, plus B's current hold time.
    pub fn snapshot(&mut self, now_ms: u64) -> ButtonSnapshot {
        let mut snap = core::mem::replace(&mut self.pending, Self::new().pending);
        snap.b_held_ms = self
            .b_down_since
            .map_or(0, |since| now_ms.saturating_sub(since));
        snap
    }
}

impl Default for ButtonTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(button: Button, pressed: bool, at_ms: u64) -> ButtonEdge {
        ButtonEdge {
            button,
            pressed,
            at_ms,
        }
    }

    #[test]
    fn edges_are_reported_once() {
        let mut t = ButtonTracker::new();
        t.record(edge(Button::A, true, 5));
        t.record(edge(Button::A, false, 80));
        t.record(edge(Button::Aux, true, 90));
        let snap = t.snapshot(100);
        assert!(snap.a_pressed);
        assert!(snap.aux_pressed);
        assert!(!snap.b_released);
        assert_eq!(t.snapshot(110), ButtonSnapshot::default());
    }

    #[test]
    fn hold_time_grows_until_release() {
        let mut t = ButtonTracker::new();
        t.record(edge(Button::B, true, 1_000));
        assert_eq!(t.snapshot(1_000).b_held_ms, 0);
        assert_eq!(t.snapshot(1_350).b_held_ms, 350);
        assert_eq!(t.snapshot(1_700).b_held_ms, 700);

        t.record(edge(Button::B, false, 1_720));
        let snap = t.snapshot(1_730);
        assert!(snap.b_released);
        assert_eq!(snap.b_held_ms, 0);
        assert!(!t.snapshot(1_740).b_released);
    }

    #[test]
    fn quick_tap_within_one_tick() {
        let mut t = ButtonTracker::new();
        t.record(edge(Button::B, true, 10));
        t.record(edge(Button::B, false, 15));
        let snap = t.snapshot(20);
        assert!(snap.b_released);
        assert_eq!(snap.b_held_ms, 0);
    }
}
