use crate::config::{CAPTURE_FLASH_MS, FAILURE_HOLD_MS, LONG_PRESS_MS};
use crate::link::Shutter;
use crate::remote::{ButtonSnapshot, OperatorMode, StatusLabel, StatusSink, StatusUpdate};
use crate::timelapse::IntervalScheduler;

/// Two-button remote state machine.
///
/// Sole caller of the shutter and of the interval scheduler's mutators.
pub struct RemoteModeMachine {
    mode: OperatorMode,
    scheduler: IntervalScheduler,
    /// When set, a transient label is up until this clock reading.
    revert_at: Option<u64>,
}

impl RemoteModeMachine {
    pub fn new(scheduler: IntervalScheduler) -> Self {
        Self {
            mode: OperatorMode::Shooting,
            scheduler,
            revert_at: None,
        }
    }

    pub fn mode(&self) -> OperatorMode {
        self.mode
    }

    pub fn scheduler(&self) -> &IntervalScheduler {
        &self.scheduler
    }

    /// What the screen shows for the current mode when nothing
    /// transient is displayed.
    pub fn steady_status(&self) -> StatusUpdate {
        let label = match self.mode {
            OperatorMode::Shooting | OperatorMode::ShootingTransition => StatusLabel::SingleShooting,
            OperatorMode::Settings | OperatorMode::SettingsTransition => {
                StatusLabel::SettingInterval
            }
            OperatorMode::TimeLapseTransition => StatusLabel::Timelapse,
            OperatorMode::TimeLapse if self.scheduler.is_armed() => StatusLabel::ShootingTimelapse,
            OperatorMode::TimeLapse => StatusLabel::ReadyForTimelapse,
        };
        self.status(label)
    }

    /// Advance by one main-loop tick.
    pub async fn tick<S, D>(
        &mut self,
        input: &ButtonSnapshot,
        now_ms: u64,
        shutter: &mut S,
        display: &mut D,
    ) where
        S: Shutter,
        D: StatusSink,
    {
        if let Some(at) = self.revert_at {
            if now_ms >= at {
                self.revert_at = None;
                display.show(self.steady_status());
            }
        }

        let long_press = input.b_held_ms >= LONG_PRESS_MS;

        match self.mode {
            OperatorMode::ShootingTransition => {
                if input.b_released {
                    self.enter(OperatorMode::Shooting, display);
                }
            }
            OperatorMode::Shooting => {
                if long_press {
                    self.enter(OperatorMode::SettingsTransition, display);
                } else if input.a_pressed {
                    info!("Single shot");
                    self.capture(now_ms, shutter, display).await;
                }
            }
            OperatorMode::SettingsTransition => {
                if input.b_released {
                    self.enter(OperatorMode::Settings, display);
                }
            }
            OperatorMode::Settings => {
                if long_press {
                    self.enter(OperatorMode::TimeLapseTransition, display);
                } else {
                    self.update_settings(input, display);
                }
            }
            OperatorMode::TimeLapseTransition => {
                if input.b_released {
                    self.enter(OperatorMode::TimeLapse, display);
                }
            }
            OperatorMode::TimeLapse => {
                if long_press {
                    self.scheduler.disarm();
                    self.enter(OperatorMode::ShootingTransition, display);
                } else {
                    if input.a_pressed {
                        self.scheduler.toggle_arm(now_ms);
                        self.revert_at = None;
                        display.show(self.steady_status());
                    }
                    if self.scheduler.poll_due(now_ms) {
                        info!("Time-lapse shot");
                        self.capture(now_ms, shutter, display).await;
                    }
                }
            }
        }
    }

    fn update_settings<D: StatusSink>(&mut self, input: &ButtonSnapshot, display: &mut D) {
        let mut touched = false;
        if input.a_pressed {
            if let Err(e) = self.scheduler.increment_interval() {
                debug!("Interval unchanged: {}", e);
            }
            touched = true;
        }
        if input.aux_pressed {
            if let Err(e) = self.scheduler.decrement_interval() {
                debug!("Interval unchanged: {}", e);
            }
            touched = true;
        }
        if touched {
            display.show(self.steady_status());
        }
    }

    async fn capture<S, D>(&mut self, now_ms: u64, shutter: &mut S, display: &mut D)
    where
        S: Shutter,
        D: StatusSink,
    {
        display.show(self.status(StatusLabel::Cheese));
        match shutter.trigger().await {
            Ok(()) => {
                self.revert_at = Some(now_ms.saturating_add(CAPTURE_FLASH_MS));
            }
            Err(e) => {
                warn!("Trigger failed: {}", e);
                display.show(self.status(StatusLabel::TriggerFailed));
                self.revert_at = Some(now_ms.saturating_add(FAILURE_HOLD_MS));
            }
        }
    }

    fn enter<D: StatusSink>(&mut self, mode: OperatorMode, display: &mut D) {
        debug!("Mode: {} -> {}", self.mode, mode);
        self.mode = mode;
        self.revert_at = None;
        display.show(self.steady_status());
    }

    fn status(&self, label: StatusLabel) -> StatusUpdate {
        let interval_ms = match self.mode {
            OperatorMode::Shooting | OperatorMode::ShootingTransition => None,
            _ => Some(self.scheduler.current_interval()),
        };
        StatusUpdate { interval_ms, label }
    }
}
