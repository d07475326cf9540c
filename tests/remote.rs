//! Mode machine driving a real ShutterLink over the simulated camera.

mod common;

use br_remote::config::{FAILURE_HOLD_MS, LONG_PRESS_MS, MAIN_LOOP_TICK_MS};
use br_remote::error::TransportError;
use br_remote::remote::input_logic::{Button, ButtonEdge, ButtonTracker};
use br_remote::remote::{self, StatusSink};
use br_remote::timelapse::IntervalBounds;
use br_remote::{
    ConnectionState, IntervalScheduler, LinkEvent, LinkInbox, OperatorMode, RemoteModeMachine,
    ShutterLink, StatusLabel, StatusUpdate,
};
use common::{MemStore, SimTransport};
use embassy_futures::block_on;

#[derive(Default)]
struct Screen(Vec<StatusUpdate>);

impl StatusSink for Screen {
    fn show(&mut self, update: StatusUpdate) {
        self.0.push(update);
    }
}

impl Screen {
    fn labels(&self) -> Vec<StatusLabel> {
        self.0.iter().map(|u| u.label).collect()
    }
}

/// Main-loop stand-in: buttons → tracker → link poll → machine tick.
struct Device<'a> {
    link: ShutterLink<'a, SimTransport, MemStore>,
    machine: RemoteModeMachine,
    buttons: ButtonTracker,
    screen: Screen,
    now: u64,
}

impl<'a> Device<'a> {
    fn new(sim: &SimTransport, inbox: &'a LinkInbox, interval_ms: u64) -> Self {
        let bounds = IntervalBounds {
            min: 1_000,
            max: 10_000,
            step: 1_000,
        };
        Self {
            link: ShutterLink::new(sim.clone(), MemStore::default(), inbox),
            machine: RemoteModeMachine::new(IntervalScheduler::with_bounds(bounds, interval_ms)),
            buttons: ButtonTracker::new(),
            screen: Screen::default(),
            now: 0,
        }
    }

    fn edge(&mut self, button: Button, pressed: bool) {
        self.buttons.record(ButtonEdge {
            button,
            pressed,
            at_ms: self.now,
        });
    }

    fn step(&mut self) {
        self.now += MAIN_LOOP_TICK_MS;
        let mut snapshot = self.buttons.snapshot(self.now);
        block_on(self.link.poll(self.now));
        block_on(remote::retry_failed_link(&mut snapshot, &mut self.link, self.now));
        block_on(
            self.machine
                .tick(&snapshot, self.now, &mut self.link, &mut self.screen),
        );
    }

    fn run_for(&mut self, ms: u64) {
        for _ in 0..ms / MAIN_LOOP_TICK_MS {
            self.step();
        }
    }

    fn click(&mut self, button: Button) {
        self.edge(button, true);
        self.step();
        self.edge(button, false);
        self.step();
    }

    fn long_press_b(&mut self) {
        self.edge(Button::B, true);
        self.run_for(LONG_PRESS_MS + 300);
        self.edge(Button::B, false);
        self.step();
    }
}

#[test]
fn mode_cycle_from_real_button_edges() {
    let inbox = LinkInbox::new();
    let sim = SimTransport::default();
    let mut dev = Device::new(&sim, &inbox, 5_000);

    dev.long_press_b();
    assert_eq!(dev.machine.mode(), OperatorMode::Settings);
    dev.long_press_b();
    assert_eq!(dev.machine.mode(), OperatorMode::TimeLapse);
    dev.long_press_b();
    assert_eq!(dev.machine.mode(), OperatorMode::Shooting);

    // A short click on B never changes mode.
    dev.click(Button::B);
    assert_eq!(dev.machine.mode(), OperatorMode::Shooting);
}

#[test]
fn single_shot_over_the_link() {
    let inbox = LinkInbox::new();
    let sim = SimTransport::default();
    let mut dev = Device::new(&sim, &inbox, 5_000);
    block_on(dev.link.pair(10)).unwrap();

    dev.click(Button::A);
    assert_eq!(sim.camera().writes.len(), 2);
    assert_eq!(dev.screen.labels(), vec![StatusLabel::Cheese]);

    dev.run_for(500);
    assert_eq!(dev.screen.labels().last(), Some(&StatusLabel::SingleShooting));
}

#[test]
fn unpaired_shot_reports_failure() {
    let inbox = LinkInbox::new();
    let sim = SimTransport::default();
    let mut dev = Device::new(&sim, &inbox, 5_000);

    dev.click(Button::A);
    assert_eq!(
        dev.screen.labels(),
        vec![StatusLabel::Cheese, StatusLabel::TriggerFailed]
    );
    assert!(sim.camera().writes.is_empty());

    dev.run_for(FAILURE_HOLD_MS);
    assert_eq!(dev.screen.labels().last(), Some(&StatusLabel::SingleShooting));
    assert_eq!(dev.machine.mode(), OperatorMode::Shooting);
}

#[test]
fn settings_then_timelapse_run() {
    let inbox = LinkInbox::new();
    let sim = SimTransport::default();
    let mut dev = Device::new(&sim, &inbox, 5_000);
    block_on(dev.link.pair(10)).unwrap();

    dev.long_press_b();
    dev.click(Button::Aux);
    dev.click(Button::Aux);
    assert_eq!(dev.machine.scheduler().current_interval(), 3_000);

    dev.long_press_b();
    dev.click(Button::A);
    assert!(dev.machine.scheduler().is_armed());

    // Armed at the press; 10 s later three shots have gone out.
    dev.run_for(10_000);
    assert_eq!(sim.camera().writes.len(), 6);
}

#[test]
fn timelapse_survives_link_loss() {
    let inbox = LinkInbox::new();
    let sim = SimTransport::default();
    let mut dev = Device::new(&sim, &inbox, 2_000);
    block_on(dev.link.pair(10)).unwrap();

    dev.long_press_b();
    dev.long_press_b();
    dev.click(Button::A);

    // Link drops and the camera stays away for a while.
    sim.camera().connect_failures = 3;
    inbox.signal(LinkEvent::LinkLost);
    dev.step();
    assert_eq!(dev.link.state(), ConnectionState::Reconnecting);

    dev.run_for(2_000);
    assert!(dev.screen.labels().contains(&StatusLabel::TriggerFailed));
    assert!(dev.machine.scheduler().is_armed());

    // Backoff 500 + 1000 + 2000 ms, then the link is back.
    dev.run_for(4_000);
    assert_eq!(dev.link.state(), ConnectionState::Connected);
    let before = sim.camera().writes.len();
    dev.run_for(2_000);
    assert_eq!(sim.camera().writes.len(), before + 2);
    assert_eq!(dev.machine.mode(), OperatorMode::TimeLapse);
}

#[test]
fn write_failure_in_timelapse_keeps_cadence() {
    let inbox = LinkInbox::new();
    let sim = SimTransport::default();
    let mut dev = Device::new(&sim, &inbox, 1_000);
    block_on(dev.link.pair(10)).unwrap();

    dev.long_press_b();
    dev.long_press_b();
    dev.click(Button::A);

    sim.camera().write_error = Some(TransportError::WriteFailed);
    dev.run_for(1_000);
    assert_eq!(dev.link.state(), ConnectionState::Connected);

    sim.camera().write_error = None;
    dev.run_for(1_000);
    assert_eq!(sim.camera().writes.len(), 2);
}

#[test]
fn press_while_failed_only_retries_the_link() {
    let inbox = LinkInbox::new();
    let sim = SimTransport::default();
    let mut dev = Device::new(&sim, &inbox, 5_000);
    block_on(dev.link.pair(10)).unwrap();

    sim.camera().connect_failures = usize::MAX;
    inbox.signal(LinkEvent::LinkLost);
    dev.run_for(10_000);
    assert_eq!(dev.link.state(), ConnectionState::Failed);

    sim.camera().connect_failures = 0;
    let shown = dev.screen.0.len();
    dev.click(Button::A);

    assert_eq!(dev.link.state(), ConnectionState::Connected);
    assert!(sim.camera().writes.is_empty());
    let labels: Vec<StatusLabel> = dev.screen.0[shown..].iter().map(|u| u.label).collect();
    assert!(!labels.contains(&StatusLabel::Cheese));
    assert!(!labels.contains(&StatusLabel::TriggerFailed));

    // With the link back, the next press fires.
    dev.click(Button::A);
    assert_eq!(sim.camera().writes.len(), 2);
}
