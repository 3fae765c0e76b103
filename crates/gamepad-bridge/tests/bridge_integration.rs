//! Integration tests for the bridge pipeline.
//!
//! These exercise the application layer end-to-end over mock
//! infrastructure: scripted joystick events flow through the poller thread
//! into the shared cell, and emitter ticks publish against a recording
//! publisher.  No real device or socket is involved.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bridge_core::{AxisMapping, Command, PedalSide, RawEvent};
use gamepad_bridge::application::emitter::CommandEmitter;
use gamepad_bridge::application::poller::{spawn_poller, PollerOutcome};
use gamepad_bridge::application::shutdown::{BridgePhase, ShutdownCoordinator};
use gamepad_bridge::application::state::ControlCell;
use gamepad_bridge::infrastructure::joystick::mock::MockEventSource;
use gamepad_bridge::infrastructure::publisher::mock::RecordingPublisher;
use gamepad_bridge::infrastructure::publisher::CommandPublisher;

const MAPPING: AxisMapping = AxisMapping {
    left_axis: 1,
    right_axis: 4,
};

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_device_events_flow_through_to_published_commands() {
    // Arrange: a full pipeline over mocks.
    let cell = Arc::new(ControlCell::new());
    let source = MockEventSource::new();
    let publisher = Arc::new(RecordingPublisher::new());
    let emitter = CommandEmitter::new(
        Arc::clone(&cell),
        Arc::clone(&publisher) as Arc<dyn CommandPublisher>,
    );

    // Pedals pushed to their extremes, then button 0 pressed.
    source.inject_events(vec![
        RawEvent::axis(1, i16::MIN),
        RawEvent::axis(4, i16::MIN),
        RawEvent::button(0, 1),
    ]);
    let handle = spawn_poller(source, MAPPING, Arc::clone(&cell)).expect("spawn poller");

    // Act: wait for the drain to land, then tick once.
    assert!(
        wait_until(Duration::from_millis(500), || {
            cell.snapshot().0.active_button == 0
        }),
        "drained events must reach the cell"
    );
    let keep_going = emitter.tick();

    // Assert: full burst, pedals before switch-state.
    assert!(keep_going);
    assert_eq!(
        publisher.published(),
        vec![
            Command::pedal(PedalSide::Left, 1.0),
            Command::pedal(PedalSide::Right, 1.0),
            Command::switch_state(0),
        ]
    );

    let coordinator = ShutdownCoordinator::new(Arc::clone(&cell), handle);
    let (outcome, _source) = coordinator.shutdown().expect("clean shutdown");
    assert_eq!(outcome, PollerOutcome::Clean);
}

#[test]
fn test_every_tick_observes_a_whole_drain_never_a_partial_one() {
    let cell = Arc::new(ControlCell::new());
    let source = MockEventSource::new();

    // One batch moves both pedals together; a reader must never see one
    // pedal moved without the other.
    for _ in 0..50 {
        source.inject_events(vec![
            RawEvent::axis(1, i16::MIN),
            RawEvent::axis(4, i16::MIN),
        ]);
        source.inject_events(vec![RawEvent::axis(1, 0), RawEvent::axis(4, 0)]);
    }
    let handle = spawn_poller(source, MAPPING, Arc::clone(&cell)).expect("spawn poller");

    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(200) {
        let (snapshot, _) = cell.snapshot();
        assert_eq!(
            snapshot.left_pedal, snapshot.right_pedal,
            "observed a partially applied drain"
        );
    }

    cell.request_stop();
    handle.join().expect("poller must not panic");
}

#[test]
fn test_read_error_stops_emission_within_one_poll_interval() {
    let cell = Arc::new(ControlCell::new());
    let source = MockEventSource::new();
    let publisher = Arc::new(RecordingPublisher::new());
    let emitter = CommandEmitter::new(
        Arc::clone(&cell),
        Arc::clone(&publisher) as Arc<dyn CommandPublisher>,
    );

    source.inject_read_error();
    let handle = spawn_poller(source, MAPPING, Arc::clone(&cell)).expect("spawn poller");

    // The error flag must appear within one poll interval plus slack.
    assert!(
        wait_until(Duration::from_millis(100), || cell.has_error()),
        "error flag must be set promptly"
    );

    // The next tick still emits its burst but tells the scheduler to stop.
    let keep_going = emitter.tick();
    assert!(!keep_going);

    let coordinator = ShutdownCoordinator::new(Arc::clone(&cell), handle);
    let (outcome, _source) = coordinator.shutdown().expect("shutdown");
    assert_eq!(outcome, PollerOutcome::Errored);
}

#[test]
fn test_shutdown_releases_device_only_after_poller_terminated() {
    let cell = Arc::new(ControlCell::new());
    let source = MockEventSource::new();
    let probe = source.clone();
    let handle = spawn_poller(source, MAPPING, Arc::clone(&cell)).expect("spawn poller");

    // Let the poller make a few passes first.
    assert!(wait_until(Duration::from_millis(500), || {
        probe.wait_count() >= 2
    }));

    let coordinator = ShutdownCoordinator::new(Arc::clone(&cell), handle);
    let (outcome, source) = coordinator.shutdown().expect("shutdown");
    assert_eq!(outcome, PollerOutcome::Clean);

    // The source only comes back after the join, so the poller cannot touch
    // it anymore: its call counters stay frozen from here on.
    let waits_at_release = source.wait_count();
    let drains_at_release = source.drain_count();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(source.wait_count(), waits_at_release);
    assert_eq!(source.drain_count(), drains_at_release);
}

#[test]
fn test_unavailable_session_still_allows_neutral_attempt_and_clean_shutdown() {
    let cell = Arc::new(ControlCell::new());
    let publisher = Arc::new(RecordingPublisher::not_running());
    let emitter = CommandEmitter::new(
        Arc::clone(&cell),
        Arc::clone(&publisher) as Arc<dyn CommandPublisher>,
    );
    let handle = spawn_poller(MockEventSource::new(), MAPPING, Arc::clone(&cell)).expect("spawn poller");
    let coordinator = ShutdownCoordinator::new(Arc::clone(&cell), handle);
    assert_eq!(coordinator.phase(), BridgePhase::Running);

    // Neutral attempt against a dead session is a no-op, not a crash.
    emitter.emit_neutral();
    assert!(publisher.published().is_empty());

    let (outcome, _source) = coordinator.shutdown().expect("clean shutdown");
    assert_eq!(outcome, PollerOutcome::Clean);
}

#[tokio::test]
async fn test_scheduler_stops_after_tick_returns_false() {
    // Mirrors the binary's emission loop: once a tick reports the error
    // flag, no further tick runs.
    let cell = Arc::new(ControlCell::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let emitter = CommandEmitter::new(
        Arc::clone(&cell),
        Arc::clone(&publisher) as Arc<dyn CommandPublisher>,
    );

    let mut interval = tokio::time::interval(Duration::from_millis(5));
    let mut ticks = 0u32;
    loop {
        interval.tick().await;
        if ticks == 3 {
            cell.set_error();
        }
        ticks += 1;
        if !emitter.tick() {
            break;
        }
    }

    let bursts = publisher.published().len();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(ticks, 4, "the tick that observes the error flag is the last");
    assert_eq!(
        publisher.published().len(),
        bursts,
        "no further commands after the scheduler halted"
    );
}
