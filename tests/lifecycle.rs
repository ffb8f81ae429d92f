use cradle::{CradleConfig, CradleError, Intent, Manager, Outcome, State, Supervisor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TEST_RESTART_DELAY_MS: u64 = 50;

fn test_supervisor() -> Supervisor {
    Supervisor::with_config(CradleConfig {
        restart_delay_ms: TEST_RESTART_DELAY_MS,
        ..CradleConfig::default()
    })
}

/// Long enough for a restart timer to have fired, with margin.
fn wait_for_restart() {
    thread::sleep(Duration::from_millis(TEST_RESTART_DELAY_MS * 6));
}

#[derive(Default)]
struct CoreManager {
    starts: Arc<AtomicUsize>,
}

impl Manager for CoreManager {
    fn name(&self) -> &str {
        "core"
    }

    fn on_start(&self) -> Outcome {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Outcome::success()
    }
}

#[derive(Default)]
struct TelemetryManager {
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl Manager for TelemetryManager {
    fn name(&self) -> &str {
        "telemetry"
    }

    fn on_start(&self) -> Outcome {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Outcome::success()
    }

    fn on_stop(&self) -> Outcome {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Outcome::success()
    }
}

#[derive(Default)]
struct GatewayManager;

impl Manager for GatewayManager {
    fn name(&self) -> &str {
        "gateway"
    }
}

#[derive(Debug)]
struct UnusedManager;

impl Manager for UnusedManager {
    fn name(&self) -> &str {
        "unused"
    }
}

#[test]
fn starting_a_running_component_fails_and_leaves_state_unchanged() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();

    assert!(core.start().is_success());
    let outcome = core.start();
    assert!(outcome.is_failure());
    assert!(outcome.messages()[0].contains("already running"));
    assert_eq!(core.state(), State::Running);
}

#[test]
fn starting_with_a_stopped_dependency_fails() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    // Dependency was never started
    let outcome = telemetry.start();
    assert!(outcome.is_failure());
    assert!(outcome.messages()[0].contains("core"));
    assert_eq!(telemetry.state(), State::Initialized);

    // Same failure after the dependency has been stopped again
    core.start();
    telemetry.start();
    core.stop(Intent::Stop);
    let outcome = telemetry.start();
    assert!(outcome.is_failure());
    assert_eq!(telemetry.state(), State::Stopped);
}

#[test]
fn restart_of_a_running_component_succeeds() {
    let supervisor = test_supervisor();
    let starts = Arc::new(AtomicUsize::new(0));
    let core = supervisor
        .install(CoreManager {
            starts: Arc::clone(&starts),
        })
        .unwrap();

    core.start();
    let outcome = core.restart();
    assert!(outcome.is_success());
    assert_eq!(core.state(), State::Running);
    assert_eq!(starts.load(Ordering::SeqCst), 2);
}

#[test]
fn restart_of_a_non_running_component_fails() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();

    let outcome = core.restart();
    assert!(outcome.is_failure());
    assert_eq!(core.state(), State::Initialized);
}

#[test]
fn double_stop_fails() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();

    core.start();
    assert!(core.stop(Intent::Stop).is_success());
    assert_eq!(core.state(), State::Stopped);

    let outcome = core.stop(Intent::Stop);
    assert!(outcome.is_failure());
    assert_eq!(core.state(), State::Stopped);
}

// Scenario A: stop without restart intent cascades but arms nothing.
#[test]
fn stop_without_restart_intent_leaves_dependents_down() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    core.start();
    telemetry.start();

    assert!(core.stop(Intent::Stop).is_success());
    // Cascade completes before stop() returns
    assert_eq!(core.state(), State::Stopped);
    assert_eq!(telemetry.state(), State::Stopped);
    assert!(!telemetry.restart_pending());

    core.start();
    wait_for_restart();
    assert_eq!(core.state(), State::Running);
    assert_eq!(telemetry.state(), State::Stopped);
}

// Scenario B: stop with restart intent recovers the dependent after the delay.
#[test]
fn stop_with_restart_intent_recovers_dependent() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    core.start();
    telemetry.start();

    core.stop(Intent::Restart);
    assert_eq!(core.state(), State::Stopped);
    assert_eq!(telemetry.state(), State::Stopped);
    assert!(telemetry.restart_pending());

    core.start();
    wait_for_restart();
    assert_eq!(telemetry.state(), State::Running);
    assert!(!telemetry.restart_pending());
}

// Scenario C: a fault never propagates as a fault.
#[test]
fn fault_stops_dependents_without_faulting_them() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    core.start();
    telemetry.start();

    core.fault(Intent::Stop);
    assert_eq!(core.state(), State::Faulted);
    assert_eq!(telemetry.state(), State::Stopped);
    assert!(!telemetry.restart_pending());
}

// Scenario D: fault with restart intent, then recovery of the dependency.
#[test]
fn fault_with_restart_intent_recovers_dependent() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    core.start();
    telemetry.start();

    core.fault(Intent::Restart);
    assert_eq!(core.state(), State::Faulted);
    assert_eq!(telemetry.state(), State::Stopped);
    assert!(telemetry.restart_pending());

    assert!(core.start().is_success());
    wait_for_restart();
    assert_eq!(telemetry.state(), State::Running);
    assert!(!telemetry.restart_pending());
}

#[test]
fn unregistered_dependency_kind_is_a_contract_violation() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    assert!(telemetry.has_dependency::<CoreManager>());
    assert!(telemetry.dependency::<CoreManager>().is_ok());

    assert!(!telemetry.has_dependency::<UnusedManager>());
    let err = telemetry.dependency::<UnusedManager>().unwrap_err();
    assert!(matches!(err, CradleError::DependencyNotResolved { .. }));
}

#[test]
fn cascade_is_transitive_and_runs_shutdown_hooks() {
    let supervisor = test_supervisor();
    let stops = Arc::new(AtomicUsize::new(0));
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(
            TelemetryManager {
                stops: Arc::clone(&stops),
                ..TelemetryManager::default()
            },
            &[&core],
        )
        .unwrap();
    let gateway = supervisor
        .install_with_deps(GatewayManager, &[&telemetry])
        .unwrap();

    core.start();
    telemetry.start();
    gateway.start();

    core.stop(Intent::Stop);
    assert_eq!(core.state(), State::Stopped);
    assert_eq!(telemetry.state(), State::Stopped);
    assert_eq!(gateway.state(), State::Stopped);
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[test]
fn multi_level_recovery_restarts_the_whole_chain() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();
    let gateway = supervisor
        .install_with_deps(GatewayManager, &[&telemetry])
        .unwrap();

    core.start();
    telemetry.start();
    gateway.start();

    core.stop(Intent::Restart);
    assert!(telemetry.restart_pending());
    assert!(gateway.restart_pending());

    core.start();
    // Each level waits its own delay after its dependency recovers
    thread::sleep(Duration::from_millis(TEST_RESTART_DELAY_MS * 10));
    assert_eq!(telemetry.state(), State::Running);
    assert_eq!(gateway.state(), State::Running);
    assert!(!telemetry.restart_pending());
    assert!(!gateway.restart_pending());
}

#[test]
fn manual_start_before_the_timer_fires_wins() {
    let supervisor = test_supervisor();
    let starts = Arc::new(AtomicUsize::new(0));
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(
            TelemetryManager {
                starts: Arc::clone(&starts),
                ..TelemetryManager::default()
            },
            &[&core],
        )
        .unwrap();

    core.start();
    telemetry.start();
    core.stop(Intent::Restart);
    core.start();

    // Beat the timer with a manual start
    assert!(telemetry.start().is_success());
    let starts_after_manual = starts.load(Ordering::SeqCst);

    wait_for_restart();
    assert_eq!(telemetry.state(), State::Running);
    // The cancelled timer must not have produced another start
    assert_eq!(starts.load(Ordering::SeqCst), starts_after_manual);
}

#[test]
fn failed_automatic_restart_keeps_the_flag_and_stays_single_shot() {
    let supervisor = test_supervisor();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    core.start();
    telemetry.start();
    core.stop(Intent::Restart);
    core.start();

    // The dependency goes down again before the timer fires
    core.stop(Intent::Stop);
    wait_for_restart();

    // The one attempt failed; the flag survives it
    assert_eq!(telemetry.state(), State::Stopped);
    assert!(telemetry.restart_pending());

    // A plain recovery carries no new restart-intent cascade, so the
    // dependent must stay down rather than get a second attempt
    core.start();
    wait_for_restart();
    assert_eq!(telemetry.state(), State::Stopped);
    assert!(telemetry.restart_pending());

    // Manual start is the way back and clears the flag
    assert!(telemetry.start().is_success());
    assert_eq!(telemetry.state(), State::Running);
    assert!(!telemetry.restart_pending());
}

#[test]
fn notifications_carry_component_and_intent() {
    let supervisor = test_supervisor();
    let events = supervisor.subscribe();
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    core.start();
    telemetry.start();
    core.stop(Intent::Restart);
    core.fault(Intent::Stop);

    let received: Vec<_> = events.try_iter().collect();
    let summary: Vec<(String, &'static str, Option<Intent>)> = received
        .iter()
        .map(|e| (e.component().to_string(), e.event_type(), e.intent()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("core".to_string(), "started", None),
            ("telemetry".to_string(), "started", None),
            ("core".to_string(), "stopped", Some(Intent::Restart)),
            ("telemetry".to_string(), "stopped", Some(Intent::Restart)),
            ("core".to_string(), "faulted", Some(Intent::Stop)),
        ]
    );
}

#[test]
fn dropped_subscriber_does_not_disturb_transitions() {
    let supervisor = test_supervisor();
    let events = supervisor.subscribe();
    drop(events);

    let core = supervisor.install(CoreManager::default()).unwrap();
    assert!(core.start().is_success());
    assert!(core.stop(Intent::Stop).is_success());
}

#[test]
fn concurrent_operations_on_the_same_component_serialize() {
    let supervisor = Arc::new(test_supervisor());
    let core = supervisor.install(CoreManager::default()).unwrap();
    let telemetry = supervisor
        .install_with_deps(TelemetryManager::default(), &[&core])
        .unwrap();

    core.start();
    telemetry.start();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let core = core.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                core.stop(Intent::Restart);
                core.start();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Whatever the interleaving, the pair must settle in consistent states
    wait_for_restart();
    assert_eq!(core.state(), State::Running);
    assert!(matches!(
        telemetry.state(),
        State::Running | State::Stopped
    ));
    if telemetry.state() == State::Running {
        assert!(!telemetry.restart_pending());
    }
}
