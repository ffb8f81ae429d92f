//! Reverse-edge propagation of stop and fault transitions.
//!
//! When a component leaves Running through `stop` or `fault`, every
//! transitive dependent that is still Running must be Stopped before the
//! triggering call returns. The walk is depth-first and synchronous; each
//! dependent is locked on its own, one at a time, so a concurrent manual
//! operation on the same component serializes against the cascade write
//! without any risk of deadlock.

use crate::component::{Component, Intent, State};
use crate::events::LifecycleEvent;
use tracing::{debug, warn};

/// Apply stop transitions to all transitive dependents of `origin`.
///
/// Dependents always become Stopped, never Faulted: a dependency fault does
/// not mean the dependent itself is broken, only that it cannot run.
pub(crate) fn propagate(origin: &Component, intent: Intent) {
    for dependent in origin.dependents() {
        if stop_dependent(origin, &dependent, intent) {
            // A dependent that went down takes its own dependents with it.
            propagate(&dependent, intent);
        }
    }
}

/// Stop a single dependent because `origin` went down. Returns false when
/// the dependent was not Running, in which case its own dependents cannot
/// be Running either and the walk stops there.
fn stop_dependent(origin: &Component, dependent: &Component, intent: Intent) -> bool {
    let hook = {
        let mut cell = dependent.inner.cell.lock();
        if cell.state != State::Running {
            debug!(
                "Cascade from '{}' skipping '{}' (state: {})",
                origin.name(),
                dependent.name(),
                cell.state
            );
            return false;
        }
        let hook = dependent.inner.manager.on_stop();
        cell.state = State::Stopped;
        cell.restart_pending = intent == Intent::Restart;
        // Each qualifying cascade grants exactly one automatic attempt
        cell.restart_armable = cell.restart_pending;
        hook
    };

    // Cascade transitions are not failures of the originating call; a
    // misbehaving shutdown hook is only logged.
    if hook.is_failure() {
        warn!(
            "Shutdown hook for '{}' failed during cascade from '{}': {}",
            dependent.name(),
            origin.name(),
            hook
        );
    }

    if intent == Intent::Stop {
        dependent.cancel_restart_timer();
    }

    debug!(
        "Component '{}' stopped by cascade from '{}' (intent: {:?})",
        dependent.name(),
        origin.name(),
        intent
    );
    dependent
        .inner
        .events
        .publish(LifecycleEvent::stopped(dependent.name(), intent));
    true
}
