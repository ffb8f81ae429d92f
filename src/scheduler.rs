//! Delayed, cancellable automatic restart of dependents.
//!
//! A dependent taken down by a restart-intent cascade stays flagged with
//! `restart_pending` until its dependency re-enters Running. At that point
//! a one-shot timer is armed; when the delay elapses the dependent gets
//! exactly one `start` attempt. Only one outstanding timer exists per
//! component, and arming replaces (and cancels) any prior one.

use crate::component::Component;
use crossbeam::channel::{bounded, RecvTimeoutError, Sender};
use std::thread;
use tracing::{debug, error, info, warn};

/// Cancellation handle for a pending one-shot restart.
///
/// The timer thread waits on the channel with a timeout; a message (or a
/// disconnect) before the deadline aborts the restart attempt.
pub(crate) struct RestartTimer {
    cancel: Sender<()>,
}

impl RestartTimer {
    pub(crate) fn cancel(&self) {
        // The thread may already have fired and dropped its receiver.
        let _ = self.cancel.try_send(());
    }
}

/// Called after `component` re-entered Running: every dependent that still
/// holds an unspent automatic restart attempt gets its one-shot timer
/// armed. Arming consumes the attempt, so a dependent whose attempt already
/// failed stays down across later recoveries until a new restart-intent
/// cascade grants another.
pub(crate) fn arm_pending_dependents(component: &Component) {
    for dependent in component.dependents() {
        if dependent.consume_restart_attempt() {
            info!(
                "Arming restart timer for '{}' ({:?} after '{}' recovered)",
                dependent.name(),
                dependent.restart_delay(),
                component.name()
            );
            arm(&dependent);
        }
    }
}

/// Arm a one-shot restart timer for `component`, replacing any pending one.
pub(crate) fn arm(component: &Component) {
    let (cancel, cancelled) = bounded::<()>(1);
    let delay = component.restart_delay();
    let handle = component.clone();

    let spawned = thread::Builder::new()
        .name(format!("cradle-restart-{}", component.name()))
        .spawn(move || match cancelled.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {
                debug!("Restart timer fired for '{}'", handle.name());
                let outcome = handle.start();
                if outcome.is_failure() {
                    // Single-shot: the pending flag stays set but no further
                    // attempt happens until another qualifying cascade.
                    warn!(
                        "Automatic restart of '{}' failed: {}",
                        handle.name(),
                        outcome
                    );
                }
            }
            _ => {
                debug!("Restart timer for '{}' cancelled", handle.name());
            }
        });

    match spawned {
        Ok(_) => component.replace_restart_timer(RestartTimer { cancel }),
        Err(e) => error!(
            "Failed to spawn restart timer thread for '{}': {}",
            component.name(),
            e
        ),
    }
}
