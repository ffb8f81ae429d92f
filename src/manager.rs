use crate::outcome::Outcome;

/// Component-specific lifecycle behavior.
///
/// Implementors own one piece of application functionality (configuration,
/// security, data modeling, platform I/O) and plug into the supervisor,
/// which drives the hooks while it transitions the component between
/// states. Hooks run inside the component's critical section, so they must
/// not call back into the same component's lifecycle operations.
pub trait Manager: Send + Sync + 'static {
    /// Human-readable identifier, unique per concrete manager kind.
    fn name(&self) -> &str;

    /// Startup logic, run while transitioning to Running. Returning a
    /// failure aborts the start and leaves the state unchanged.
    fn on_start(&self) -> Outcome {
        Outcome::success()
    }

    /// Shutdown logic, run while transitioning to Stopped, both for direct
    /// stops and for cascade stops triggered by a dependency going down.
    fn on_stop(&self) -> Outcome {
        Outcome::success()
    }
}
