use crate::cascade;
use crate::error::{CradleError, Result};
use crate::events::{EventBus, LifecycleEvent};
use crate::manager::Manager;
use crate::outcome::Outcome;
use crate::registry::DependencyRegistry;
use crate::scheduler::{self, RestartTimer};
use parking_lot::{Mutex, RwLock};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle states of a supervised component.
///
/// `Initialized` and `Stopped` are behaviorally equivalent start points;
/// `Faulted` is reached only through an explicit fault signal, never by
/// cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Initialized,
    Running,
    Stopped,
    Faulted,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Initialized => "Initialized",
            State::Running => "Running",
            State::Stopped => "Stopped",
            State::Faulted => "Faulted",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a stop or fault carries a request for eventual automatic restart
/// of the affected dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Stop,
    Restart,
}

/// State guarded by the per-component critical section.
///
/// `restart_pending` is true only while the state is Stopped or Faulted and
/// the triggering cascade carried restart intent. `restart_armable` is the
/// one automatic attempt that cascade granted: it is consumed when the
/// restart timer is armed, so a failed attempt is not retried on a later
/// dependency recovery until another qualifying cascade re-grants it.
pub(crate) struct LifecycleCell {
    pub(crate) state: State,
    pub(crate) restart_pending: bool,
    pub(crate) restart_armable: bool,
}

pub(crate) struct ComponentInner {
    pub(crate) name: String,
    pub(crate) kind: TypeId,
    pub(crate) manager: Arc<dyn Manager>,
    pub(crate) manager_any: Arc<dyn Any + Send + Sync>,
    pub(crate) dependencies: DependencyRegistry,
    pub(crate) dependents: RwLock<Vec<Weak<ComponentInner>>>,
    pub(crate) cell: Mutex<LifecycleCell>,
    pub(crate) restart_timer: Mutex<Option<RestartTimer>>,
    pub(crate) restart_delay: Duration,
    pub(crate) events: Arc<EventBus>,
}

/// Handle to a supervised component. Cheap to clone; all clones refer to
/// the same live instance.
///
/// Locking discipline: no lifecycle operation ever holds two component
/// locks at once. `start` reads dependency states before taking its own
/// lock, and the cascade locks one dependent at a time, so the acyclic
/// dependency graph cannot deadlock.
#[derive(Clone)]
pub struct Component {
    pub(crate) inner: Arc<ComponentInner>,
}

impl Component {
    pub(crate) fn new<M: Manager>(
        manager: M,
        dependencies: DependencyRegistry,
        restart_delay: Duration,
        events: Arc<EventBus>,
    ) -> Self {
        let manager = Arc::new(manager);
        let name = manager.name().to_string();
        Self {
            inner: Arc::new(ComponentInner {
                name,
                kind: TypeId::of::<M>(),
                manager_any: manager.clone(),
                manager,
                dependencies,
                dependents: RwLock::new(Vec::new()),
                cell: Mutex::new(LifecycleCell {
                    state: State::Initialized,
                    restart_pending: false,
                    restart_armable: false,
                }),
                restart_timer: Mutex::new(None),
                restart_delay,
                events,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn kind(&self) -> TypeId {
        self.inner.kind
    }

    pub fn state(&self) -> State {
        self.inner.cell.lock().state
    }

    /// True while this component awaits a dependency's recovery after a
    /// restart-intent cascade took it down.
    pub fn restart_pending(&self) -> bool {
        self.inner.cell.lock().restart_pending
    }

    /// Delay between a dependency's recovery and this component's own
    /// automatic restart attempt.
    pub fn restart_delay(&self) -> Duration {
        self.inner.restart_delay
    }

    /// Whether a dependency of the given manager kind was registered at
    /// install time.
    pub fn has_dependency<M: Manager>(&self) -> bool {
        self.inner.dependencies.contains::<M>()
    }

    /// Typed access to a dependency's manager instance.
    ///
    /// Requesting a kind that was never registered is a programming-contract
    /// violation and fails with [`CradleError::DependencyNotResolved`]; it is
    /// deliberately not an [`Outcome`].
    pub fn dependency<M: Manager>(&self) -> Result<Arc<M>> {
        let dependency = self.inner.dependencies.get::<M>().ok_or_else(|| {
            CradleError::dependency_not_resolved(self.inner.name.as_str(), type_name::<M>())
        })?;
        dependency
            .inner
            .manager_any
            .clone()
            .downcast::<M>()
            .map_err(|_| {
                CradleError::dependency_not_resolved(self.inner.name.as_str(), type_name::<M>())
            })
    }

    /// The dependency registry fixed at install time.
    pub fn dependencies(&self) -> &DependencyRegistry {
        &self.inner.dependencies
    }

    /// Start the component.
    ///
    /// Allowed from any non-Running state. Fails without changing state when
    /// the component is already Running or any dependency is not Running.
    /// On success the startup hook has run, the state is Running, any
    /// pending automatic restart is cleared, and dependents still flagged
    /// for automatic restart get their restart timers armed.
    pub fn start(&self) -> Outcome {
        for dependency in self.inner.dependencies.components() {
            let state = dependency.state();
            if state != State::Running {
                debug!(
                    "Refusing to start '{}': dependency '{}' is {}",
                    self.inner.name,
                    dependency.name(),
                    state
                );
                return Outcome::failure(format!(
                    "cannot start '{}': dependency '{}' is {}",
                    self.inner.name,
                    dependency.name(),
                    state
                ));
            }
        }

        let outcome = {
            let mut cell = self.inner.cell.lock();
            if cell.state == State::Running {
                return Outcome::failure(format!(
                    "component '{}' is already running",
                    self.inner.name
                ));
            }
            let outcome = self.inner.manager.on_start();
            if outcome.is_failure() {
                warn!(
                    "Startup hook for '{}' failed: {}",
                    self.inner.name, outcome
                );
                return outcome;
            }
            cell.state = State::Running;
            cell.restart_pending = false;
            cell.restart_armable = false;
            outcome
        };

        self.cancel_restart_timer();
        info!("Component '{}' is running", self.inner.name);
        self.inner
            .events
            .publish(LifecycleEvent::started(self.inner.name.as_str()));
        scheduler::arm_pending_dependents(self);
        outcome
    }

    /// Stop the component and cascade to its dependents.
    ///
    /// Allowed only from Running. The shutdown hook runs, the state becomes
    /// Stopped, and every transitive dependent that was Running is stopped
    /// with the same intent before this call returns.
    pub fn stop(&self, intent: Intent) -> Outcome {
        let outcome = {
            let mut cell = self.inner.cell.lock();
            if cell.state != State::Running {
                return Outcome::failure(format!(
                    "component '{}' is not running (state: {})",
                    self.inner.name, cell.state
                ));
            }
            let outcome = self.inner.manager.on_stop();
            cell.state = State::Stopped;
            outcome
        };

        info!("Component '{}' stopped (intent: {:?})", self.inner.name, intent);
        self.inner
            .events
            .publish(LifecycleEvent::stopped(self.inner.name.as_str(), intent));
        cascade::propagate(self, intent);
        outcome
    }

    /// Stop then start in one compound operation.
    ///
    /// Fails if the component was not Running to begin with; otherwise the
    /// merged outcome of the two halves is returned.
    pub fn restart(&self) -> Outcome {
        let stopped = self.stop(Intent::Stop);
        if stopped.is_failure() {
            return stopped;
        }
        stopped.merge(self.start())
    }

    /// Signal an unexpected failure.
    ///
    /// Allowed from any non-Faulted state; calling it on an already Faulted
    /// component is a no-op. No shutdown hook runs on the faulted component
    /// itself, but dependents cascade to Stopped (never Faulted) exactly as
    /// for [`Component::stop`].
    pub fn fault(&self, intent: Intent) {
        {
            let mut cell = self.inner.cell.lock();
            if cell.state == State::Faulted {
                debug!("Component '{}' is already faulted", self.inner.name);
                return;
            }
            cell.state = State::Faulted;
        }

        warn!("Component '{}' faulted (intent: {:?})", self.inner.name, intent);
        self.inner
            .events
            .publish(LifecycleEvent::faulted(self.inner.name.as_str(), intent));
        cascade::propagate(self, intent);
    }

    /// Subscribe to this component's notification bus. The bus is shared
    /// with the supervisor, so events from every installed component arrive
    /// on the returned channel.
    pub fn subscribe(&self) -> crossbeam::channel::Receiver<LifecycleEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn add_dependent(&self, dependent: &Component) {
        self.inner
            .dependents
            .write()
            .push(Arc::downgrade(&dependent.inner));
    }

    /// Snapshot of the live dependents (reverse edges).
    pub(crate) fn dependents(&self) -> Vec<Component> {
        self.inner
            .dependents
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .map(|inner| Component { inner })
            .collect()
    }

    /// Consume the single automatic restart attempt granted by the last
    /// restart-intent cascade. Returns false once it has been spent; only
    /// another qualifying cascade grants a new one.
    pub(crate) fn consume_restart_attempt(&self) -> bool {
        let mut cell = self.inner.cell.lock();
        if cell.restart_pending && cell.restart_armable {
            cell.restart_armable = false;
            true
        } else {
            false
        }
    }

    /// Install a new restart timer, cancelling any prior pending one.
    pub(crate) fn replace_restart_timer(&self, timer: RestartTimer) {
        if let Some(previous) = self.inner.restart_timer.lock().replace(timer) {
            previous.cancel();
        }
    }

    pub(crate) fn cancel_restart_timer(&self) {
        if let Some(previous) = self.inner.restart_timer.lock().take() {
            previous.cancel();
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.inner.cell.lock();
        f.debug_struct("Component")
            .field("name", &self.inner.name)
            .field("state", &cell.state)
            .field("restart_pending", &cell.restart_pending)
            .field("dependencies", &self.inner.dependencies.len())
            .finish()
    }
}
