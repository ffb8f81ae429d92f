use crate::component::Intent;
use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Notifications emitted by the lifecycle state machine.
///
/// Stopped and Faulted carry the [`Intent`] of the triggering operation so
/// observers can tell a plain shutdown from one that requested automatic
/// restart of the affected dependents.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// A component transitioned to Running.
    Started {
        component: String,
        timestamp: SystemTime,
    },
    /// A component transitioned to Stopped, directly or by cascade.
    Stopped {
        component: String,
        intent: Intent,
        timestamp: SystemTime,
    },
    /// A component transitioned to Faulted.
    Faulted {
        component: String,
        intent: Intent,
        timestamp: SystemTime,
    },
}

impl LifecycleEvent {
    pub(crate) fn started<S: Into<String>>(component: S) -> Self {
        Self::Started {
            component: component.into(),
            timestamp: SystemTime::now(),
        }
    }

    pub(crate) fn stopped<S: Into<String>>(component: S, intent: Intent) -> Self {
        Self::Stopped {
            component: component.into(),
            intent,
            timestamp: SystemTime::now(),
        }
    }

    pub(crate) fn faulted<S: Into<String>>(component: S, intent: Intent) -> Self {
        Self::Faulted {
            component: component.into(),
            intent,
            timestamp: SystemTime::now(),
        }
    }

    /// Name of the component the event refers to.
    pub fn component(&self) -> &str {
        match self {
            LifecycleEvent::Started { component, .. }
            | LifecycleEvent::Stopped { component, .. }
            | LifecycleEvent::Faulted { component, .. } => component,
        }
    }

    /// Intent of the triggering stop/fault; `None` for Started.
    pub fn intent(&self) -> Option<Intent> {
        match self {
            LifecycleEvent::Started { .. } => None,
            LifecycleEvent::Stopped { intent, .. } | LifecycleEvent::Faulted { intent, .. } => {
                Some(*intent)
            }
        }
    }

    pub fn timestamp(&self) -> SystemTime {
        match self {
            LifecycleEvent::Started { timestamp, .. }
            | LifecycleEvent::Stopped { timestamp, .. }
            | LifecycleEvent::Faulted { timestamp, .. } => *timestamp,
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            LifecycleEvent::Started { component, .. } => format!("{} started", component),
            LifecycleEvent::Stopped {
                component, intent, ..
            } => format!("{} stopped (intent: {:?})", component, intent),
            LifecycleEvent::Faulted {
                component, intent, ..
            } => format!("{} faulted (intent: {:?})", component, intent),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::Started { .. } => "started",
            LifecycleEvent::Stopped { .. } => "stopped",
            LifecycleEvent::Faulted { .. } => "faulted",
        }
    }
}

/// Fire-and-forget notification bus.
///
/// Each subscriber gets its own unbounded channel, so publishing never
/// blocks the triggering lifecycle operation and a slow or dropped
/// subscriber cannot stall the state machine. Subscribers unsubscribe by
/// dropping their receiver; dead channels are pruned on the next publish.
pub struct EventBus {
    subscribers: RwLock<Vec<Sender<LifecycleEvent>>>,
    debug_logging: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            debug_logging: true,
        }
    }

    /// Subscribe to all lifecycle events. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.write().push(sender);
        receiver
    }

    /// Publish an event to all live subscribers, returning how many
    /// received it. Never blocks and never fails.
    pub fn publish(&self, event: LifecycleEvent) -> usize {
        if self.debug_logging {
            debug!("Publishing event: {}", event.description());
        }

        match &event {
            LifecycleEvent::Started { component, .. } => {
                info!("Component '{}' started", component);
            }
            LifecycleEvent::Stopped {
                component, intent, ..
            } => {
                info!("Component '{}' stopped (intent: {:?})", component, intent);
            }
            LifecycleEvent::Faulted {
                component, intent, ..
            } => {
                warn!("Component '{}' faulted (intent: {:?})", component, intent);
            }
        }

        let mut subscribers = self.subscribers.write();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        subscribers.len()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.read().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
