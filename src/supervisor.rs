use crate::component::Component;
use crate::config::CradleConfig;
use crate::error::{CradleError, Result};
use crate::events::{EventBus, LifecycleEvent};
use crate::manager::Manager;
use crate::registry::DependencyRegistry;
use crossbeam::channel::Receiver;
use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Process-wide container holding exactly one live component per manager
/// kind.
///
/// Dependencies are supplied as already-installed components, so the
/// resulting graph is acyclic by construction and fixed once each component
/// is installed. Re-acquiring a kind through [`Supervisor::get`] always
/// returns a handle to the same instance.
pub struct Supervisor {
    components: RwLock<HashMap<TypeId, Component>>,
    events: Arc<EventBus>,
    config: CradleConfig,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::with_config(CradleConfig::default())
    }

    pub fn with_config(config: CradleConfig) -> Self {
        let events = if config.debug_events {
            EventBus::with_debug_logging()
        } else {
            EventBus::new()
        };
        Self {
            components: RwLock::new(HashMap::new()),
            events: Arc::new(events),
            config,
        }
    }

    /// Install a manager with no dependencies.
    pub fn install<M: Manager>(&self, manager: M) -> Result<Component> {
        self.install_with_deps(manager, &[])
    }

    /// Install a manager whose dependencies have already been installed.
    ///
    /// The dependency set becomes part of the new component and cannot be
    /// changed afterwards. Installing a kind twice is an error; use
    /// [`Supervisor::terminate`] first if a test needs a fresh instance.
    pub fn install_with_deps<M: Manager>(
        &self,
        manager: M,
        dependencies: &[&Component],
    ) -> Result<Component> {
        let kind = TypeId::of::<M>();
        let mut components = self.components.write();
        if components.contains_key(&kind) {
            return Err(CradleError::AlreadyInstalled {
                kind: type_name::<M>(),
            });
        }

        let mut registry = DependencyRegistry::new();
        for dependency in dependencies {
            registry.insert(dependency.kind(), (*dependency).clone());
        }

        let component = Component::new(
            manager,
            registry,
            self.config.restart_delay(),
            Arc::clone(&self.events),
        );
        for dependency in dependencies {
            dependency.add_dependent(&component);
        }

        info!(
            "Installed component '{}' ({} dependencies)",
            component.name(),
            dependencies.len()
        );
        components.insert(kind, component.clone());
        Ok(component)
    }

    /// Re-acquire the singleton handle for a manager kind.
    pub fn get<M: Manager>(&self) -> Result<Component> {
        self.components
            .read()
            .get(&TypeId::of::<M>())
            .cloned()
            .ok_or(CradleError::NotInstalled {
                kind: type_name::<M>(),
            })
    }

    pub fn contains<M: Manager>(&self) -> bool {
        self.components.read().contains_key(&TypeId::of::<M>())
    }

    /// Reset the singleton slot for a manager kind, primarily for testing.
    /// Handles already held stay valid; only re-acquisition is affected.
    /// Returns whether a component was installed.
    pub fn terminate<M: Manager>(&self) -> bool {
        let removed = self.components.write().remove(&TypeId::of::<M>());
        if let Some(component) = &removed {
            debug!("Terminated singleton slot for '{}'", component.name());
        }
        removed.is_some()
    }

    /// Subscribe to lifecycle notifications from every installed component.
    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Names of all installed components, in no particular order.
    pub fn component_names(&self) -> Vec<String> {
        self.components
            .read()
            .values()
            .map(|component| component.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.components.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.read().is_empty()
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}
