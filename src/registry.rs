use crate::component::Component;
use crate::manager::Manager;
use std::any::TypeId;
use std::collections::HashMap;

/// Per-component mapping from a dependency's manager kind to the live
/// component supplied at install time.
///
/// Built once by the supervisor while installing a component and never
/// mutated afterwards, so lookups need no locking beyond the safe
/// publication the owning `Arc` already provides.
#[derive(Clone, Default)]
pub struct DependencyRegistry {
    entries: HashMap<TypeId, Component>,
}

impl DependencyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, kind: TypeId, component: Component) {
        self.entries.insert(kind, component);
    }

    /// Whether a dependency of the given manager kind was registered.
    pub fn contains<M: Manager>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<M>())
    }

    pub(crate) fn get<M: Manager>(&self) -> Option<&Component> {
        self.entries.get(&TypeId::of::<M>())
    }

    /// Iterate over the dependency components in no particular order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
