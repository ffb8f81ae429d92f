pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod outcome;
pub mod registry;
pub mod supervisor;

mod cascade;
mod scheduler;

pub use component::{Component, Intent, State};
pub use config::CradleConfig;
pub use error::{CradleError, Result};
pub use events::{EventBus, LifecycleEvent};
pub use manager::Manager;
pub use outcome::{Outcome, OutcomeCode};
pub use registry::DependencyRegistry;
pub use supervisor::Supervisor;
