use thiserror::Error;

/// Contract violations and infrastructure failures.
///
/// Operational lifecycle conditions (dependency not running, already in the
/// requested state) are reported through [`crate::Outcome`] and never raised
/// here. This type is reserved for programmer errors and for configuration
/// and I/O problems outside the state machine.
#[derive(Error, Debug)]
pub enum CradleError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("dependency '{kind}' was never registered on component '{component}'")]
    DependencyNotResolved {
        component: String,
        kind: &'static str,
    },

    #[error("a component of kind '{kind}' is already installed")]
    AlreadyInstalled { kind: &'static str },

    #[error("no component of kind '{kind}' is installed")]
    NotInstalled { kind: &'static str },
}

impl CradleError {
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn dependency_not_resolved<S: Into<String>>(component: S, kind: &'static str) -> Self {
        Self::DependencyNotResolved {
            component: component.into(),
            kind,
        }
    }
}

pub type Result<T> = std::result::Result<T, CradleError>;
