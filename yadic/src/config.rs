//! Engine configuration.

/// Behavior switches for a [Container](crate::container::Container).
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerConfig {
    /// Register unregistered concrete types as mapping to themselves, when resolved directly.
    /// Note: this mutates the registry during resolution. When disabled, resolving an unregistered
    /// type fails with [UnregisteredType](crate::error::ResolutionError::UnregisteredType).
    pub implicit_self_registration: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            implicit_self_registration: true,
        }
    }
}

impl ContainerConfig {
    pub fn with_implicit_self_registration(mut self, implicit_self_registration: bool) -> Self {
        self.implicit_self_registration = implicit_self_registration;
        self
    }
}
