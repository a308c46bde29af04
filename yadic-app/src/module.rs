//! Modules registering types in the [Container] during application bootstrap.

#[cfg(test)]
use mockall::automock;
use yadic::container::Container;
pub use yadic::instance::ErrorPtr;

pub type ContainerModulePtr = Box<dyn ContainerModule + Send + Sync>;

/// Registers types and instances needed by a part of the application. Modules are run by the
/// [Application](crate::application::Application) in order of priority.
#[cfg_attr(test, automock)]
pub trait ContainerModule {
    /// Performs registrations on given container.
    fn configure(&self, container: &Container) -> Result<(), ErrorPtr>;

    /// Returns the priority for this module. Higher priorities get run first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}
