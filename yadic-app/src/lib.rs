//! Application bootstrap based on the [yadic] resolution engine.
//!
//! Traditional applications start in the `main()` function and often explicitly initialize and pass
//! around various services. With a dependency injection container in place, services can become
//! decoupled and form a dependency graph managed by the container. This, in turn, requires an
//! entrypoint which creates and configures the container before the actual business logic runs.
//! This crate provides such entrypoint in the form of [Application](application::Application),
//! which also configures additional supporting infrastructure, e.g. logging.
//!
//! Registrations are grouped in [ContainerModules](module::ContainerModule), which are run in
//! order of priority, and the application is configured via an
//! [ApplicationConfigProvider](config::ApplicationConfigProvider).

pub mod application;
pub mod config;
pub mod module;
