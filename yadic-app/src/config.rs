//! Application configuration is based on an [ApplicationConfigProvider], which is used to
//! retrieve [ApplicationConfig]. [Application](crate::application::Application) uses this config
//! to configure itself and the [Container](yadic::container::Container), and registers it as an
//! instance, so it can be injected into any other type.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by environment variables prefixed with `YADIC_` or `yadic.json` file.

use config::{Config, ConfigError, Environment, File};
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use std::error::Error;
use std::sync::Arc;
use yadic::config::ContainerConfig;
use yadic::instance::ErrorPtr;

const CONFIG_ENV_PREFIX: &str = "YADIC";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "yadic.json";

fn convert_error<E: Error + Send + Sync + 'static>(error: E) -> ErrorPtr {
    Arc::new(error) as ErrorPtr
}

/// Application configuration which can be provided by an [ApplicationConfigProvider].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed in the scope of the application.
    pub install_tracing_logger: bool,
    /// See [ContainerConfig::implicit_self_registration].
    pub implicit_self_registration: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            implicit_self_registration: true,
        }
    }
}

impl From<OptionalApplicationConfig> for ApplicationConfig {
    fn from(value: OptionalApplicationConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            implicit_self_registration: value
                .implicit_self_registration
                .unwrap_or(default.implicit_self_registration),
        }
    }
}

impl ApplicationConfig {
    fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalApplicationConfig>())
            .map(|config| config.into())
    }

    /// Engine configuration derived from this config.
    pub fn container_config(&self) -> ContainerConfig {
        ContainerConfig::default().with_implicit_self_registration(self.implicit_self_registration)
    }
}

/// Provider for [ApplicationConfig] used when running an
/// [Application](crate::application::Application).
#[cfg_attr(test, automock)]
pub trait ApplicationConfigProvider {
    fn config(&self) -> Result<ApplicationConfig, ErrorPtr>;
}

/// Default [ApplicationConfigProvider], loading the config from the environment once.
#[derive(Clone, Debug)]
pub struct DefaultApplicationConfigProvider {
    // cached init result
    config: Result<ApplicationConfig, ErrorPtr>,
}

impl Default for DefaultApplicationConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultApplicationConfigProvider {
    pub fn new() -> Self {
        Self {
            config: ApplicationConfig::init_from_environment().map_err(convert_error),
        }
    }
}

impl ApplicationConfigProvider for DefaultApplicationConfigProvider {
    fn config(&self) -> Result<ApplicationConfig, ErrorPtr> {
        self.config.clone()
    }
}

#[derive(Deserialize)]
struct OptionalApplicationConfig {
    install_tracing_logger: Option<bool>,
    implicit_self_registration: Option<bool>,
}
