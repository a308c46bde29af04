//! Core application bootstrap functionality.

use crate::config::{ApplicationConfig, ApplicationConfigProvider};
use crate::module::ContainerModulePtr;
use derive_more::Constructor;
use std::cmp::Reverse;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yadic::container::{Container, ContainerBuilder};
use yadic::descriptor::TypeDescriptorProviderPtr;
use yadic::error::ResolutionError;
use yadic::instance::{ErrorPtr, InstancePtr};

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Error retrieving application config: {0}")]
    ConfigError(ErrorPtr),
    #[error("Module error: {0}")]
    ModuleError(ErrorPtr),
    #[error("Error registering application types: {0}")]
    ResolutionError(#[from] ResolutionError),
}

/// Main entrypoint for the application. Creates a [Container] using given type descriptors and
/// configures it with [ContainerModules](crate::module::ContainerModule).
#[derive(Constructor)]
pub struct Application<CP: ApplicationConfigProvider> {
    config_provider: CP,
    descriptors: TypeDescriptorProviderPtr,
    modules: Vec<ContainerModulePtr>,
}

impl<CP: ApplicationConfigProvider> Application<CP> {
    /// Bootstraps the application and returns a container ready for resolving. Application config
    /// is registered in the container as an instance.
    pub fn run(self) -> Result<Container, ApplicationError> {
        let config = self
            .config_provider
            .config()
            .map_err(ApplicationError::ConfigError)?;

        if config.install_tracing_logger {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
            let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

            tracing::subscriber::with_default(subscriber, || {
                Self::bootstrap(config, self.descriptors, self.modules)
            })
        } else {
            Self::bootstrap(config, self.descriptors, self.modules)
        }
    }

    fn bootstrap(
        config: ApplicationConfig,
        descriptors: TypeDescriptorProviderPtr,
        mut modules: Vec<ContainerModulePtr>,
    ) -> Result<Container, ApplicationError> {
        info!("Creating container...");

        let container = ContainerBuilder::new()
            .with_descriptor_provider(descriptors)
            .with_config(config.container_config())
            .build();

        container.register_instance::<ApplicationConfig>(InstancePtr::new(config))?;

        modules.sort_by_key(|module| Reverse(module.priority()));

        info!("Configuring container modules...");

        for module in &modules {
            module
                .configure(&container)
                .map_err(ApplicationError::ModuleError)?;
        }

        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use crate::application::{Application, ApplicationError};
    use crate::config::{ApplicationConfig, MockApplicationConfigProvider};
    use crate::module::{ContainerModulePtr, MockContainerModule};
    use parking_lot::Mutex;
    use std::fmt::Error as FmtError;
    use std::sync::Arc;
    use yadic::descriptor::TypeDescriptors;
    use yadic::instance::ErrorPtr;

    fn create_config_provider(
        implicit_self_registration: bool,
    ) -> MockApplicationConfigProvider {
        let mut config_provider = MockApplicationConfigProvider::new();
        config_provider.expect_config().returning(move || {
            Ok(ApplicationConfig {
                install_tracing_logger: false,
                implicit_self_registration,
            })
        });
        config_provider
    }

    fn create_module(priority: i8, order: Arc<Mutex<Vec<i8>>>) -> ContainerModulePtr {
        let mut module = MockContainerModule::new();
        module.expect_priority().return_const(priority);
        module.expect_configure().times(1).returning(move |_| {
            order.lock().push(priority);
            Ok(())
        });
        Box::new(module)
    }

    #[test]
    fn should_return_config_error() {
        let mut config_provider = MockApplicationConfigProvider::new();
        config_provider
            .expect_config()
            .times(1)
            .returning(|| Err(Arc::new(FmtError) as ErrorPtr));

        let application =
            Application::new(config_provider, Box::<TypeDescriptors>::default(), vec![]);

        assert!(matches!(
            application.run().unwrap_err(),
            ApplicationError::ConfigError(_)
        ));
    }

    #[test]
    fn should_return_module_error() {
        let mut module = MockContainerModule::new();
        module.expect_priority().return_const(0i8);
        module
            .expect_configure()
            .times(1)
            .returning(|_| Err(Arc::new(FmtError) as ErrorPtr));

        let application = Application::new(
            create_config_provider(true),
            Box::<TypeDescriptors>::default(),
            vec![Box::new(module) as ContainerModulePtr],
        );

        assert!(matches!(
            application.run().unwrap_err(),
            ApplicationError::ModuleError(_)
        ));
    }

    #[test]
    fn should_run_modules_by_priority() {
        let order = Arc::new(Mutex::new(vec![]));

        let application = Application::new(
            create_config_provider(true),
            Box::<TypeDescriptors>::default(),
            vec![
                create_module(-128, order.clone()),
                create_module(5, order.clone()),
                create_module(0, order.clone()),
            ],
        );

        application.run().unwrap();

        assert_eq!(*order.lock(), vec![5, 0, -128]);
    }

    #[test]
    fn should_register_application_config() {
        let application = Application::new(
            create_config_provider(false),
            Box::<TypeDescriptors>::default(),
            vec![],
        );

        let container = application.run().unwrap();

        assert!(!container.config().implicit_self_registration);
        assert!(
            !container
                .resolve::<ApplicationConfig>()
                .unwrap()
                .implicit_self_registration
        );
    }
}
