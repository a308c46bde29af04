// note: this example assumes you've analyzed the previous ones

use std::sync::Arc;
use yadic::container::Container;
use yadic::descriptor::TypeDescriptors;
use yadic::instance::{ErrorPtr, InstancePtr};
use yadic_app::application::Application;
use yadic_app::config::DefaultApplicationConfigProvider;
use yadic_app::module::{ContainerModule, ContainerModulePtr};

struct Settings {
    name: &'static str,
}

// modules are run in order of their priorities - higher priorities first; this can be used to
// override registrations made by other modules
struct DefaultsModule;

impl ContainerModule for DefaultsModule {
    fn configure(&self, container: &Container) -> Result<(), ErrorPtr> {
        println!("Registering defaults");

        container
            .register_instance::<Settings>(InstancePtr::new(Settings { name: "default" }))
            .map_err(|error| Arc::new(error) as ErrorPtr)?;
        Ok(())
    }

    fn priority(&self) -> i8 {
        10
    }
}

struct OverrideModule;

impl ContainerModule for OverrideModule {
    fn configure(&self, container: &Container) -> Result<(), ErrorPtr> {
        println!("Overriding defaults");

        container
            .register_instance::<Settings>(InstancePtr::new(Settings { name: "custom" }))
            .map_err(|error| Arc::new(error) as ErrorPtr)?;
        Ok(())
    }

    fn priority(&self) -> i8 {
        -10
    }
}

fn main() {
    let application = Application::new(
        DefaultApplicationConfigProvider::new(),
        Box::<TypeDescriptors>::default(),
        vec![
            Box::new(OverrideModule) as ContainerModulePtr,
            Box::new(DefaultsModule) as ContainerModulePtr,
        ],
    );

    // prints "Registering defaults" and then "Overriding defaults"
    let container = application.run().expect("error running application");

    // prints "Settings: custom"
    println!(
        "Settings: {}",
        container
            .resolve::<Settings>()
            .expect("error resolving Settings")
            .name
    );
}
