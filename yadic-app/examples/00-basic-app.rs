use std::sync::Arc;
use yadic::abstraction;
use yadic::container::Container;
use yadic::descriptor::{TypeDescriptor, TypeDescriptors};
use yadic::instance::ErrorPtr;
use yadic::registry::Lifetime;
use yadic_app::application::Application;
use yadic_app::config::DefaultApplicationConfigProvider;
use yadic_app::module::{ContainerModule, ContainerModulePtr};

trait Greeter {
    fn greet(&self);
}

struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self) {
        println!("Hello world!");
    }
}

abstraction!(dyn Greeter + Send + Sync => EnglishGreeter);

// modules group related registrations - an application usually has one per logical part
struct GreetingModule;

impl ContainerModule for GreetingModule {
    fn configure(&self, container: &Container) -> Result<(), ErrorPtr> {
        container
            .register_mapping_with::<dyn Greeter + Send + Sync, EnglishGreeter>(
                Lifetime::Singleton,
            )
            .map_err(|error| Arc::new(error) as ErrorPtr)?;
        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let descriptors = TypeDescriptors::new()
        .with_abstract::<dyn Greeter + Send + Sync>()
        .with_type(TypeDescriptor::<EnglishGreeter>::new().constructor(|| EnglishGreeter));

    // the application loads configuration, installs a logger and runs all modules, resulting in a
    // ready to use container
    let application = Application::new(
        DefaultApplicationConfigProvider::new(),
        Box::new(descriptors),
        vec![Box::new(GreetingModule) as ContainerModulePtr],
    );

    let container = application.run().expect("error running application");

    // prints "Hello world!"
    container
        .resolve::<dyn Greeter + Send + Sync>()
        .expect("error resolving dyn Greeter")
        .greet();
}
