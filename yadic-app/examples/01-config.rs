// note: this example assumes you've analyzed the previous one

use yadic::descriptor::TypeDescriptors;
use yadic::instance::ErrorPtr;
use yadic_app::application::Application;
use yadic_app::config::{ApplicationConfig, ApplicationConfigProvider};

// application config is provided by an ApplicationConfigProvider, which by default, uses
// environment variables and a configuration file (see module documentation)
// to provide your own, implement this trait and pass it to the application
struct MyApplicationConfigProvider {
    // this is the cached custom config
    config: ApplicationConfig,
}

impl MyApplicationConfigProvider {
    fn new() -> Self {
        // start with a default config and override what's needed
        let mut config = ApplicationConfig::default();
        config.install_tracing_logger = false;
        config.implicit_self_registration = false;

        Self { config }
    }
}

impl ApplicationConfigProvider for MyApplicationConfigProvider {
    fn config(&self) -> Result<ApplicationConfig, ErrorPtr> {
        Ok(self.config.clone())
    }
}

fn main() {
    let application = Application::new(
        MyApplicationConfigProvider::new(),
        Box::<TypeDescriptors>::default(),
        vec![],
    );

    let container = application.run().expect("error running application");

    // the config is always registered in the container, so it can be injected anywhere
    let config = container
        .resolve::<ApplicationConfig>()
        .expect("error resolving ApplicationConfig");

    // prints "Using built-in logger: false"
    println!("Using built-in logger: {}", config.install_tracing_logger);

    // prints "Implicit self-registration: false"
    println!(
        "Implicit self-registration: {}",
        container.config().implicit_self_registration
    );
}
