// note: this example assumes you've analyzed the previous ones

use parking_lot::Mutex;
use yadic::container::ContainerBuilder;
use yadic::descriptor::{TypeDescriptor, TypeDescriptors};
use yadic::instance::InstancePtr;

struct Settings {
    verbose: bool,
}

// a type which is created outside the container, e.g. by another library
#[derive(Default)]
struct Plugin {
    settings: Mutex<Option<InstancePtr<Settings>>>,
}

fn main() {
    let descriptors = TypeDescriptors::new().with_type(
        // injectable members are invoked after construction, or when building up existing
        // instances; they need to take at least one dependency and return nothing
        TypeDescriptor::<Plugin>::new().member(
            "set_settings",
            |plugin: &Plugin, settings: InstancePtr<Settings>| {
                *plugin.settings.lock() = Some(settings);
            },
        ),
    );

    let container = ContainerBuilder::new()
        .with_descriptor_provider(Box::new(descriptors))
        .build();

    container
        .register_instance::<Settings>(InstancePtr::new(Settings { verbose: true }))
        .expect("error registering Settings");

    let plugin = container
        .build_up(InstancePtr::new(Plugin::default()))
        .expect("error building up Plugin");

    // prints "Verbose: true"
    println!(
        "Verbose: {}",
        plugin
            .settings
            .lock()
            .as_ref()
            .map(|settings| settings.verbose)
            .unwrap_or_default()
    );
}
