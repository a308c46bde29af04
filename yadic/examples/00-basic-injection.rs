use yadic::abstraction;
use yadic::container::ContainerBuilder;
use yadic::descriptor::{TypeDescriptor, TypeDescriptors};
use yadic::instance::InstancePtr;

// this is a trait we would like to use in our service
trait Greeter {
    fn greet(&self);
}

// this is a dependency which implements the above trait
struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self) {
        println!("Hello world!");
    }
}

// we're telling the container EnglishGreeter is-a dyn Greeter, so it can be provided when asked
// for the trait
abstraction!(dyn Greeter + Send + Sync => EnglishGreeter);

// this is another type, but with a dependency
struct Service {
    greeter: InstancePtr<dyn Greeter + Send + Sync>,
}

impl Service {
    fn call_greet(&self) {
        self.greeter.greet();
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // the container doesn't inspect types by itself - it needs to know which constructors are
    // available; parameters are taken from closure signatures
    let descriptors = TypeDescriptors::new()
        .with_abstract::<dyn Greeter + Send + Sync>()
        .with_type(TypeDescriptor::<EnglishGreeter>::new().constructor(|| EnglishGreeter))
        .with_type(
            TypeDescriptor::<Service>::new()
                .constructor(|greeter: InstancePtr<dyn Greeter + Send + Sync>| Service { greeter }),
        );

    let container = ContainerBuilder::new()
        .with_descriptor_provider(Box::new(descriptors))
        .build();

    // abstract types need to be mapped to something concrete; Service itself is concrete, so it
    // can be resolved without registration
    container
        .register_mapping::<dyn Greeter + Send + Sync, EnglishGreeter>()
        .expect("error registering dyn Greeter");

    let service = container
        .resolve::<Service>()
        .expect("error creating Service");

    // prints "Hello world!"
    service.call_greet();
}
