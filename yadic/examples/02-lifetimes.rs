// note: this example assumes you've analyzed the previous ones

use std::sync::atomic::{AtomicU32, Ordering};
use yadic::container::ContainerBuilder;
use yadic::descriptor::{TypeDescriptor, TypeDescriptors};
use yadic::instance::InstancePtr;
use yadic::registry::Lifetime;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

struct Connection {
    id: u32,
}

impl Connection {
    fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
        }
    }
}

fn main() {
    let descriptors = TypeDescriptors::new()
        .with_type(TypeDescriptor::<Connection>::new().constructor(Connection::new));

    let container = ContainerBuilder::new()
        .with_descriptor_provider(Box::new(descriptors))
        .build();

    // transient registrations create a new instance on every request
    container
        .register_type::<Connection>()
        .expect("error registering Connection");

    let first = container.resolve::<Connection>().unwrap();
    let second = container.resolve::<Connection>().unwrap();

    // prints "Transient: 0 1"
    println!("Transient: {} {}", first.id, second.id);

    // singletons are created once and then reused; re-registering discards the cached instance
    container
        .register_type_with::<Connection>(Lifetime::Singleton)
        .expect("error registering Connection");

    let first = container.resolve::<Connection>().unwrap();
    let second = container.resolve::<Connection>().unwrap();

    // prints "Singleton: 2 2"
    println!("Singleton: {} {}", first.id, second.id);

    // explicitly registered instances always take precedence
    container
        .register_instance::<Connection>(InstancePtr::new(Connection { id: 100 }))
        .expect("error registering Connection instance");

    // prints "Instance: 100"
    println!("Instance: {}", container.resolve::<Connection>().unwrap().id);
}
