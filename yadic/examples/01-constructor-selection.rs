// note: this example assumes you've analyzed the previous one

use yadic::container::ContainerBuilder;
use yadic::descriptor::{TypeDescriptor, TypeDescriptors};
use yadic::instance::InstancePtr;

struct Database;

struct Cache;

struct Repository {
    cache: Option<InstancePtr<Cache>>,
}

#[derive(Debug, thiserror::Error)]
#[error("no connection available")]
struct NoConnection;

fn main() {
    let descriptors = TypeDescriptors::new()
        .with_type(TypeDescriptor::<Database>::new().constructor(|| Database))
        .with_type(TypeDescriptor::<Cache>::new().constructor(|| Cache))
        .with_type(
            TypeDescriptor::<Repository>::new()
                // constructors with more parameters are tried first; when their dependencies are
                // not registered, the container falls back to smaller ones
                .constructor(|_: InstancePtr<Database>| Repository { cache: None })
                .constructor(|_: InstancePtr<Database>, cache: InstancePtr<Cache>| {
                    Repository { cache: Some(cache) }
                })
                // constructors can also fail - errors are reported as ConstructionFailed
                .try_constructor(|| Err::<Repository, _>(NoConnection)),
        );

    let container = ContainerBuilder::new()
        .with_descriptor_provider(Box::new(descriptors))
        .build();

    container
        .register_type::<Database>()
        .expect("error registering Database");

    let repository = container
        .resolve::<Repository>()
        .expect("error creating Repository");

    // prints "Cached: false"
    println!("Cached: {}", repository.cache.is_some());

    container
        .register_type::<Cache>()
        .expect("error registering Cache");

    let repository = container
        .resolve::<Repository>()
        .expect("error creating Repository");

    // prints "Cached: true"
    println!("Cached: {}", repository.cache.is_some());
}
