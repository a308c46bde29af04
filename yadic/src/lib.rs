//! Object graph resolution engine - a dependency injection container driven by explicit type
//! metadata.
//!
//! Instead of constructing and passing services around manually, types are registered in a
//! [Container](container::Container), which then creates them on demand, along with all their
//! dependencies. Constructors and injectable members of each type are described by a
//! [TypeDescriptorProvider](descriptor::TypeDescriptorProvider), so the engine does not depend on
//! any particular way of discovering them.
//!
//! ```
//! use yadic::abstraction;
//! use yadic::container::ContainerBuilder;
//! use yadic::descriptor::{TypeDescriptor, TypeDescriptors};
//! use yadic::instance::InstancePtr;
//! use yadic::registry::Lifetime;
//!
//! trait Repository {
//!     fn name(&self) -> &str;
//! }
//!
//! struct MemoryRepository;
//!
//! impl Repository for MemoryRepository {
//!     fn name(&self) -> &str {
//!         "memory"
//!     }
//! }
//!
//! abstraction!(dyn Repository + Send + Sync => MemoryRepository);
//!
//! struct Service {
//!     repository: InstancePtr<dyn Repository + Send + Sync>,
//! }
//!
//! let descriptors = TypeDescriptors::new()
//!     .with_abstract::<dyn Repository + Send + Sync>()
//!     .with_type(TypeDescriptor::<MemoryRepository>::new().constructor(|| MemoryRepository))
//!     .with_type(TypeDescriptor::<Service>::new().constructor(
//!         |repository: InstancePtr<dyn Repository + Send + Sync>| Service { repository },
//!     ));
//!
//! let container = ContainerBuilder::new()
//!     .with_descriptor_provider(Box::new(descriptors))
//!     .build();
//!
//! container
//!     .register_mapping_with::<dyn Repository + Send + Sync, MemoryRepository>(
//!         Lifetime::Singleton,
//!     )
//!     .unwrap();
//!
//! let service = container.resolve::<Service>().unwrap();
//! assert_eq!(service.repository.name(), "memory");
//! ```
//!
//! ### Lifetimes
//!
//! Each registration carries a [Lifetime](registry::Lifetime): transient registrations produce a
//! new instance on every request, while singletons are constructed once and cached.
//!
//! ### Constructor selection
//!
//! A type can expose multiple constructors. The one marked as the dependency constructor is always
//! tried first and exclusively; the rest are tried from the one with the most parameters, falling
//! back to smaller ones when dependencies cannot be satisfied. See
//! [order_constructors](selector::order_constructors).
//!
//! ### Build-up
//!
//! After construction, injectable members of an instance are invoked with resolved dependencies.
//! Existing instances can be built up directly with
//! [Container::build_up](container::Container::build_up).

pub mod config;
pub mod container;
pub mod descriptor;
pub mod error;
mod injector;
pub mod instance;
pub mod registry;
pub mod resolver;
pub mod selector;
pub mod type_key;
