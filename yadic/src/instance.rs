//! Instance pointers and type-erased conversions between views of the same instance.
//!
//! Every instance handed out by the [Container](crate::container::Container) is wrapped in an
//! [InstancePtr]. Internally, the container stores instances as [InstanceAnyPtr], whose payload is
//! always the `InstancePtr<K>` for the [TypeKey] `K` it is stored under. Converting between
//! a concrete type and its abstract views is done by [CastFunction]s derived from
//! [Abstraction] implementations.
//!
//! ```
//! use yadic::abstraction;
//! use yadic::instance::{Abstraction, InstancePtr};
//!
//! trait Greeter {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! abstraction!(dyn Greeter + Send + Sync => English);
//!
//! let greeter = <dyn Greeter + Send + Sync>::upcast(InstancePtr::new(English));
//! assert_eq!(greeter.greet(), "hello");
//! ```

use crate::error::ResolutionError;
use crate::type_key::TypeKey;
use std::any::Any;
use std::error::Error;
use std::sync::Arc;

pub type InstancePtr<T> = Arc<T>;

pub type InstanceAnyPtr = InstancePtr<dyn Any + Send + Sync + 'static>;

/// Error returned by user code, e.g. a failing constructor body.
pub type ErrorPtr = Arc<dyn Error + Send + Sync + 'static>;

/// Type-erased conversion from the payload of one key to the payload of another. Returns the
/// source instance back, if it has an unexpected type.
pub type CastFunction =
    Arc<dyn Fn(InstanceAnyPtr) -> Result<InstanceAnyPtr, InstanceAnyPtr> + Send + Sync>;

/// Marker trait for types which can be resolved - concrete types and abstract `dyn Trait` views.
pub trait Injectable: Send + Sync + 'static {}

impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Declares `Self` as an abstract view of `C`, i.e. every `C` is-a `Self`. Registering a mapping
/// from `Self` to `C` requires this relation. Every type is an abstraction of itself. Usually
/// implemented with the [abstraction](crate::abstraction) macro.
pub trait Abstraction<C: Injectable + ?Sized>: Injectable {
    fn upcast(instance: InstancePtr<C>) -> InstancePtr<Self>;
}

impl<T: Injectable + ?Sized> Abstraction<T> for T {
    #[inline]
    fn upcast(instance: InstancePtr<T>) -> InstancePtr<Self> {
        instance
    }
}

/// Implements [Abstraction] of a `dyn Trait` for the listed concrete types.
///
/// ```
/// use yadic::abstraction;
///
/// trait Storage {}
///
/// struct Memory;
/// struct Disk;
///
/// impl Storage for Memory {}
/// impl Storage for Disk {}
///
/// abstraction!(dyn Storage + Send + Sync => Memory, Disk);
/// ```
#[macro_export]
macro_rules! abstraction {
    ($view:ty => $($concrete:ty),+ $(,)?) => {
        $(
            impl $crate::instance::Abstraction<$concrete> for $view {
                #[inline]
                fn upcast(
                    instance: $crate::instance::InstancePtr<$concrete>,
                ) -> $crate::instance::InstancePtr<Self> {
                    instance
                }
            }
        )+
    };
}

/// Wraps a typed instance into its type-erased form.
#[inline]
pub fn erase<T: Injectable + ?Sized>(instance: InstancePtr<T>) -> InstanceAnyPtr {
    InstancePtr::new(instance) as InstanceAnyPtr
}

/// Recovers a typed instance from its type-erased form.
pub fn downcast<T: Injectable + ?Sized>(
    instance: &InstanceAnyPtr,
) -> Result<InstancePtr<T>, ResolutionError> {
    instance
        .downcast_ref::<InstancePtr<T>>()
        .cloned()
        .ok_or_else(|| ResolutionError::IncompatibleInstance(TypeKey::of::<T>()))
}

/// Cast function converting a `C` payload into an `A` payload.
pub fn cast_function<A: Abstraction<C> + ?Sized, C: Injectable + ?Sized>() -> CastFunction {
    Arc::new(|instance: InstanceAnyPtr| {
        let concrete = instance.downcast_ref::<InstancePtr<C>>().cloned();
        match concrete {
            Some(concrete) => Ok(erase(A::upcast(concrete))),
            None => Err(instance),
        }
    })
}

/// Cast function which returns the payload untouched.
pub fn identity_cast() -> CastFunction {
    Arc::new(Ok::<InstanceAnyPtr, InstanceAnyPtr>)
}

/// Composes casts applied left to right.
pub fn chain_casts(casts: Vec<CastFunction>) -> CastFunction {
    if let [cast] = casts.as_slice() {
        return cast.clone();
    }

    Arc::new(move |instance: InstanceAnyPtr| {
        casts.iter().try_fold(instance, |instance, cast| cast(instance))
    })
}
