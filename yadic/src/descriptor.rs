//! Metadata describing how to construct types and which of their members take part in build-up.
//!
//! The [Container](crate::container::Container) does not inspect types by itself - it asks a
//! [TypeDescriptorProvider] for constructors and injectable members of a given [TypeKey]. The
//! default provider is [TypeDescriptors], populated with [TypeDescriptor]s built from plain
//! closures:
//!
//! ```
//! use parking_lot::Mutex;
//! use yadic::descriptor::{TypeDescriptor, TypeDescriptors};
//! use yadic::instance::{ErrorPtr, InstancePtr};
//!
//! struct Engine;
//!
//! struct Car {
//!     engine: InstancePtr<Engine>,
//!     radio: Mutex<Option<InstancePtr<String>>>,
//! }
//!
//! let descriptors = TypeDescriptors::new()
//!     .with_type(TypeDescriptor::<Engine>::new().constructor(|| Engine))
//!     .with_type(
//!         TypeDescriptor::<Car>::new()
//!             // parameter types are taken from the closure signature
//!             .dependency_constructor(|engine: InstancePtr<Engine>| Car {
//!                 engine,
//!                 radio: Mutex::new(None),
//!             })
//!             // a fallible constructor, tried after richer ones
//!             .try_constructor(|| Err::<Car, _>(std::fmt::Error))
//!             // injected after construction
//!             .member("set_radio", |car: &Car, radio: InstancePtr<String>| {
//!                 *car.radio.lock() = Some(radio);
//!             }),
//!     );
//! ```
//!
//! Closure parameters must have explicit types, since they define the dependencies.

use crate::error::ResolutionError;
use crate::instance::{
    cast_function, downcast, erase, Abstraction, CastFunction, ErrorPtr, Injectable,
    InstanceAnyPtr, InstancePtr,
};
use crate::type_key::TypeKey;
use derivative::Derivative;
use fxhash::{FxHashMap, FxHashSet};
#[cfg(test)]
use mockall::automock;
use std::any::TypeId;
use std::error::Error;
use std::marker::PhantomData;
use std::slice::Iter;
use std::sync::Arc;

/// Type-erased constructor. Receives resolved arguments in declaration order and returns the
/// payload for the constructed type.
pub type ConstructorFunction =
    Arc<dyn Fn(&[InstanceAnyPtr]) -> Result<InstanceAnyPtr, ResolutionError> + Send + Sync>;

/// Type-erased member invocation. Receives the target payload and resolved arguments in
/// declaration order.
pub type MemberFunction = Arc<
    dyn Fn(&InstanceAnyPtr, &[InstanceAnyPtr]) -> Result<(), ResolutionError> + Send + Sync,
>;

/// A public constructor of a concrete type.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ConstructorDescriptor {
    /// Type being constructed.
    pub target: TypeKey,

    /// Parameter types in declaration order.
    pub parameters: Vec<TypeKey>,

    /// Explicitly marked as the dependency constructor - tried first and never falls back.
    pub is_explicit: bool,

    #[derivative(Debug = "ignore")]
    pub constructor: ConstructorFunction,
}

/// A member flagged for injection after construction.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct MemberDescriptor {
    pub target: TypeKey,
    pub name: String,
    pub parameters: Vec<TypeKey>,

    /// The member produces a value other than `()`.
    pub returns_value: bool,

    #[derivative(Debug = "ignore")]
    pub invoke: MemberFunction,
}

/// Relation between an alias type and its canonical type. Both are stored under the canonical key,
/// so payloads need conversion in both directions.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Equivalence {
    pub canonical: TypeKey,

    #[derivative(Debug = "ignore")]
    pub to_canonical: CastFunction,

    #[derivative(Debug = "ignore")]
    pub from_canonical: CastFunction,
}

/// Source of type metadata consumed by the container.
#[cfg_attr(test, automock)]
pub trait TypeDescriptorProvider {
    /// Public constructors of given type in a stable order.
    fn constructors(&self, key: TypeKey) -> Vec<ConstructorDescriptor>;

    /// Members of given type flagged for injection, in declaration order.
    fn injectable_members(&self, key: TypeKey) -> Vec<MemberDescriptor>;

    /// Checks if given type is abstract, thus cannot be constructed directly.
    fn is_abstract(&self, key: TypeKey) -> bool;

    /// Returns the key under which given type is registered.
    fn canonicalize(&self, key: TypeKey) -> TypeKey;

    /// Returns payload conversions for a non-canonical key.
    fn equivalence(&self, key: TypeKey) -> Option<Equivalence>;
}

pub type TypeDescriptorProviderPtr = Box<dyn TypeDescriptorProvider + Send + Sync>;

/// Closure usable as a constructor or a factory of `Out`, taking [InstancePtr] parameters.
pub trait FactoryFn<Out, Args>: Send + Sync + 'static {
    fn parameters() -> Vec<TypeKey>;

    fn call(&self, arguments: &[InstanceAnyPtr]) -> Result<Out, ResolutionError>;
}

/// Closure usable as an injectable member of `Target`, taking [InstancePtr] parameters after the
/// target reference.
pub trait MemberFn<Target, Out, Args>: Send + Sync + 'static {
    fn parameters() -> Vec<TypeKey>;

    fn call(&self, target: &Target, arguments: &[InstanceAnyPtr]) -> Result<Out, ResolutionError>;
}

fn next_argument<T: Injectable + ?Sized>(
    arguments: &mut Iter<InstanceAnyPtr>,
) -> Result<InstancePtr<T>, ResolutionError> {
    arguments
        .next()
        .ok_or_else(|| ResolutionError::IncompatibleInstance(TypeKey::of::<T>()))
        .and_then(downcast::<T>)
}

macro_rules! impl_descriptor_fn {
    ($($param:ident),*) => {
        impl<Out, F, $($param),*> FactoryFn<Out, ($(InstancePtr<$param>,)*)> for F
        where
            F: Fn($(InstancePtr<$param>),*) -> Out + Send + Sync + 'static,
            $($param: Injectable + ?Sized,)*
        {
            fn parameters() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$param>()),*]
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn call(&self, arguments: &[InstanceAnyPtr]) -> Result<Out, ResolutionError> {
                let mut arguments = arguments.iter();
                $(let $param = next_argument::<$param>(&mut arguments)?;)*
                Ok(self($($param),*))
            }
        }

        impl<Target, Out, F, $($param),*> MemberFn<Target, Out, ($(InstancePtr<$param>,)*)> for F
        where
            F: Fn(&Target, $(InstancePtr<$param>),*) -> Out + Send + Sync + 'static,
            $($param: Injectable + ?Sized,)*
        {
            fn parameters() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$param>()),*]
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn call(
                &self,
                target: &Target,
                arguments: &[InstanceAnyPtr],
            ) -> Result<Out, ResolutionError> {
                let mut arguments = arguments.iter();
                $(let $param = next_argument::<$param>(&mut arguments)?;)*
                Ok(self(target, $($param),*))
            }
        }
    };
}

impl_descriptor_fn!();
impl_descriptor_fn!(P1);
impl_descriptor_fn!(P1, P2);
impl_descriptor_fn!(P1, P2, P3);
impl_descriptor_fn!(P1, P2, P3, P4);
impl_descriptor_fn!(P1, P2, P3, P4, P5);
impl_descriptor_fn!(P1, P2, P3, P4, P5, P6);
impl_descriptor_fn!(P1, P2, P3, P4, P5, P6, P7);
impl_descriptor_fn!(P1, P2, P3, P4, P5, P6, P7, P8);

/// Builder for constructors and members of a single concrete type `C`.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct TypeDescriptor<C> {
    constructors: Vec<ConstructorDescriptor>,
    members: Vec<MemberDescriptor>,
    #[derivative(Debug = "ignore")]
    _target: PhantomData<fn() -> C>,
}

impl<C: Injectable> Default for TypeDescriptor<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Injectable> TypeDescriptor<C> {
    pub fn new() -> Self {
        Self {
            constructors: Vec::new(),
            members: Vec::new(),
            _target: PhantomData,
        }
    }

    /// Adds an infallible constructor.
    pub fn constructor<Args, F: FactoryFn<C, Args>>(self, constructor: F) -> Self {
        self.add_constructor(
            false,
            F::parameters(),
            move |arguments: &[InstanceAnyPtr]| constructor.call(arguments).map(Ok),
        )
    }

    /// Adds a constructor which can fail with an error. The error is reported as
    /// [ResolutionError::ConstructionFailed].
    pub fn try_constructor<Args, E, F>(self, constructor: F) -> Self
    where
        E: Error + Send + Sync + 'static,
        F: FactoryFn<Result<C, E>, Args>,
    {
        self.add_constructor(
            false,
            F::parameters(),
            move |arguments: &[InstanceAnyPtr]| {
                constructor
                    .call(arguments)
                    .map(|result| result.map_err(|error| Arc::new(error) as ErrorPtr))
            },
        )
    }

    /// Adds the constructor explicitly marked as the dependency constructor. Only one constructor
    /// per type should be marked.
    pub fn dependency_constructor<Args, F: FactoryFn<C, Args>>(self, constructor: F) -> Self {
        self.add_constructor(
            true,
            F::parameters(),
            move |arguments: &[InstanceAnyPtr]| constructor.call(arguments).map(Ok),
        )
    }

    /// Fallible version of [TypeDescriptor::dependency_constructor].
    pub fn try_dependency_constructor<Args, E, F>(self, constructor: F) -> Self
    where
        E: Error + Send + Sync + 'static,
        F: FactoryFn<Result<C, E>, Args>,
    {
        self.add_constructor(
            true,
            F::parameters(),
            move |arguments: &[InstanceAnyPtr]| {
                constructor
                    .call(arguments)
                    .map(|result| result.map_err(|error| Arc::new(error) as ErrorPtr))
            },
        )
    }

    /// Adds a member flagged for injection. Valid members take at least one parameter and return
    /// `()`; invalid ones are rejected when building up an instance.
    pub fn member<Args, Out, F>(mut self, name: impl Into<String>, member: F) -> Self
    where
        Out: 'static,
        F: MemberFn<C, Out, Args>,
    {
        let target = TypeKey::of::<C>();
        self.members.push(MemberDescriptor {
            target,
            name: name.into(),
            parameters: F::parameters(),
            returns_value: TypeId::of::<Out>() != TypeId::of::<()>(),
            invoke: Arc::new(move |instance: &InstanceAnyPtr, arguments: &[InstanceAnyPtr]| {
                let instance = downcast::<C>(instance)?;
                member.call(&instance, arguments).map(|_| ())
            }),
        });
        self
    }

    fn add_constructor<B>(mut self, is_explicit: bool, parameters: Vec<TypeKey>, body: B) -> Self
    where
        B: Fn(&[InstanceAnyPtr]) -> Result<Result<C, ErrorPtr>, ResolutionError>
            + Send
            + Sync
            + 'static,
    {
        let target = TypeKey::of::<C>();
        self.constructors.push(ConstructorDescriptor {
            target,
            parameters,
            is_explicit,
            constructor: Arc::new(move |arguments: &[InstanceAnyPtr]| {
                body(arguments)?
                    .map(|instance| erase(InstancePtr::new(instance)))
                    .map_err(|source| ResolutionError::ConstructionFailed { target, source })
            }),
        });
        self
    }
}

#[derive(Clone, Debug, Default)]
struct TypeEntry {
    constructors: Vec<ConstructorDescriptor>,
    members: Vec<MemberDescriptor>,
}

/// Default [TypeDescriptorProvider] populated explicitly by the user. Types without descriptors
/// are treated as concrete types with no constructors.
#[derive(Clone, Debug, Default)]
pub struct TypeDescriptors {
    types: FxHashMap<TypeKey, TypeEntry>,
    abstract_types: FxHashSet<TypeKey>,
    equivalences: FxHashMap<TypeKey, Equivalence>,
}

impl TypeDescriptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds descriptors for a concrete type, replacing previous ones.
    pub fn with_type<C: Injectable>(mut self, descriptor: TypeDescriptor<C>) -> Self {
        self.types.insert(
            TypeKey::of::<C>(),
            TypeEntry {
                constructors: descriptor.constructors,
                members: descriptor.members,
            },
        );
        self
    }

    /// Declares an abstract type, e.g. `dyn Trait + Send + Sync`.
    pub fn with_abstract<A: Injectable + ?Sized>(mut self) -> Self {
        self.abstract_types.insert(TypeKey::of::<A>());
        self
    }

    /// Declares `Alias` to be the same registration key as `Canonical`.
    pub fn with_equivalent<Alias, Canonical>(mut self) -> Self
    where
        Alias: Abstraction<Canonical> + ?Sized,
        Canonical: Abstraction<Alias> + ?Sized,
    {
        self.equivalences.insert(
            TypeKey::of::<Alias>(),
            Equivalence {
                canonical: TypeKey::of::<Canonical>(),
                to_canonical: cast_function::<Canonical, Alias>(),
                from_canonical: cast_function::<Alias, Canonical>(),
            },
        );
        self
    }
}

impl TypeDescriptorProvider for TypeDescriptors {
    fn constructors(&self, key: TypeKey) -> Vec<ConstructorDescriptor> {
        self.types
            .get(&key)
            .map(|entry| entry.constructors.clone())
            .unwrap_or_default()
    }

    fn injectable_members(&self, key: TypeKey) -> Vec<MemberDescriptor> {
        self.types
            .get(&key)
            .map(|entry| entry.members.clone())
            .unwrap_or_default()
    }

    #[inline]
    fn is_abstract(&self, key: TypeKey) -> bool {
        self.abstract_types.contains(&key)
    }

    fn canonicalize(&self, key: TypeKey) -> TypeKey {
        self.equivalences
            .get(&key)
            .map(|equivalence| equivalence.canonical)
            .unwrap_or(key)
    }

    #[inline]
    fn equivalence(&self, key: TypeKey) -> Option<Equivalence> {
        self.equivalences.get(&key).cloned()
    }
}
