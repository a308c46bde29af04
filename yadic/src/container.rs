//! Public entry point for registering types and resolving instances.

use crate::config::ContainerConfig;
use crate::descriptor::{TypeDescriptorProviderPtr, TypeDescriptors};
use crate::error::ResolutionError;
use crate::instance::{
    cast_function, chain_casts, downcast, erase, Abstraction, CastFunction, Injectable,
    InstanceAnyPtr, InstancePtr,
};
use crate::registry::{Lifetime, Registry};
use crate::resolver::ResolutionStack;
use crate::type_key::TypeKey;
use derivative::Derivative;
use parking_lot::RwLock;
use tracing::debug;

/// Builder for [Container] with sensible defaults, for easy construction.
pub struct ContainerBuilder {
    descriptors: TypeDescriptorProviderPtr,
    config: ContainerConfig,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// Creates a new builder with empty [TypeDescriptors] and default configuration.
    pub fn new() -> Self {
        Self {
            descriptors: Box::<TypeDescriptors>::default(),
            config: Default::default(),
        }
    }

    /// Sets new [TypeDescriptorProvider](crate::descriptor::TypeDescriptorProvider).
    pub fn with_descriptor_provider(mut self, descriptors: TypeDescriptorProviderPtr) -> Self {
        self.descriptors = descriptors;
        self
    }

    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds resulting [Container].
    pub fn build(self) -> Container {
        Container::new(self.descriptors, self.config)
    }
}

/// Dependency injection container. Resolves instances of registered types, recursively
/// constructing their dependencies using metadata from a
/// [TypeDescriptorProvider](crate::descriptor::TypeDescriptorProvider).
///
/// The container can be shared between threads - registrations and resolutions take `&self`.
/// Every top-level call uses its own resolution stack, so concurrent resolutions only share the
/// registry.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Container {
    #[derivative(Debug = "ignore")]
    pub(crate) descriptors: TypeDescriptorProviderPtr,
    pub(crate) registry: RwLock<Registry>,
    pub(crate) config: ContainerConfig,
}

impl Container {
    pub fn new(descriptors: TypeDescriptorProviderPtr, config: ContainerConfig) -> Self {
        Self {
            descriptors,
            registry: Default::default(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Registers concrete type `C` as a [Transient](Lifetime::Transient) mapping to itself.
    #[inline]
    pub fn register_type<C: Injectable + ?Sized>(&self) -> Result<&Self, ResolutionError> {
        self.register_type_with::<C>(Lifetime::Transient)
    }

    /// Registers concrete type `C` as mapping to itself. Fails if `C` is abstract.
    #[inline]
    pub fn register_type_with<C: Injectable + ?Sized>(
        &self,
        lifetime: Lifetime,
    ) -> Result<&Self, ResolutionError> {
        self.register_mapping_with::<C, C>(lifetime)
    }

    /// Registers `C` to be instantiated when requesting `A`, as [Transient](Lifetime::Transient).
    #[inline]
    pub fn register_mapping<A, C>(&self) -> Result<&Self, ResolutionError>
    where
        A: Abstraction<C> + ?Sized,
        C: Injectable + ?Sized,
    {
        self.register_mapping_with::<A, C>(Lifetime::Transient)
    }

    /// Registers `C` to be instantiated when requesting `A`. `C` might be abstract itself, in which
    /// case its own registration is followed when resolving. Replaces any previous registration
    /// for `A` and discards its cached singleton. An instance registered for `A` takes precedence
    /// over this registration.
    pub fn register_mapping_with<A, C>(&self, lifetime: Lifetime) -> Result<&Self, ResolutionError>
    where
        A: Abstraction<C> + ?Sized,
        C: Injectable + ?Sized,
    {
        let requested = TypeKey::of::<A>();
        let mapped = TypeKey::of::<C>();

        let key = self.descriptors.canonicalize(requested);
        let concrete = self.descriptors.canonicalize(mapped);

        if key == concrete && self.descriptors.is_abstract(concrete) {
            return Err(ResolutionError::AbstractType(concrete));
        }

        let mut casts: Vec<CastFunction> = Vec::with_capacity(3);
        if let Some(equivalence) = self.descriptors.equivalence(mapped) {
            casts.push(equivalence.from_canonical);
        }

        casts.push(cast_function::<A, C>());

        if let Some(equivalence) = self.descriptors.equivalence(requested) {
            casts.push(equivalence.to_canonical);
        }

        self.registry
            .write()
            .register_type(key, concrete, lifetime, chain_casts(casts));

        Ok(self)
    }

    /// Makes `K` always resolve to given instance. Absent instances are rejected with
    /// [ResolutionError::NullInstance].
    pub fn register_instance<K: Injectable + ?Sized>(
        &self,
        instance: impl Into<Option<InstancePtr<K>>>,
    ) -> Result<&Self, ResolutionError> {
        self.register_instance_any(TypeKey::of::<K>(), instance.into().map(erase))
    }

    /// Type-erased version of [Container::register_instance]. The payload must be an
    /// `InstancePtr` of the type identified by `key`.
    pub fn register_instance_any(
        &self,
        key: TypeKey,
        instance: Option<InstanceAnyPtr>,
    ) -> Result<&Self, ResolutionError> {
        let (key, instance) = match instance {
            Some(instance) => {
                let (key, instance) = self.to_canonical(key, instance)?;
                (key, Some(instance))
            }
            None => (self.descriptors.canonicalize(key), None),
        };

        self.registry.write().register_instance(key, instance)?;
        Ok(self)
    }

    /// Checks if given key has a type registration or a registered instance.
    pub fn is_registered(&self, key: TypeKey) -> bool {
        let key = self.descriptors.canonicalize(key);
        self.registry.read().is_registered(key)
    }

    /// Resolves an instance of `K`, constructing it and its dependencies when needed.
    pub fn resolve<K: Injectable + ?Sized>(&self) -> Result<InstancePtr<K>, ResolutionError> {
        self.resolve_any(TypeKey::of::<K>())
            .and_then(|instance| downcast::<K>(&instance))
    }

    /// Type-erased version of [Container::resolve]. The payload of the result is an
    /// `InstancePtr` of the type identified by `key`.
    pub fn resolve_any(&self, key: TypeKey) -> Result<InstanceAnyPtr, ResolutionError> {
        debug!(%key, "Resolving instance.");

        let mut stack = ResolutionStack::default();
        self.resolve_view(key, &mut stack)
    }

    /// Injects dependencies into an existing instance through injectable members of `C`. Members
    /// are looked up by `C` itself, so `C` must be concrete - abstract types are rejected with
    /// [ResolutionError::AbstractType].
    pub fn build_up<C: Injectable + ?Sized>(
        &self,
        instance: InstancePtr<C>,
    ) -> Result<InstancePtr<C>, ResolutionError> {
        self.build_up_any(TypeKey::of::<C>(), erase(instance.clone()))?;
        Ok(instance)
    }

    /// Type-erased version of [Container::build_up].
    pub fn build_up_any(
        &self,
        key: TypeKey,
        instance: InstanceAnyPtr,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        debug!(%key, "Building up instance.");

        let (key, payload) = self.to_canonical(key, instance.clone())?;
        if self.descriptors.is_abstract(key) {
            return Err(ResolutionError::AbstractType(key));
        }

        let mut stack = ResolutionStack::default();
        self.build_up_instance(key, &payload, &mut stack)?;

        Ok(instance)
    }

    fn to_canonical(
        &self,
        key: TypeKey,
        instance: InstanceAnyPtr,
    ) -> Result<(TypeKey, InstanceAnyPtr), ResolutionError> {
        match self.descriptors.equivalence(key) {
            Some(equivalence) => (equivalence.to_canonical)(instance)
                .map(|instance| (equivalence.canonical, instance))
                .map_err(|_| ResolutionError::IncompatibleInstance(key)),
            None => Ok((key, instance)),
        }
    }
}
