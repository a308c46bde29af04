//! Mapping from requested types to concrete types, pre-built instances and lifetime policies.

use crate::descriptor::TypeDescriptorProvider;
use crate::error::ResolutionError;
use crate::instance::{chain_casts, identity_cast, CastFunction, InstanceAnyPtr};
use crate::type_key::TypeKey;
use derivative::Derivative;
use fxhash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Decides when to reuse an instance.
///
/// Note: lifetimes are evaluated at construction time, so a [Singleton](Lifetime::Singleton)
/// depending on a [Transient](Lifetime::Transient) type keeps the single transient instance it was
/// constructed with.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum Lifetime {
    /// New instance on every request.
    #[default]
    Transient,
    /// One shared instance after the first successful construction.
    Singleton,
}

/// Registration of a single key.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Registration {
    /// Type to instantiate. Might be abstract, forming a chain of mappings.
    pub concrete: TypeKey,
    pub lifetime: Lifetime,

    /// Incremented on every registration, so a construction started before re-registration does
    /// not end up in the cache.
    pub generation: u64,

    /// Converts the payload of `concrete` into the payload of the registered key.
    #[derivative(Debug = "ignore")]
    pub cast: CastFunction,

    #[derivative(Debug = "ignore")]
    cached_instance: Option<InstanceAnyPtr>,
}

/// Result of following registrations from a requested key to a concrete type.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ConcreteMapping {
    pub concrete: TypeKey,
    pub lifetime: Lifetime,
    pub generation: u64,

    /// Converts the payload of `concrete` into the payload of the requested key.
    #[derivative(Debug = "ignore")]
    pub cast: CastFunction,
}

#[derive(Default, Clone, Debug)]
pub struct Registry {
    registrations: FxHashMap<TypeKey, Registration>,
    instances: FxHashMap<TypeKey, InstanceAnyPtr>,
    last_generation: u64,
}

impl Registry {
    /// Registers `concrete` to be instantiated when requesting `key`, discarding any cached
    /// singleton. Explicitly registered instances are kept and take precedence.
    pub fn register_type(
        &mut self,
        key: TypeKey,
        concrete: TypeKey,
        lifetime: Lifetime,
        cast: CastFunction,
    ) {
        debug!(%key, %concrete, ?lifetime, "Registering type.");

        self.last_generation += 1;
        self.registrations.insert(
            key,
            Registration {
                concrete,
                lifetime,
                generation: self.last_generation,
                cast,
                cached_instance: None,
            },
        );
    }

    /// Makes `key` resolve to exactly the given instance.
    pub fn register_instance(
        &mut self,
        key: TypeKey,
        instance: Option<InstanceAnyPtr>,
    ) -> Result<(), ResolutionError> {
        let instance = instance.ok_or(ResolutionError::NullInstance(key))?;

        debug!(%key, "Registering instance.");

        self.instances.insert(key, instance);
        Ok(())
    }

    #[inline]
    pub fn registration(&self, key: TypeKey) -> Option<&Registration> {
        self.registrations.get(&key)
    }

    /// Checks if given key has either a type registration or a registered instance.
    #[inline]
    pub fn is_registered(&self, key: TypeKey) -> bool {
        self.instances.contains_key(&key) || self.registrations.contains_key(&key)
    }

    /// Returns an instance available without construction - either registered explicitly or a
    /// cached singleton.
    pub fn instance(&self, key: TypeKey) -> Option<InstanceAnyPtr> {
        self.instances.get(&key).cloned().or_else(|| {
            self.registrations
                .get(&key)
                .and_then(|registration| registration.cached_instance.clone())
        })
    }

    /// Stores a constructed singleton, unless another one has been stored first for the same
    /// registration. Returns the instance which should be observed by callers. Instances
    /// constructed for an outdated registration are returned without caching.
    pub fn store_singleton(
        &mut self,
        key: TypeKey,
        generation: u64,
        instance: InstanceAnyPtr,
    ) -> InstanceAnyPtr {
        match self.registrations.get_mut(&key) {
            Some(registration)
                if registration.generation == generation
                    && registration.lifetime == Lifetime::Singleton =>
            {
                if let Some(existing) = &registration.cached_instance {
                    debug!(%key, "Discarding concurrently constructed singleton.");
                    return existing.clone();
                }

                debug!(%key, "Caching singleton.");

                registration.cached_instance = Some(instance.clone());
                instance
            }
            _ => instance,
        }
    }

    /// Follows registrations from `key` while the mapped type is abstract. An unregistered concrete
    /// type is registered as mapping to itself, if `implicit_self_registration` is enabled.
    pub fn lookup_concrete_type(
        &mut self,
        key: TypeKey,
        descriptors: &dyn TypeDescriptorProvider,
        implicit_self_registration: bool,
    ) -> Result<ConcreteMapping, ResolutionError> {
        let mut visited = FxHashSet::default();
        let mut path = Vec::new();
        let mut casts = Vec::new();
        let mut policy = None;
        let mut current = key;

        loop {
            if !visited.insert(current) {
                path.push(current);
                return Err(ResolutionError::CircularDependency { key, path });
            }

            path.push(current);

            if !self.registrations.contains_key(&current) {
                if descriptors.is_abstract(current) {
                    return Err(ResolutionError::AbstractType(current));
                }

                if !implicit_self_registration {
                    return Err(ResolutionError::UnregisteredType(current));
                }

                debug!(key = %current, "Implicitly registering concrete type as itself.");
                self.register_type(current, current, Lifetime::Transient, identity_cast());
            }

            let registration = self
                .registrations
                .get(&current)
                .ok_or(ResolutionError::UnregisteredType(current))?;

            policy.get_or_insert((registration.lifetime, registration.generation));
            casts.push(registration.cast.clone());
            current = registration.concrete;

            if !descriptors.is_abstract(current) {
                break;
            }
        }

        let (lifetime, generation) = policy.unwrap_or_default();

        casts.reverse();

        Ok(ConcreteMapping {
            concrete: current,
            lifetime,
            generation,
            cast: chain_casts(casts),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::descriptor::MockTypeDescriptorProvider;
    use crate::error::ResolutionError;
    use crate::instance::{downcast, erase, identity_cast, InstancePtr};
    use crate::registry::{Lifetime, Registry};
    use crate::type_key::TypeKey;
    use mockall::predicate::*;

    fn create_provider(abstract_types: Vec<TypeKey>) -> MockTypeDescriptorProvider {
        let mut provider = MockTypeDescriptorProvider::new();
        provider
            .expect_is_abstract()
            .returning(move |key| abstract_types.contains(&key));
        provider
    }

    #[test]
    fn should_register_type() {
        let key = TypeKey::of::<i8>();

        let mut registry = Registry::default();
        registry.register_type(key, key, Lifetime::Singleton, identity_cast());

        assert!(registry.is_registered(key));
        assert_eq!(
            registry.registration(key).unwrap().lifetime,
            Lifetime::Singleton
        );
        assert!(registry.instance(key).is_none());
    }

    #[test]
    fn should_reject_null_instance() {
        let mut registry = Registry::default();

        assert!(matches!(
            registry
                .register_instance(TypeKey::of::<i8>(), None)
                .unwrap_err(),
            ResolutionError::NullInstance(_)
        ));
        assert!(!registry.is_registered(TypeKey::of::<i8>()));
    }

    #[test]
    fn should_prefer_registered_instance() {
        let key = TypeKey::of::<i8>();
        let instance = erase(InstancePtr::new(1i8));

        let mut registry = Registry::default();
        registry
            .register_instance(key, Some(instance.clone()))
            .unwrap();
        registry.register_type(key, key, Lifetime::Singleton, identity_cast());

        assert!(InstancePtr::ptr_eq(
            &registry.instance(key).unwrap(),
            &instance
        ));
    }

    #[test]
    fn should_cache_singleton_once() {
        let key = TypeKey::of::<i8>();
        let first = erase(InstancePtr::new(1i8));
        let second = erase(InstancePtr::new(2i8));

        let mut registry = Registry::default();
        registry.register_type(key, key, Lifetime::Singleton, identity_cast());
        let generation = registry.registration(key).unwrap().generation;

        assert!(InstancePtr::ptr_eq(
            &registry.store_singleton(key, generation, first.clone()),
            &first
        ));
        assert!(InstancePtr::ptr_eq(
            &registry.store_singleton(key, generation, second),
            &first
        ));
        assert!(InstancePtr::ptr_eq(&registry.instance(key).unwrap(), &first));
    }

    #[test]
    fn should_not_cache_outdated_singleton() {
        let key = TypeKey::of::<i8>();

        let mut registry = Registry::default();
        registry.register_type(key, key, Lifetime::Singleton, identity_cast());
        let generation = registry.registration(key).unwrap().generation;
        registry.register_type(key, key, Lifetime::Singleton, identity_cast());

        registry.store_singleton(key, generation, erase(InstancePtr::new(1i8)));

        assert!(registry.instance(key).is_none());
    }

    #[test]
    fn should_clear_singleton_on_transient_registration() {
        let key = TypeKey::of::<i8>();

        let mut registry = Registry::default();
        registry.register_type(key, key, Lifetime::Singleton, identity_cast());
        let generation = registry.registration(key).unwrap().generation;
        registry.store_singleton(key, generation, erase(InstancePtr::new(1i8)));
        registry.register_type(key, key, Lifetime::Transient, identity_cast());

        assert!(registry.instance(key).is_none());
    }

    #[test]
    fn should_implicitly_register_concrete_type() {
        let key = TypeKey::of::<i8>();
        let provider = create_provider(vec![]);

        let mut registry = Registry::default();
        let mapping = registry
            .lookup_concrete_type(key, &provider, true)
            .unwrap();

        assert_eq!(mapping.concrete, key);
        assert_eq!(mapping.lifetime, Lifetime::Transient);
        assert!(registry.is_registered(key));
    }

    #[test]
    fn should_not_implicitly_register_when_disabled() {
        let key = TypeKey::of::<i8>();
        let provider = create_provider(vec![]);

        let mut registry = Registry::default();

        assert!(matches!(
            registry
                .lookup_concrete_type(key, &provider, false)
                .unwrap_err(),
            ResolutionError::UnregisteredType(_)
        ));
        assert!(!registry.is_registered(key));
    }

    #[test]
    fn should_reject_unregistered_abstract_type() {
        let key = TypeKey::of::<u8>();
        let provider = create_provider(vec![key]);

        let mut registry = Registry::default();

        assert!(matches!(
            registry
                .lookup_concrete_type(key, &provider, true)
                .unwrap_err(),
            ResolutionError::AbstractType(_)
        ));
    }

    #[test]
    fn should_follow_abstract_chain() {
        let top = TypeKey::of::<u8>();
        let middle = TypeKey::of::<u16>();
        let concrete = TypeKey::of::<u32>();
        let provider = create_provider(vec![top, middle]);

        let mut registry = Registry::default();
        registry.register_type(top, middle, Lifetime::Singleton, identity_cast());
        registry.register_type(middle, concrete, Lifetime::Transient, identity_cast());

        let mapping = registry
            .lookup_concrete_type(top, &provider, true)
            .unwrap();

        assert_eq!(mapping.concrete, concrete);
        assert_eq!(mapping.lifetime, Lifetime::Singleton);

        let instance = (mapping.cast)(erase(InstancePtr::new(5u32))).unwrap();
        assert_eq!(*downcast::<u32>(&instance).unwrap(), 5);
    }

    #[test]
    fn should_stop_chain_at_concrete_type() {
        let top = TypeKey::of::<u8>();
        let concrete = TypeKey::of::<u16>();
        let provider = create_provider(vec![top]);

        let mut registry = Registry::default();
        registry.register_type(top, concrete, Lifetime::Transient, identity_cast());
        registry.register_type(
            concrete,
            TypeKey::of::<u32>(),
            Lifetime::Transient,
            identity_cast(),
        );

        let mapping = registry
            .lookup_concrete_type(top, &provider, true)
            .unwrap();

        assert_eq!(mapping.concrete, concrete);
    }

    #[test]
    fn should_detect_abstract_mapping_cycle() {
        let first = TypeKey::of::<u8>();
        let second = TypeKey::of::<u16>();
        let provider = create_provider(vec![first, second]);

        let mut registry = Registry::default();
        registry.register_type(first, second, Lifetime::Transient, identity_cast());
        registry.register_type(second, first, Lifetime::Transient, identity_cast());

        assert!(matches!(
            registry
                .lookup_concrete_type(first, &provider, true)
                .unwrap_err(),
            ResolutionError::CircularDependency { .. }
        ));
    }

    #[test]
    fn should_query_provider_for_abstract_types() {
        let key = TypeKey::of::<i8>();

        let mut provider = MockTypeDescriptorProvider::new();
        provider
            .expect_is_abstract()
            .with(eq(key))
            .times(1)
            .return_const(false);

        let mut registry = Registry::default();
        registry.register_type(key, key, Lifetime::Transient, identity_cast());

        assert_eq!(
            registry
                .lookup_concrete_type(key, &provider, true)
                .unwrap()
                .concrete,
            key
        );
    }
}
