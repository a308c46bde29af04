//! Core resolution algorithm: constructing instances of requested types by recursively resolving
//! constructor parameters.
//!
//! Resolution of a key proceeds as follows:
//!
//! 1. A registered instance or a cached singleton is returned as is.
//! 2. Registrations are followed to a concrete type, while the mapped type is abstract.
//! 3. Constructors of the concrete type are tried in the order established by
//!    [order_constructors](crate::selector::order_constructors). A failing constructor falls back
//!    to the next one, unless it's the explicitly marked one.
//! 4. The instance is built up. A singleton is cached only after its build-up succeeds.
//!
//! Types currently being constructed are tracked on a [ResolutionStack], which is used to detect
//! dependency cycles. A singleton leaves the stack once constructed and is visible only to its
//! own resolution call while being built up, so members can depend on types which depend on the
//! singleton itself. A transient type stays on the stack until its build-up finishes, since every
//! request for it would construct a new instance.

use crate::container::Container;
use crate::descriptor::ConstructorDescriptor;
use crate::error::ResolutionError;
use crate::instance::InstanceAnyPtr;
use crate::registry::{ConcreteMapping, Lifetime};
use crate::selector::order_constructors;
use crate::type_key::TypeKey;
use fxhash::FxHashMap;
use itertools::Itertools;
use tracing::{debug, trace};

/// Ordered set of types under construction, private to a single top-level call. Also holds
/// singletons which are constructed, but still being built up.
#[derive(Clone, Debug, Default)]
pub struct ResolutionStack {
    keys: Vec<TypeKey>,
    pending: FxHashMap<TypeKey, InstanceAnyPtr>,
}

impl ResolutionStack {
    #[inline]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.keys.contains(&key)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Pushes given key, unless it's already being resolved.
    pub fn push(&mut self, key: TypeKey) -> Result<(), ResolutionError> {
        if self.contains(key) {
            return Err(self.cycle(key));
        }

        trace!(%key, depth = self.keys.len(), "Entering resolution.");

        self.keys.push(key);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<TypeKey> {
        let key = self.keys.pop();

        if let Some(key) = key {
            trace!(%key, depth = self.keys.len(), "Leaving resolution.");
        }

        key
    }

    /// Error describing a cycle closed by `key`.
    pub fn cycle(&self, key: TypeKey) -> ResolutionError {
        let path = self
            .keys
            .iter()
            .skip_while(|entry| **entry != key)
            .copied()
            .chain([key])
            .collect();

        ResolutionError::CircularDependency { key, path }
    }

    /// Singleton constructed in this call, whose build-up has not finished yet.
    #[inline]
    pub fn pending(&self, key: TypeKey) -> Option<InstanceAnyPtr> {
        self.pending.get(&key).cloned()
    }

    pub fn add_pending(&mut self, key: TypeKey, instance: InstanceAnyPtr) {
        self.pending.insert(key, instance);
    }

    pub fn remove_pending(&mut self, key: TypeKey) -> Option<InstanceAnyPtr> {
        self.pending.remove(&key)
    }
}

impl Container {
    /// Resolves the payload of a canonical key.
    pub(crate) fn resolve_key(
        &self,
        key: TypeKey,
        stack: &mut ResolutionStack,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        let available = self
            .registry
            .read()
            .instance(key)
            .or_else(|| stack.pending(key));

        if let Some(instance) = available {
            trace!(%key, "Returning existing instance.");
            return Ok(instance);
        }

        stack.push(key)?;

        let constructed = self.create_instance(key, stack);
        let (mapping, concrete_instance, instance) = match constructed {
            Ok(constructed) => constructed,
            Err(error) => {
                stack.pop();
                return Err(error);
            }
        };

        if mapping.lifetime == Lifetime::Transient {
            let result = self.build_up_instance(mapping.concrete, &concrete_instance, stack);
            stack.pop();

            return result.map(|_| instance);
        }

        stack.pop();
        self.build_up_singleton(key, &mapping, &concrete_instance, instance, stack)
    }

    /// Constructs an instance of the concrete type mapped to `key`. Returns the payloads of both
    /// the concrete type and `key`.
    fn create_instance(
        &self,
        key: TypeKey,
        stack: &mut ResolutionStack,
    ) -> Result<(ConcreteMapping, InstanceAnyPtr, InstanceAnyPtr), ResolutionError> {
        let mapping = self.registry.write().lookup_concrete_type(
            key,
            self.descriptors.as_ref(),
            self.config.implicit_self_registration,
        )?;

        let concrete_instance = self.resolve_constructor(mapping.concrete, stack)?;
        let instance = (mapping.cast)(concrete_instance.clone())
            .map_err(|_| ResolutionError::IncompatibleInstance(key))?;

        Ok((mapping, concrete_instance, instance))
    }

    fn build_up_singleton(
        &self,
        key: TypeKey,
        mapping: &ConcreteMapping,
        concrete_instance: &InstanceAnyPtr,
        instance: InstanceAnyPtr,
        stack: &mut ResolutionStack,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        let available = self.registry.read().instance(key);
        if let Some(existing) = available {
            debug!(%key, "Discarding concurrently constructed singleton.");
            return Ok(existing);
        }

        stack.add_pending(key, instance.clone());
        let result = self.build_up_instance(mapping.concrete, concrete_instance, stack);
        stack.remove_pending(key);

        result?;

        Ok(self
            .registry
            .write()
            .store_singleton(key, mapping.generation, instance))
    }

    fn resolve_constructor(
        &self,
        concrete: TypeKey,
        stack: &mut ResolutionStack,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        let constructors = order_constructors(concrete, self.descriptors.constructors(concrete))?;
        let mut last_error = None;

        for constructor in constructors {
            match self.try_constructor(&constructor, stack) {
                Ok(instance) => return Ok(instance),
                Err(error) if constructor.is_explicit => return Err(error),
                Err(error) => {
                    debug!(
                        %concrete,
                        parameters = constructor.parameters.len(),
                        %error,
                        "Constructor failed, trying next one."
                    );

                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or(ResolutionError::NoSuitableConstructor(concrete)))
    }

    fn try_constructor(
        &self,
        constructor: &ConstructorDescriptor,
        stack: &mut ResolutionStack,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        let arguments: Vec<InstanceAnyPtr> = constructor
            .parameters
            .iter()
            .map(|parameter| {
                let canonical = self.descriptors.canonicalize(*parameter);

                if stack.contains(canonical) {
                    return Err(stack.cycle(canonical));
                }

                if !self.registry.read().is_registered(canonical) {
                    return Err(ResolutionError::MissingDependency {
                        dependency: *parameter,
                        dependent: constructor.target,
                    });
                }

                self.resolve_view(*parameter, stack)
            })
            .try_collect()?;

        (constructor.constructor)(&arguments)
    }

    /// Resolves the payload of any key, converting between canonical and alias keys.
    pub(crate) fn resolve_view(
        &self,
        key: TypeKey,
        stack: &mut ResolutionStack,
    ) -> Result<InstanceAnyPtr, ResolutionError> {
        match self.descriptors.equivalence(key) {
            Some(equivalence) => {
                let instance = self.resolve_key(equivalence.canonical, stack)?;
                (equivalence.from_canonical)(instance)
                    .map_err(|_| ResolutionError::IncompatibleInstance(key))
            }
            None => self.resolve_key(key, stack),
        }
    }
}
