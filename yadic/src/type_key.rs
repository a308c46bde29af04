//! Identity of types known to the [Container](crate::container::Container).

use derivative::Derivative;
use std::any::{type_name, TypeId};
use std::fmt::{Display, Formatter};

/// Canonical, comparable identifier of a type. Two keys are equal iff they refer to the same
/// [TypeId] - the name is only carried for diagnostics.
#[derive(Derivative, Clone, Copy)]
#[derivative(Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    name: &'static str,
}

impl TypeKey {
    /// Returns the key for given type. Works for both sized types and `dyn Trait` views.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use crate::type_key::TypeKey;
    use fxhash::FxHashSet;

    trait TestTrait {}

    #[test]
    fn should_compare_by_type() {
        assert_eq!(TypeKey::of::<i8>(), TypeKey::of::<i8>());
        assert_ne!(TypeKey::of::<i8>(), TypeKey::of::<u8>());
        assert_ne!(
            TypeKey::of::<dyn TestTrait>(),
            TypeKey::of::<dyn TestTrait + Send + Sync>()
        );
    }

    #[test]
    fn should_hash_by_type() {
        let keys: FxHashSet<_> = [TypeKey::of::<i8>(), TypeKey::of::<i8>(), TypeKey::of::<u8>()]
            .into_iter()
            .collect();

        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn should_display_type_name() {
        assert_eq!(TypeKey::of::<String>().to_string(), "alloc::string::String");
    }
}
