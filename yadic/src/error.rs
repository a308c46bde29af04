use crate::instance::ErrorPtr;
use crate::type_key::TypeKey;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Reason for rejecting an injectable member.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum IncorrectMemberReason {
    NoParameters,
    ReturnsValue,
}

impl Display for IncorrectMemberReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IncorrectMemberReason::NoParameters => f.write_str("takes no parameters"),
            IncorrectMemberReason::ReturnsValue => f.write_str("returns a value"),
        }
    }
}

/// Errors related to registering types and resolving instances.
#[derive(Error, Clone, Debug)]
pub enum ResolutionError {
    #[error("Type {0} is abstract and has no concrete mapping.")]
    AbstractType(TypeKey),
    #[error("Given instance for type {0} is absent.")]
    NullInstance(TypeKey),
    #[error("No suitable constructor found for type {0}.")]
    NoSuitableConstructor(TypeKey),
    #[error("Only one constructor of type {0} can be marked as the dependency constructor.")]
    MultipleAnnotatedConstructors(TypeKey),
    #[error("Dependency cycle detected while resolving {key}: {}", .path.iter().join(" -> "))]
    CircularDependency { key: TypeKey, path: Vec<TypeKey> },
    #[error("Missing dependency {dependency} when resolving {dependent}.")]
    MissingDependency {
        dependency: TypeKey,
        dependent: TypeKey,
    },
    #[error("Type {0} is not registered and implicit self-registration is disabled.")]
    UnregisteredType(TypeKey),
    #[error("Dependency member {member} of type {target} {reason}.")]
    IncorrectDependencyMember {
        target: TypeKey,
        member: String,
        reason: IncorrectMemberReason,
    },
    #[error("Error constructing {target}: {source}")]
    ConstructionFailed {
        target: TypeKey,
        #[source]
        source: ErrorPtr,
    },
    #[error("Tried to downcast instance to incompatible type: {0}")]
    IncompatibleInstance(TypeKey),
}
