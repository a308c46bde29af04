//! Ordering of constructor candidates.

use crate::descriptor::ConstructorDescriptor;
use crate::error::ResolutionError;
use crate::type_key::TypeKey;
use itertools::Itertools;
use std::cmp::Reverse;

/// Orders constructors of `target` from the most preferred one: the explicitly marked constructor
/// goes first, followed by the rest sorted by descending parameter count. Ties keep the provider
/// order.
pub fn order_constructors(
    target: TypeKey,
    constructors: Vec<ConstructorDescriptor>,
) -> Result<Vec<ConstructorDescriptor>, ResolutionError> {
    if constructors.is_empty() {
        return Err(ResolutionError::NoSuitableConstructor(target));
    }

    if constructors
        .iter()
        .filter(|constructor| constructor.is_explicit)
        .count()
        > 1
    {
        return Err(ResolutionError::MultipleAnnotatedConstructors(target));
    }

    Ok(constructors
        .into_iter()
        .sorted_by_key(|constructor| {
            (
                !constructor.is_explicit,
                Reverse(constructor.parameters.len()),
            )
        })
        .collect())
}
