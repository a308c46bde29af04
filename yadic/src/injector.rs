//! Build-up: injecting dependencies into existing instances through their injectable members.

use crate::container::Container;
use crate::descriptor::MemberDescriptor;
use crate::error::{IncorrectMemberReason, ResolutionError};
use crate::instance::InstanceAnyPtr;
use crate::resolver::ResolutionStack;
use crate::type_key::TypeKey;
use itertools::Itertools;
use tracing::debug;

fn validate_member(member: &MemberDescriptor) -> Result<(), ResolutionError> {
    let reason = if member.parameters.is_empty() {
        IncorrectMemberReason::NoParameters
    } else if member.returns_value {
        IncorrectMemberReason::ReturnsValue
    } else {
        return Ok(());
    };

    Err(ResolutionError::IncorrectDependencyMember {
        target: member.target,
        member: member.name.clone(),
        reason,
    })
}

impl Container {
    /// Invokes injectable members of `concrete` on given payload. All members are validated before
    /// any of them is invoked.
    pub(crate) fn build_up_instance(
        &self,
        concrete: TypeKey,
        instance: &InstanceAnyPtr,
        stack: &mut ResolutionStack,
    ) -> Result<(), ResolutionError> {
        let members = self.descriptors.injectable_members(concrete);
        if members.is_empty() {
            return Ok(());
        }

        members.iter().try_for_each(validate_member)?;

        for member in &members {
            debug!(%concrete, member = %member.name, "Injecting member.");

            let arguments: Vec<InstanceAnyPtr> = member
                .parameters
                .iter()
                .map(|parameter| self.resolve_view(*parameter, stack))
                .try_collect()?;

            (member.invoke)(instance, &arguments)?;
        }

        Ok(())
    }
}
