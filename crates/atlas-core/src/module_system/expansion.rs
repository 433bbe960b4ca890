use std::any::Any;
use std::fmt;

use crate::module_system::error::ModuleSystemError;
use crate::module_system::instance::ModuleHandle;

/// Identifies an expansion capability type.
///
/// Expansion matching has no access to a runtime type hierarchy, so each
/// expansion declares its lineage of type ids explicitly and loaders accept
/// one id. Two ids are the same capability iff their tokens are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpansionTypeId(String);

impl ExpansionTypeId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpansionTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExpansionTypeId {
    fn from(id: &str) -> Self {
        ExpansionTypeId::new(id)
    }
}

/// A typed extension object contributed by a module.
pub trait Expansion: Send + Sync {
    /// The expansion's type ids, concrete type first, followed by every
    /// supertype/capability-superset it can be adopted as.
    fn type_lineage(&self) -> Vec<ExpansionTypeId>;

    /// Downcast support so an adopting loader can reach the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A loader accepting type `accepted` is eligible for an expansion whose
/// lineage contains that id, i.e. the accepted type is the expansion's
/// concrete type or one of its declared supertypes.
pub fn is_assignable(expansion: &dyn Expansion, accepted: &ExpansionTypeId) -> bool {
    expansion.type_lineage().iter().any(|t| t == accepted)
}

/// A named capability, registered on behalf of one module, that adopts
/// expansions of a matching type contributed by any module.
///
/// Multiple loaders may match one expansion and all matches are invoked;
/// there is no ordering guarantee among them.
pub trait ExpansionLoader: Send + Sync {
    /// Display name used in diagnostics.
    fn name(&self) -> &str;

    /// The single expansion type this loader adopts.
    fn accepts(&self) -> ExpansionTypeId;

    /// Adopt an expansion while its owning module is being enabled. A
    /// failure here fails the owning module's whole enable step.
    fn enable(
        &self,
        instance: &ModuleHandle,
        expansion: &dyn Expansion,
    ) -> Result<(), ModuleSystemError>;

    /// Re-adopt an expansion after its owning module reloads. Best-effort.
    fn reload(&self, _instance: &ModuleHandle, _expansion: &dyn Expansion) {}

    /// Release an expansion while its owning module shuts down. Invoked
    /// unconditionally, whether or not the earlier enable succeeded.
    fn unload(&self, instance: &ModuleHandle, expansion: &dyn Expansion);
}
