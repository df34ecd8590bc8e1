//! Hook protocol - Lifecycle callbacks a related type may implement
//!
//! Every related type implements [`RelatedType`]. Each lifecycle hook lives
//! in its own trait, and a related type advertises the hooks it supports
//! through the `as_*` capability accessors, which default to `None`. The
//! dispatcher only ever asks for a capability; a missing hook is not an
//! error except for `set`, which the writer requires.

use std::any::Any;
use std::fmt;

use crate::error::RelateResult;
use crate::model::Relatable;
use crate::value::{AttributeDump, RelationValue};

/// The fixed set of lifecycle hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Populate,
    Save,
    Destroy,
    Set,
}

impl Hook {
    pub const ALL: [Hook; 4] = [Hook::Populate, Hook::Save, Hook::Destroy, Hook::Set];

    pub fn as_str(self) -> &'static str {
        match self {
            Hook::Populate => "populate",
            Hook::Save => "save",
            Hook::Destroy => "destroy",
            Hook::Set => "set",
        }
    }

    /// Returns true if dispatching this hook treats a missing
    /// implementation as a failure
    pub fn is_required(self) -> bool {
        matches!(self, Hook::Set)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type that can be the target of a relationship
pub trait RelatedType: Any + Send + Sync {
    fn as_populate(&self) -> Option<&dyn PopulateRelationship> {
        None
    }

    fn as_save(&self) -> Option<&dyn SaveRelationship> {
        None
    }

    fn as_destroy(&self) -> Option<&dyn DestroyRelationship> {
        None
    }

    fn as_set(&self) -> Option<&dyn SetRelationship> {
        None
    }

    /// Capability probe; never fails
    fn supports(&self, hook: Hook) -> bool {
        match hook {
            Hook::Populate => self.as_populate().is_some(),
            Hook::Save => self.as_save().is_some(),
            Hook::Destroy => self.as_destroy().is_some(),
            Hook::Set => self.as_set().is_some(),
        }
    }

    /// All hooks this type supports, in `Hook::ALL` order
    fn supported_hooks(&self) -> Vec<Hook> {
        Hook::ALL
            .into_iter()
            .filter(|hook| self.supports(*hook))
            .collect()
    }
}

/// Builds a relationship value from a raw attribute dump
pub trait PopulateRelationship {
    fn populate_relationship(
        &self,
        caller: &dyn Relatable,
        data: &AttributeDump,
        extra: &[&dyn Any],
    ) -> RelateResult<RelationValue>;
}

/// Notified when the owning model saves; the return value is discarded
pub trait SaveRelationship {
    fn save_relationship(
        &self,
        caller: &dyn Relatable,
        value: &RelationValue,
        extra: &[&dyn Any],
    ) -> RelateResult<()>;
}

/// Notified when the owning model destroys the relationship
pub trait DestroyRelationship {
    fn destroy_relationship(
        &self,
        caller: &dyn Relatable,
        value: &RelationValue,
        extra: &[&dyn Any],
    ) -> RelateResult<()>;
}

/// Decides what a relationship holds after a direct assignment
///
/// The returned value, not `new_value`, is what gets stored.
pub trait SetRelationship {
    fn set_relationship(
        &self,
        caller: &dyn Relatable,
        old_value: &RelationValue,
        new_value: RelationValue,
    ) -> RelateResult<RelationValue>;
}
