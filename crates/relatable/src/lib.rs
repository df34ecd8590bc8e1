//! # vbox-relatable: Declarative relationships for VirtualBox models
//!
//! Configuration models declare named relationships to other model types.
//! Relationships are materialized from a flat attribute dump and the
//! related types take part in the owning model's lifecycle through a small
//! set of optional hooks:
//!
//! - `registry`: per-type declarations, inherited from parent types
//! - `hooks`: the populate/save/destroy/set hook protocol
//! - `store`: per-instance relationship values
//! - `accessor`: readers and guarded writers
//! - `lifecycle`: dispatch of populate/save/destroy to related types

pub mod accessor;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod metadata;
pub mod model;
pub mod registry;
pub mod store;
pub mod value;

pub use accessor::RelationshipAccessors;
pub use error::{RelateResult, RelationshipError};
pub use hooks::{
    DestroyRelationship, Hook, PopulateRelationship, RelatedType, SaveRelationship,
    SetRelationship,
};
pub use lifecycle::RelationshipLifecycle;
pub use metadata::{RelationshipDeclaration, RelationshipOptions};
pub use model::Relatable;
pub use registry::{RegistryBuilder, RegistryCell, RelationshipRegistry};
pub use store::RelationshipStore;
pub use value::{AttributeDump, RelationValue};

/// Traits needed to call accessors and lifecycle operations on a model
pub mod prelude {
    pub use crate::accessor::RelationshipAccessors;
    pub use crate::lifecycle::RelationshipLifecycle;
    pub use crate::model::Relatable;
}
