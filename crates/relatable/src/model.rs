//! Host model trait

use std::any::Any;

use crate::registry::RelationshipRegistry;
use crate::store::RelationshipStore;

/// A model type that declares relationships
///
/// Implementors hand out their type's registry and their own store; the
/// accessor and lifecycle behaviour comes from
/// [`RelationshipAccessors`](crate::RelationshipAccessors) and
/// [`RelationshipLifecycle`](crate::RelationshipLifecycle).
pub trait Relatable: Any {
    /// The effective registry of this instance's type
    fn registry(&self) -> &'static RelationshipRegistry;

    fn relationship_store(&self) -> &RelationshipStore;

    fn relationship_store_mut(&mut self) -> &mut RelationshipStore;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Relatable {
    /// Borrow a hook's caller as its concrete model type
    pub fn downcast_ref<T: Relatable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Relatable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn model_name(&self) -> &'static str {
        self.registry().model_name()
    }
}
