//! Relationship readers and guarded writers

use crate::error::{RelateResult, RelationshipError};
use crate::model::Relatable;
use crate::value::RelationValue;

/// Name-keyed reader and writer for every declared relationship
pub trait RelationshipAccessors: Relatable {
    /// Returns true if the relationship is declared on this type or an ancestor
    fn has_relationship(&self, name: &str) -> bool;

    /// Current value of a declared relationship; empty if never set
    fn relationship(&self, name: &str) -> RelateResult<&RelationValue>;

    /// Assign through the related type's `set` hook
    ///
    /// The hook receives the old and new values and its return value is
    /// stored and returned. Without a `set` hook this fails with
    /// `NonSettableRelationship` and the stored value is left alone.
    fn set_relationship(&mut self, name: &str, value: RelationValue)
        -> RelateResult<RelationValue>;
}

impl<M: Relatable> RelationshipAccessors for M {
    fn has_relationship(&self, name: &str) -> bool {
        self.registry().has_declaration(name)
    }

    fn relationship(&self, name: &str) -> RelateResult<&RelationValue> {
        let registry = self.registry();
        if !registry.has_declaration(name) {
            return Err(RelationshipError::not_found(registry.model_name(), name));
        }
        Ok(self.relationship_store().get(name))
    }

    fn set_relationship(
        &mut self,
        name: &str,
        value: RelationValue,
    ) -> RelateResult<RelationValue> {
        let registry = self.registry();
        let declaration = registry
            .get(name)
            .ok_or_else(|| RelationshipError::not_found(registry.model_name(), name))?;

        let Some(hook) = declaration.related().as_set() else {
            tracing::debug!(
                model = registry.model_name(),
                relationship = name,
                "relationship has no set hook"
            );
            return Err(RelationshipError::non_settable(registry.model_name(), name));
        };

        let old_value = self.relationship_store().get(name).clone();
        let stored = hook.set_relationship(&*self, &old_value, value)?;
        self.relationship_store_mut().insert(name, stored.clone());

        tracing::debug!(
            model = registry.model_name(),
            relationship = name,
            hook = "set",
            "relationship set"
        );

        Ok(stored)
    }
}

/// Generate typed reader/writer methods for declared relationships
///
/// ```ignore
/// relationship_accessors!(StorageController {
///     devices => set_devices,
/// });
/// ```
///
/// Readers return the stored value (empty when unset) and debug-assert that
/// the name is declared; writers go through
/// [`RelationshipAccessors::set_relationship`].
#[macro_export]
macro_rules! relationship_accessors {
    ($model:ty { $($name:ident => $setter:ident),* $(,)? }) => {
        impl $model {
            $(
                pub fn $name(&self) -> &$crate::RelationValue {
                    debug_assert!(
                        $crate::Relatable::registry(self).has_declaration(stringify!($name)),
                        concat!("relationship `", stringify!($name), "` is not declared"),
                    );
                    $crate::Relatable::relationship_store(self).get(stringify!($name))
                }

                pub fn $setter(
                    &mut self,
                    value: $crate::RelationValue,
                ) -> $crate::RelateResult<$crate::RelationValue> {
                    $crate::RelationshipAccessors::set_relationship(self, stringify!($name), value)
                }
            )*
        }
    };
}
