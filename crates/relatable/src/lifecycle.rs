//! Lifecycle Dispatcher - Routes populate/save/destroy to related types
//!
//! Every operation walks the model type's effective registry and visits
//! each declared relationship once. A related type without the matching
//! hook is skipped. Errors from a hook stop the walk and are returned as-is;
//! relationships already visited are not rolled back.

use std::any::Any;

use crate::error::{RelateResult, RelationshipError};
use crate::hooks::Hook;
use crate::metadata::RelationshipDeclaration;
use crate::model::Relatable;
use crate::value::AttributeDump;

pub trait RelationshipLifecycle: Relatable {
    /// Build every relationship from a raw attribute dump
    ///
    /// The populate hook's return value becomes the relationship's value.
    fn populate_relationships(
        &mut self,
        data: &AttributeDump,
        extra: &[&dyn Any],
    ) -> RelateResult<()>;

    /// Notify every related type that the model is being saved
    fn save_relationships(&self, extra: &[&dyn Any]) -> RelateResult<()>;

    /// Notify one relationship's type that the model is being destroyed
    ///
    /// Fails with `RelationshipNotFound` if `name` is not declared. The
    /// stored value is left in place.
    fn destroy_relationship(&self, name: &str, extra: &[&dyn Any]) -> RelateResult<()>;

    /// [`destroy_relationship`](Self::destroy_relationship) for every
    /// declared relationship
    fn destroy_relationships(&self, extra: &[&dyn Any]) -> RelateResult<()>;
}

impl<M: Relatable> RelationshipLifecycle for M {
    fn populate_relationships(
        &mut self,
        data: &AttributeDump,
        extra: &[&dyn Any],
    ) -> RelateResult<()> {
        let registry = self.registry();

        for declaration in registry.all_declarations() {
            let Some(hook) = declaration.related().as_populate() else {
                skipped(registry.model_name(), declaration, Hook::Populate);
                continue;
            };

            dispatched(registry.model_name(), declaration, Hook::Populate);
            let value = hook.populate_relationship(&*self, data, extra)?;
            self.relationship_store_mut().insert(declaration.name(), value);
        }

        Ok(())
    }

    fn save_relationships(&self, extra: &[&dyn Any]) -> RelateResult<()> {
        let registry = self.registry();

        for declaration in registry.all_declarations() {
            let Some(hook) = declaration.related().as_save() else {
                skipped(registry.model_name(), declaration, Hook::Save);
                continue;
            };

            dispatched(registry.model_name(), declaration, Hook::Save);
            let value = self.relationship_store().get(declaration.name());
            hook.save_relationship(self, value, extra)?;
        }

        Ok(())
    }

    fn destroy_relationship(&self, name: &str, extra: &[&dyn Any]) -> RelateResult<()> {
        let registry = self.registry();
        let declaration = registry
            .get(name)
            .ok_or_else(|| RelationshipError::not_found(registry.model_name(), name))?;

        destroy_one(self, declaration, extra)
    }

    fn destroy_relationships(&self, extra: &[&dyn Any]) -> RelateResult<()> {
        for declaration in self.registry().all_declarations() {
            destroy_one(self, declaration, extra)?;
        }
        Ok(())
    }
}

fn destroy_one<M: Relatable>(
    model: &M,
    declaration: &RelationshipDeclaration,
    extra: &[&dyn Any],
) -> RelateResult<()> {
    let model_name = model.registry().model_name();

    let Some(hook) = declaration.related().as_destroy() else {
        skipped(model_name, declaration, Hook::Destroy);
        return Ok(());
    };

    dispatched(model_name, declaration, Hook::Destroy);
    let value = model.relationship_store().get(declaration.name());
    hook.destroy_relationship(model, value, extra)
}

fn dispatched(model: &str, declaration: &RelationshipDeclaration, hook: Hook) {
    tracing::debug!(
        model,
        relationship = declaration.name(),
        related = declaration.related_type_name(),
        hook = hook.as_str(),
        "dispatching relationship hook"
    );
}

fn skipped(model: &str, declaration: &RelationshipDeclaration, hook: Hook) {
    tracing::trace!(
        model,
        relationship = declaration.name(),
        hook = hook.as_str(),
        "related type has no hook, skipping"
    );
}
