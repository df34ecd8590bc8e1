//! Relationship Registry - Per-type declaration storage with inheritance
//!
//! A registry is built once per model type through [`RegistryBuilder`] and
//! is read-only afterwards. A registry may inherit from a parent type's
//! registry; the effective set of declarations is merged when the registry
//! is built, with the type's own declarations taking precedence by name.

use std::sync::OnceLock;

use crate::hooks::RelatedType;
use crate::metadata::{RelationshipDeclaration, RelationshipOptions};

/// Immutable relationship declarations for one model type
#[derive(Debug)]
pub struct RelationshipRegistry {
    model: &'static str,
    parent: Option<&'static RelationshipRegistry>,
    own: Vec<RelationshipDeclaration>,
    effective: Vec<RelationshipDeclaration>,
}

impl RelationshipRegistry {
    /// Start defining the relationships of `model`
    pub fn builder(model: &'static str) -> RegistryBuilder {
        RegistryBuilder {
            model,
            parent: None,
            own: Vec::new(),
        }
    }

    /// Registry with no declarations and no parent
    pub fn empty(model: &'static str) -> Self {
        Self::builder(model).build()
    }

    pub fn model_name(&self) -> &'static str {
        self.model
    }

    pub fn parent(&self) -> Option<&'static RelationshipRegistry> {
        self.parent
    }

    /// Declarations made directly on this type
    pub fn own_declarations(&self) -> &[RelationshipDeclaration] {
        &self.own
    }

    /// Every declaration visible on this type, ancestors included
    ///
    /// Own declarations come first, followed by inherited ones that were
    /// not re-declared. Each name appears once.
    pub fn all_declarations(&self) -> &[RelationshipDeclaration] {
        &self.effective
    }

    pub fn get(&self, name: &str) -> Option<&RelationshipDeclaration> {
        self.effective.iter().find(|d| d.name() == name)
    }

    pub fn has_declaration(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effective.iter().map(RelationshipDeclaration::name)
    }

    pub fn len(&self) -> usize {
        self.effective.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effective.is_empty()
    }

    /// Returns true if `ancestor` is this registry or one of its parents
    pub fn inherits_from(&self, ancestor: &RelationshipRegistry) -> bool {
        let mut current = Some(self);
        while let Some(registry) = current {
            if std::ptr::eq(registry, ancestor) {
                return true;
            }
            current = registry.parent;
        }
        false
    }
}

/// Collects declarations for a model type
#[derive(Debug)]
pub struct RegistryBuilder {
    model: &'static str,
    parent: Option<&'static RelationshipRegistry>,
    own: Vec<RelationshipDeclaration>,
}

impl RegistryBuilder {
    /// Inherit every declaration of a parent type
    pub fn inherit(mut self, parent: &'static RelationshipRegistry) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declare a relationship without options
    pub fn relationship<T: RelatedType>(self, name: &str, related: T) -> Self {
        self.declare(name, related, RelationshipOptions::new())
    }

    /// Declare a relationship, replacing an earlier declaration of the same
    /// name on this type
    pub fn declare<T: RelatedType>(
        mut self,
        name: &str,
        related: T,
        options: RelationshipOptions,
    ) -> Self {
        let declaration = RelationshipDeclaration::new(self.model, name, related, options);

        match self.own.iter_mut().find(|d| d.name() == name) {
            Some(existing) => {
                tracing::trace!(
                    model = self.model,
                    relationship = name,
                    "relationship re-declared"
                );
                *existing = declaration;
            }
            None => self.own.push(declaration),
        }
        self
    }

    pub fn build(self) -> RelationshipRegistry {
        let mut effective = self.own.clone();

        if let Some(parent) = self.parent {
            for inherited in parent.all_declarations() {
                if !self.own.iter().any(|d| d.name() == inherited.name()) {
                    effective.push(inherited.clone());
                }
            }
        }

        tracing::debug!(
            model = self.model,
            parent = self.parent.map(RelationshipRegistry::model_name),
            relationships = effective.len(),
            "relationship registry built"
        );

        RelationshipRegistry {
            model: self.model,
            parent: self.parent,
            own: self.own,
            effective,
        }
    }
}

/// Lazily-built registry slot for a model type's `static`
///
/// ```ignore
/// static REGISTRY: RegistryCell = RegistryCell::new();
/// REGISTRY.get_or_init(|| RelationshipRegistry::builder("Vm").build())
/// ```
#[derive(Debug, Default)]
pub struct RegistryCell(OnceLock<RelationshipRegistry>);

impl RegistryCell {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    pub fn get_or_init<F>(&'static self, init: F) -> &'static RelationshipRegistry
    where
        F: FnOnce() -> RelationshipRegistry,
    {
        self.0.get_or_init(init)
    }
}
