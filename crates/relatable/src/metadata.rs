//! Relationship declarations

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::hooks::{Hook, RelatedType};

/// Free-form options attached to a declaration
pub type RelationshipOptions = Map<String, Value>;

/// A single named relationship from a model type to a related type
#[derive(Clone)]
pub struct RelationshipDeclaration {
    name: String,
    related: Arc<dyn RelatedType>,
    related_type_id: TypeId,
    related_type_name: &'static str,
    options: RelationshipOptions,
    declared_on: &'static str,
}

impl RelationshipDeclaration {
    pub fn new<T: RelatedType>(
        declared_on: &'static str,
        name: impl Into<String>,
        related: T,
        options: RelationshipOptions,
    ) -> Self {
        Self {
            name: name.into(),
            related: Arc::new(related),
            related_type_id: TypeId::of::<T>(),
            related_type_name: type_name::<T>(),
            options,
            declared_on,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The related type's hook object
    pub fn related(&self) -> &dyn RelatedType {
        self.related.as_ref()
    }

    pub fn related_type_id(&self) -> TypeId {
        self.related_type_id
    }

    pub fn related_type_name(&self) -> &'static str {
        self.related_type_name
    }

    /// Returns true if the related type is `T`
    pub fn is_related_to<T: RelatedType>(&self) -> bool {
        self.related_type_id == TypeId::of::<T>()
    }

    pub fn options(&self) -> &RelationshipOptions {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Name of the model type whose registry holds this declaration
    pub fn declared_on(&self) -> &'static str {
        self.declared_on
    }

    pub fn supports(&self, hook: Hook) -> bool {
        self.related.supports(hook)
    }
}

impl fmt::Debug for RelationshipDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipDeclaration")
            .field("name", &self.name)
            .field("related", &self.related_type_name)
            .field("options", &self.options)
            .field("declared_on", &self.declared_on)
            .field("hooks", &self.related.supported_hooks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Disk;
    impl RelatedType for Disk {}

    struct Nic;
    impl RelatedType for Nic {}

    #[test]
    fn test_declaration_records_related_type() {
        let declaration =
            RelationshipDeclaration::new("VirtualMachine", "disks", Disk, RelationshipOptions::new());

        assert_eq!(declaration.name(), "disks");
        assert_eq!(declaration.declared_on(), "VirtualMachine");
        assert!(declaration.is_related_to::<Disk>());
        assert!(!declaration.is_related_to::<Nic>());
        assert!(declaration.related_type_name().ends_with("Disk"));
        assert!(!declaration.supports(Hook::Populate));
    }

    #[test]
    fn test_declaration_options() {
        let mut options = RelationshipOptions::new();
        options.insert("dependent".to_string(), json!("destroy"));

        let declaration = RelationshipDeclaration::new("VirtualMachine", "nics", Nic, options);

        assert_eq!(declaration.option("dependent"), Some(&json!("destroy")));
        assert!(declaration.option("missing").is_none());
        assert!(format!("{:?}", declaration).contains("nics"));
    }
}
