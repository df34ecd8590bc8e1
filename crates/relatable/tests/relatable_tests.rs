use std::any::Any;
use std::cell::RefCell;

use vbox_relatable::prelude::*;
use vbox_relatable::{
    relationship_accessors, AttributeDump, DestroyRelationship, PopulateRelationship,
    RegistryCell, RelateResult, RelatedType, RelationValue, RelationshipError,
    RelationshipRegistry, RelationshipStore, SaveRelationship, SetRelationship,
};

/// One observed hook invocation
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Populate {
        related: &'static str,
        caller: usize,
        attributes: usize,
        extra: Vec<String>,
    },
    Save {
        related: &'static str,
        caller: usize,
        value: Option<String>,
        extra: Vec<String>,
    },
    Destroy {
        related: &'static str,
        caller: usize,
        value: Option<String>,
        extra: Vec<String>,
    },
    Set {
        caller: usize,
        old: Option<String>,
        new: Option<String>,
    },
}

thread_local! {
    static CALLS: RefCell<Vec<Call>> = RefCell::new(Vec::new());
    static FAIL_DESTROY: RefCell<bool> = RefCell::new(false);
}

fn record(call: Call) {
    CALLS.with(|calls| calls.borrow_mut().push(call));
}

fn calls() -> Vec<Call> {
    CALLS.with(|calls| calls.borrow().clone())
}

fn clear_calls() {
    CALLS.with(|calls| calls.borrow_mut().clear());
}

fn address(caller: &dyn Relatable) -> usize {
    caller as *const dyn Relatable as *const () as usize
}

fn address_of<T>(model: &T) -> usize {
    model as *const T as *const () as usize
}

fn text(value: &RelationValue) -> Option<String> {
    value.downcast_ref::<String>().cloned().or_else(|| {
        value.downcast_ref::<&str>().map(|s| s.to_string())
    })
}

fn extra_text(extra: &[&dyn Any]) -> Vec<String> {
    extra
        .iter()
        .map(|arg| {
            arg.downcast_ref::<&str>()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "<opaque>".to_string())
        })
        .collect()
}

/// Populates to "FOO"; saves and destroys are recorded; cannot be set
struct Relatee;

impl RelatedType for Relatee {
    fn as_populate(&self) -> Option<&dyn PopulateRelationship> {
        Some(self)
    }

    fn as_save(&self) -> Option<&dyn SaveRelationship> {
        Some(self)
    }

    fn as_destroy(&self) -> Option<&dyn DestroyRelationship> {
        Some(self)
    }
}

impl PopulateRelationship for Relatee {
    fn populate_relationship(
        &self,
        caller: &dyn Relatable,
        data: &AttributeDump,
        extra: &[&dyn Any],
    ) -> RelateResult<RelationValue> {
        record(Call::Populate {
            related: "Relatee",
            caller: address(caller),
            attributes: data.len(),
            extra: extra_text(extra),
        });
        Ok(RelationValue::new("FOO"))
    }
}

impl SaveRelationship for Relatee {
    fn save_relationship(
        &self,
        caller: &dyn Relatable,
        value: &RelationValue,
        extra: &[&dyn Any],
    ) -> RelateResult<()> {
        record(Call::Save {
            related: "Relatee",
            caller: address(caller),
            value: text(value),
            extra: extra_text(extra),
        });
        Ok(())
    }
}

impl DestroyRelationship for Relatee {
    fn destroy_relationship(
        &self,
        caller: &dyn Relatable,
        value: &RelationValue,
        extra: &[&dyn Any],
    ) -> RelateResult<()> {
        record(Call::Destroy {
            related: "Relatee",
            caller: address(caller),
            value: text(value),
            extra: extra_text(extra),
        });
        if FAIL_DESTROY.with(|fail| *fail.borrow()) {
            return Err(anyhow::anyhow!("medium is locked").into());
        }
        Ok(())
    }
}

/// Only settable; the stored value is the upper-cased input
struct BarRelatee;

impl RelatedType for BarRelatee {
    fn as_set(&self) -> Option<&dyn SetRelationship> {
        Some(self)
    }
}

impl SetRelationship for BarRelatee {
    fn set_relationship(
        &self,
        caller: &dyn Relatable,
        old_value: &RelationValue,
        new_value: RelationValue,
    ) -> RelateResult<RelationValue> {
        let new = text(&new_value);
        record(Call::Set {
            caller: address(caller),
            old: text(old_value),
            new: new.clone(),
        });
        Ok(RelationValue::new(new.unwrap_or_default().to_uppercase()))
    }
}

/// Records destroys under its own name; nothing else
struct BazRelatee;

impl RelatedType for BazRelatee {
    fn as_destroy(&self) -> Option<&dyn DestroyRelationship> {
        Some(self)
    }
}

impl DestroyRelationship for BazRelatee {
    fn destroy_relationship(
        &self,
        caller: &dyn Relatable,
        value: &RelationValue,
        extra: &[&dyn Any],
    ) -> RelateResult<()> {
        record(Call::Destroy {
            related: "BazRelatee",
            caller: address(caller),
            value: text(value),
            extra: extra_text(extra),
        });
        Ok(())
    }
}

#[derive(Default)]
struct RelatableModel {
    relationships: RelationshipStore,
}

impl RelatableModel {
    fn relationships() -> &'static RelationshipRegistry {
        static REGISTRY: RegistryCell = RegistryCell::new();
        REGISTRY.get_or_init(|| {
            RelationshipRegistry::builder("RelatableModel")
                .relationship("foos", Relatee)
                .relationship("bars", BarRelatee)
                .build()
        })
    }
}

impl Relatable for RelatableModel {
    fn registry(&self) -> &'static RelationshipRegistry {
        Self::relationships()
    }

    fn relationship_store(&self) -> &RelationshipStore {
        &self.relationships
    }

    fn relationship_store_mut(&mut self) -> &mut RelationshipStore {
        &mut self.relationships
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

relationship_accessors!(RelatableModel {
    foos => set_foos,
    bars => set_bars,
});

#[derive(Default)]
struct SubRelatableModel {
    relationships: RelationshipStore,
}

impl SubRelatableModel {
    fn relationships() -> &'static RelationshipRegistry {
        static REGISTRY: RegistryCell = RegistryCell::new();
        REGISTRY.get_or_init(|| {
            RelationshipRegistry::builder("SubRelatableModel")
                .inherit(RelatableModel::relationships())
                .relationship("bars", Relatee)
                .relationship("bazs", BazRelatee)
                .build()
        })
    }
}

impl Relatable for SubRelatableModel {
    fn registry(&self) -> &'static RelationshipRegistry {
        Self::relationships()
    }

    fn relationship_store(&self) -> &RelationshipStore {
        &self.relationships
    }

    fn relationship_store_mut(&mut self) -> &mut RelationshipStore {
        &mut self.relationships
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

relationship_accessors!(SubRelatableModel {
    foos => set_foos,
    bars => set_bars,
    bazs => set_bazs,
});

/// Lists an accessor for a name its registry never declares
#[derive(Default)]
struct UndeclaredModel {
    relationships: RelationshipStore,
}

impl Relatable for UndeclaredModel {
    fn registry(&self) -> &'static RelationshipRegistry {
        static REGISTRY: RegistryCell = RegistryCell::new();
        REGISTRY.get_or_init(|| RelationshipRegistry::builder("UndeclaredModel").build())
    }

    fn relationship_store(&self) -> &RelationshipStore {
        &self.relationships
    }

    fn relationship_store_mut(&mut self) -> &mut RelationshipStore {
        &mut self.relationships
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

relationship_accessors!(UndeclaredModel {
    ghosts => set_ghosts,
});

mod setting {
    use super::*;

    #[test]
    fn test_non_settable_relationship_is_rejected() {
        let mut model = RelatableModel::default();

        let error = model.set_foos(RelationValue::new("FOOS!")).unwrap_err();

        assert!(matches!(
            error,
            RelationshipError::NonSettableRelationship { ref relationship, .. } if relationship == "foos"
        ));
        assert!(model.foos().is_empty());
    }

    #[test]
    fn test_rejected_write_keeps_populated_value() {
        let mut model = RelatableModel::default();
        model.populate_relationships(&AttributeDump::new(), &[]).unwrap();

        assert!(model.set_foos(RelationValue::new("x")).is_err());
        assert_eq!(text(model.foos()), Some("FOO".to_string()));
    }

    #[test]
    fn test_set_hook_receives_caller_and_values() {
        clear_calls();
        let mut model = RelatableModel::default();

        model.set_bars(RelationValue::new("first")).unwrap();
        model.set_bars(RelationValue::new("bars")).unwrap();

        let caller = address_of(&model);
        assert_eq!(
            calls(),
            vec![
                Call::Set {
                    caller,
                    old: None,
                    new: Some("first".to_string()),
                },
                Call::Set {
                    caller,
                    old: Some("FIRST".to_string()),
                    new: Some("bars".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_set_stores_hook_result() {
        let mut model = RelatableModel::default();

        let stored = model.set_bars(RelationValue::new("zoo")).unwrap();

        assert_eq!(text(&stored), Some("ZOO".to_string()));
        assert_eq!(text(model.bars()), Some("ZOO".to_string()));
        assert!(stored.ptr_eq(model.bars()));
    }

    #[test]
    fn test_named_writer_checks_declaration() {
        let mut model = RelatableModel::default();

        let error = model
            .set_relationship("bazs", RelationValue::new("x"))
            .unwrap_err();

        assert!(error.is_not_found());
    }
}

mod subtypes {
    use super::*;

    #[test]
    fn test_inherits_relationships_of_parent() {
        let registry = SubRelatableModel::relationships();
        assert!(registry.has_declaration("foos"));
        assert!(registry.has_declaration("bars"));
        assert!(registry.has_declaration("bazs"));
    }

    #[test]
    fn test_inherits_options_of_relationships() {
        let registry = SubRelatableModel::relationships();
        assert!(registry.get("foos").unwrap().is_related_to::<Relatee>());
        assert_eq!(
            registry.get("foos").unwrap().related_type_id(),
            RelatableModel::relationships()
                .get("foos")
                .unwrap()
                .related_type_id()
        );
    }

    #[test]
    fn test_override_replaces_only_that_entry() {
        let registry = SubRelatableModel::relationships();
        assert!(registry.get("bars").unwrap().is_related_to::<Relatee>());
        assert!(RelatableModel::relationships()
            .get("bars")
            .unwrap()
            .is_related_to::<BarRelatee>());
        assert!(!RelatableModel::relationships().has_declaration("bazs"));
    }

    #[test]
    fn test_overridden_relationship_uses_new_hooks() {
        let mut model = SubRelatableModel::default();

        model.populate_relationships(&AttributeDump::new(), &[]).unwrap();

        assert_eq!(text(model.foos()), Some("FOO".to_string()));
        assert_eq!(text(model.bars()), Some("FOO".to_string()));
        assert!(model.bazs().is_empty());
        assert!(model.set_bars(RelationValue::new("x")).unwrap_err().is_non_settable());
    }
}

mod default_callbacks {
    use super::*;

    #[test]
    fn test_missing_populate_hook_is_not_an_error() {
        assert!(!BarRelatee.supports(vbox_relatable::Hook::Populate));
        let mut model = RelatableModel::default();
        assert!(model.populate_relationships(&AttributeDump::new(), &[]).is_ok());
        assert!(model.bars().is_empty());
    }

    #[test]
    fn test_missing_save_hook_is_not_an_error() {
        assert!(!BarRelatee.supports(vbox_relatable::Hook::Save));
        let model = RelatableModel::default();
        assert!(model.save_relationships(&[]).is_ok());
    }

    #[test]
    fn test_missing_destroy_hook_is_not_an_error() {
        assert!(!BarRelatee.supports(vbox_relatable::Hook::Destroy));
        let model = RelatableModel::default();
        assert!(model.destroy_relationships(&[]).is_ok());
        assert!(model.destroy_relationship("bars", &[]).is_ok());
    }
}

mod destroying {
    use super::*;

    fn populated_model() -> SubRelatableModel {
        let mut model = SubRelatableModel::default();
        model.populate_relationships(&AttributeDump::new(), &[]).unwrap();
        clear_calls();
        model
    }

    #[test]
    fn test_destroys_only_the_given_relationship() {
        let model = populated_model();

        model.destroy_relationship("bazs", &[]).unwrap();

        let calls = calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            calls[0],
            Call::Destroy { related: "BazRelatee", .. }
        ));
    }

    #[test]
    fn test_forwards_extra_arguments() {
        let model = populated_model();

        model.destroy_relationship("foos", &[&"HELLO"]).unwrap();

        assert_eq!(
            calls(),
            vec![Call::Destroy {
                related: "Relatee",
                caller: address_of(&model),
                value: Some("FOO".to_string()),
                extra: vec!["HELLO".to_string()],
            }]
        );
    }

    #[test]
    fn test_unknown_relationship_is_not_found() {
        let model = populated_model();

        let error = model.destroy_relationship("missing_name", &[]).unwrap_err();

        assert!(matches!(
            error,
            RelationshipError::RelationshipNotFound { ref relationship, .. } if relationship == "missing_name"
        ));
        assert!(calls().is_empty());
    }

    #[test]
    fn test_destroy_does_not_clear_value() {
        let model = populated_model();

        model.destroy_relationships(&[]).unwrap();

        assert_eq!(text(model.foos()), Some("FOO".to_string()));
    }

    #[test]
    fn test_destroys_all_relationships_with_arguments() {
        let model = populated_model();

        model.destroy_relationships(&[&"HELLO"]).unwrap();

        let mut related: Vec<&str> = calls()
            .into_iter()
            .map(|call| match call {
                Call::Destroy { related, extra, .. } => {
                    assert_eq!(extra, vec!["HELLO".to_string()]);
                    related
                }
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        related.sort();

        // foos and bars both point at Relatee on the subtype
        assert_eq!(related, vec!["BazRelatee", "Relatee", "Relatee"]);
    }

    #[test]
    fn test_hook_error_stops_and_propagates() {
        let model = populated_model();
        FAIL_DESTROY.with(|fail| *fail.borrow_mut() = true);

        let result = model.destroy_relationship("foos", &[]);
        FAIL_DESTROY.with(|fail| *fail.borrow_mut() = false);

        let error = result.unwrap_err();
        assert!(matches!(error, RelationshipError::Hook(_)));
        assert_eq!(error.to_string(), "medium is locked");
    }
}

mod saving {
    use super::*;

    #[test]
    fn test_save_passes_current_value() {
        clear_calls();
        let model = RelatableModel::default();

        model.save_relationships(&[]).unwrap();

        assert_eq!(
            calls(),
            vec![Call::Save {
                related: "Relatee",
                caller: address_of(&model),
                value: None,
                extra: vec![],
            }]
        );
    }

    #[test]
    fn test_save_forwards_parameters() {
        let mut model = RelatableModel::default();
        model.populate_relationships(&AttributeDump::new(), &[]).unwrap();
        clear_calls();

        model.save_relationships(&[&"YES"]).unwrap();

        assert_eq!(
            calls(),
            vec![Call::Save {
                related: "Relatee",
                caller: address_of(&model),
                value: Some("FOO".to_string()),
                extra: vec!["YES".to_string()],
            }]
        );
    }

    #[test]
    fn test_save_does_not_store_anything() {
        let model = RelatableModel::default();
        model.save_relationships(&[]).unwrap();
        assert!(model.foos().is_empty());
    }
}

mod reading {
    use super::*;

    #[test]
    fn test_fresh_instance_reads_empty() {
        let model = RelatableModel::default();
        for name in RelatableModel::relationships().names() {
            assert!(model.relationship(name).unwrap().is_empty());
        }
        assert!(model.foos().is_empty());
    }

    #[test]
    fn test_named_reader_rejects_unknown_names() {
        let model = RelatableModel::default();
        assert!(model.relationship("bazs").unwrap_err().is_not_found());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "relationship `ghosts` is not declared")]
    fn test_generated_reader_asserts_declaration() {
        let model = UndeclaredModel::default();
        let _ = model.ghosts();
    }

    #[test]
    fn test_generated_writer_rejects_undeclared_name() {
        let mut model = UndeclaredModel::default();
        let error = model.set_ghosts(RelationValue::new("boo")).unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_has_relationship() {
        let model = RelatableModel::default();
        assert!(model.has_relationship("foos"));
        assert!(!model.has_relationship("bazs"));

        let sub = SubRelatableModel::default();
        assert!(sub.has_relationship("foos"));
        assert!(sub.has_relationship("bazs"));
    }

    #[test]
    fn test_instances_are_independent() {
        let mut first = RelatableModel::default();
        let second = RelatableModel::default();

        first.set_bars(RelationValue::new("mine")).unwrap();

        assert_eq!(text(first.bars()), Some("MINE".to_string()));
        assert!(second.bars().is_empty());
    }
}

mod populating {
    use super::*;

    #[test]
    fn test_populate_calls_hook_once_with_data() {
        clear_calls();
        let mut model = RelatableModel::default();
        let dump: AttributeDump = [("name", "ubuntu"), ("memory", "1024")]
            .into_iter()
            .collect();

        model.populate_relationships(&dump, &[&"extra"]).unwrap();

        assert_eq!(
            calls(),
            vec![Call::Populate {
                related: "Relatee",
                caller: address_of(&model),
                attributes: 2,
                extra: vec!["extra".to_string()],
            }]
        );
    }

    #[test]
    fn test_populate_stores_returned_value() {
        let mut model = RelatableModel::default();

        model.populate_relationships(&AttributeDump::new(), &[]).unwrap();

        assert_eq!(text(model.foos()), Some("FOO".to_string()));
        assert!(model.bars().is_empty());
    }
}
