//! Storage controllers of a virtual machine

use std::any::Any;

use vbox_relatable::prelude::*;
use vbox_relatable::{
    relationship_accessors, AttributeDump, DestroyRelationship, PopulateRelationship,
    RegistryCell, RelateResult, RelatedType, RelationValue, RelationshipRegistry,
    RelationshipStore, SaveRelationship,
};

use crate::attached_device::{AttachedDevice, AttachedDeviceRelation};
use crate::command::VBoxManage;
use crate::error::{VBoxError, VBoxResult};
use crate::virtual_machine::VirtualMachine;

/// An IDE/SATA/SCSI controller and the devices attached to it
#[derive(Debug, Clone)]
pub struct StorageController {
    index: usize,
    name: String,
    controller_type: Option<String>,
    port_count: Option<u32>,
    vm_name: String,
    vboxmanage: VBoxManage,
    relationships: RelationshipStore,
}

impl StorageController {
    pub fn relationships() -> &'static RelationshipRegistry {
        static REGISTRY: RegistryCell = RegistryCell::new();
        REGISTRY.get_or_init(|| {
            RelationshipRegistry::builder("StorageController")
                .relationship("devices", AttachedDeviceRelation)
                .build()
        })
    }

    /// Controller `index` as described by a machine-readable dump
    ///
    /// Returns `Ok(None)` when the dump has no controller at that index.
    pub fn from_dump(
        index: usize,
        vm_name: &str,
        vboxmanage: &VBoxManage,
        data: &AttributeDump,
    ) -> VBoxResult<Option<Self>> {
        let Some(name) = data.get(&format!("storagecontrollername{}", index)) else {
            return Ok(None);
        };

        let port_key = format!("storagecontrollerportcount{}", index);
        let port_count = data
            .get(&port_key)
            .map(|count| {
                count
                    .parse::<u32>()
                    .map_err(|e| VBoxError::invalid_attribute(&port_key, e.to_string()))
            })
            .transpose()?;

        Ok(Some(Self {
            index,
            name: name.to_string(),
            controller_type: data
                .get(&format!("storagecontrollertype{}", index))
                .map(str::to_string),
            port_count,
            vm_name: vm_name.to_string(),
            vboxmanage: vboxmanage.clone(),
            relationships: RelationshipStore::new(),
        }))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chipset reported by VBoxManage, e.g. "PIIX4" or "IntelAhci"
    pub fn controller_type(&self) -> Option<&str> {
        self.controller_type.as_deref()
    }

    pub fn port_count(&self) -> Option<u32> {
        self.port_count
    }

    pub fn vm_name(&self) -> &str {
        &self.vm_name
    }

    pub fn vboxmanage(&self) -> &VBoxManage {
        &self.vboxmanage
    }

    pub fn attached_devices(&self) -> &[AttachedDevice] {
        self.devices()
            .downcast_ref::<Vec<AttachedDevice>>()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Relatable for StorageController {
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

relationship_accessors!(StorageController {
    devices => set_devices,
});

/// Relationship hooks for `Vec<StorageController>` values
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageControllerRelation;

impl StorageControllerRelation {
    fn controllers(value: &RelationValue) -> &[StorageController] {
        value
            .downcast_ref::<Vec<StorageController>>()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl RelatedType for StorageControllerRelation {
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

impl PopulateRelationship for StorageControllerRelation {
    fn populate_relationship(
        &self,
        caller: &dyn Relatable,
        data: &AttributeDump,
        extra: &[&dyn Any],
    ) -> RelateResult<RelationValue> {
        let vm = caller.downcast_ref::<VirtualMachine>().ok_or_else(|| {
            VBoxError::Configuration(format!(
                "storage controllers belong to a VirtualMachine, not {}",
                caller.model_name()
            ))
        })?;

        let mut controllers = Vec::new();
        for index in 0.. {
            let Some(mut controller) =
                StorageController::from_dump(index, vm.name(), vm.vboxmanage(), data)?
            else {
                break;
            };
            controller.populate_relationships(data, extra)?;
            controllers.push(controller);
        }

        tracing::debug!(vm = vm.name(), count = controllers.len(), "populated storage controllers");
        Ok(RelationValue::new(controllers))
    }
}

impl SaveRelationship for StorageControllerRelation {
    fn save_relationship(
        &self,
        _caller: &dyn Relatable,
        value: &RelationValue,
        extra: &[&dyn Any],
    ) -> RelateResult<()> {
        for controller in Self::controllers(value) {
            controller.save_relationships(extra)?;
        }
        Ok(())
    }
}

impl DestroyRelationship for StorageControllerRelation {
    fn destroy_relationship(
        &self,
        _caller: &dyn Relatable,
        value: &RelationValue,
        extra: &[&dyn Any],
    ) -> RelateResult<()> {
        for controller in Self::controllers(value) {
            controller.destroy_relationships(extra)?;
        }
        Ok(())
    }
}
