//! Virtual machines as reported by `VBoxManage showvminfo`

use std::any::Any;

use vbox_relatable::prelude::*;
use vbox_relatable::{
    relationship_accessors, AttributeDump, RegistryCell, RelationshipRegistry, RelationshipStore,
};

use crate::command::VBoxManage;
use crate::error::{VBoxError, VBoxResult};
use crate::storage_controller::{StorageController, StorageControllerRelation};

#[derive(Debug, Clone)]
pub struct VirtualMachine {
    name: String,
    uuid: Option<String>,
    memory: Option<u32>,
    vboxmanage: VBoxManage,
    relationships: RelationshipStore,
}

impl VirtualMachine {
    pub fn relationships() -> &'static RelationshipRegistry {
        static REGISTRY: RegistryCell = RegistryCell::new();
        REGISTRY.get_or_init(|| {
            RelationshipRegistry::builder("VirtualMachine")
                .relationship("storage_controllers", StorageControllerRelation)
                .build()
        })
    }

    /// Query VBoxManage for a machine and build it with its relationships
    pub fn find(name: &str, vboxmanage: &VBoxManage) -> VBoxResult<Self> {
        let args = format!("showvminfo {} --machinereadable", vboxmanage.escape(name));
        let output = vboxmanage.run(&args)?;
        Self::from_dump(&AttributeDump::parse(&output), vboxmanage)
    }

    /// Build a machine from an attribute dump and populate its relationships
    pub fn from_dump(data: &AttributeDump, vboxmanage: &VBoxManage) -> VBoxResult<Self> {
        let name = data
            .get("name")
            .ok_or_else(|| VBoxError::invalid_attribute("name", "missing from dump"))?;

        let memory = data
            .get("memory")
            .map(|memory| {
                memory
                    .parse::<u32>()
                    .map_err(|e| VBoxError::invalid_attribute("memory", e.to_string()))
            })
            .transpose()?;

        let mut vm = Self {
            name: name.to_string(),
            uuid: data.get("uuid").map(str::to_string),
            memory,
            vboxmanage: vboxmanage.clone(),
            relationships: RelationshipStore::new(),
        };
        vm.populate_relationships(data, &[])?;

        tracing::debug!(vm = %vm.name, "loaded virtual machine");
        Ok(vm)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// Memory size in megabytes
    pub fn memory(&self) -> Option<u32> {
        self.memory
    }

    pub fn vboxmanage(&self) -> &VBoxManage {
        &self.vboxmanage
    }

    pub fn controllers(&self) -> &[StorageController] {
        self.storage_controllers()
            .downcast_ref::<Vec<StorageController>>()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Save every relationship of the machine
    pub fn save(&self) -> VBoxResult<()> {
        self.save_relationships(&[])?;
        Ok(())
    }

    /// Detach everything, then unregister and delete the machine
    pub fn destroy(&self) -> VBoxResult<()> {
        self.destroy_relationships(&[])?;
        self.vboxmanage
            .run(&format!("unregistervm {} --delete", self.vboxmanage.escape(&self.name)))?;
        tracing::info!(vm = %self.name, "destroyed virtual machine");
        Ok(())
    }
}

impl Relatable for VirtualMachine {
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

relationship_accessors!(VirtualMachine {
    storage_controllers => set_storage_controllers,
});
