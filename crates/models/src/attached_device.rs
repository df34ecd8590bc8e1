//! Devices attached to a storage controller

use std::any::Any;

use vbox_relatable::{
    AttributeDump, DestroyRelationship, PopulateRelationship, RelateResult, Relatable,
    RelatedType, RelationValue,
};

use crate::command::VBoxManage;
use crate::error::{VBoxError, VBoxResult};
use crate::storage_controller::StorageController;

/// Medium value VBoxManage reports for an empty slot
const EMPTY_SLOT: &str = "none";

/// A medium attached to one port of a storage controller
#[derive(Debug, Clone)]
pub struct AttachedDevice {
    port: u32,
    medium: String,
    uuid: Option<String>,
    controller_name: String,
    vm_name: String,
    vboxmanage: VBoxManage,
}

impl AttachedDevice {
    pub fn port(&self) -> u32 {
        self.port
    }

    /// Path or name of the attached medium
    pub fn medium(&self) -> &str {
        &self.medium
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    pub fn controller_name(&self) -> &str {
        &self.controller_name
    }

    pub fn vm_name(&self) -> &str {
        &self.vm_name
    }

    /// Detach the medium from its port
    pub fn destroy(&self) -> VBoxResult<()> {
        let args = format!(
            "storageattach {} --storagectl {} --port {} --device 0 --medium none",
            self.vboxmanage.escape(&self.vm_name),
            self.vboxmanage.escape(&self.controller_name),
            self.port
        );
        self.vboxmanage.run(&args)?;
        tracing::info!(
            vm = %self.vm_name,
            controller = %self.controller_name,
            port = self.port,
            "detached device"
        );
        Ok(())
    }

    /// Read every attached device of `controller` out of a dump
    ///
    /// Ports are scanned from 0 until `<controller>-<port>-0` is missing.
    /// Empty slots are skipped.
    pub fn from_dump(controller: &StorageController, data: &AttributeDump) -> Vec<AttachedDevice> {
        let mut devices = Vec::new();

        for port in 0u32.. {
            let Some(medium) = data.get(&format!("{}-{}-0", controller.name(), port)) else {
                break;
            };
            if medium.eq_ignore_ascii_case(EMPTY_SLOT) {
                continue;
            }

            let uuid = data
                .get(&format!("{}-imageuuid-{}-0", controller.name(), port))
                .map(str::to_string);

            devices.push(AttachedDevice {
                port,
                medium: medium.to_string(),
                uuid,
                controller_name: controller.name().to_string(),
                vm_name: controller.vm_name().to_string(),
                vboxmanage: controller.vboxmanage().clone(),
            });
        }

        devices
    }
}

/// Relationship hooks for `Vec<AttachedDevice>` values
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachedDeviceRelation;

impl RelatedType for AttachedDeviceRelation {
    fn as_populate(&self) -> Option<&dyn PopulateRelationship> {
        Some(self)
    }

    fn as_destroy(&self) -> Option<&dyn DestroyRelationship> {
        Some(self)
    }
}

impl PopulateRelationship for AttachedDeviceRelation {
    fn populate_relationship(
        &self,
        caller: &dyn Relatable,
        data: &AttributeDump,
        _extra: &[&dyn Any],
    ) -> RelateResult<RelationValue> {
        let controller = caller.downcast_ref::<StorageController>().ok_or_else(|| {
            VBoxError::Configuration(format!(
                "attached devices belong to a StorageController, not {}",
                caller.model_name()
            ))
        })?;

        let devices = AttachedDevice::from_dump(controller, data);
        tracing::debug!(
            controller = controller.name(),
            count = devices.len(),
            "populated attached devices"
        );
        Ok(RelationValue::new(devices))
    }
}

impl DestroyRelationship for AttachedDeviceRelation {
    fn destroy_relationship(
        &self,
        _caller: &dyn Relatable,
        value: &RelationValue,
        _extra: &[&dyn Any],
    ) -> RelateResult<()> {
        let Some(devices) = value.downcast_ref::<Vec<AttachedDevice>>() else {
            return Ok(());
        };
        for device in devices {
            device.destroy()?;
        }
        Ok(())
    }
}
