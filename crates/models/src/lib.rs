//! # vbox-models: VirtualBox configuration models
//!
//! Machines, storage controllers and attached devices built from
//! `VBoxManage showvminfo --machinereadable` output. The models are wired
//! together through `vbox-relatable` relationships: a machine populates its
//! storage controllers, each controller populates its attached devices, and
//! save/destroy fan out the same way.

pub mod attached_device;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod storage_controller;
pub mod testing;
pub mod virtual_machine;

pub use attached_device::{AttachedDevice, AttachedDeviceRelation};
pub use command::{
    cmd_arguments, shell_escape, windows_escape, CommandExecutor, SystemExecutor, VBoxManage,
};
pub use config::VBoxConfig;
pub use error::{VBoxError, VBoxResult};
pub use logging::{init_logging, resolve_filter, LogFormat, LoggingConfig};
pub use platform::Platform;
pub use storage_controller::{StorageController, StorageControllerRelation};
pub use virtual_machine::VirtualMachine;

pub use vbox_relatable as relatable;
