use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{VBoxError, VBoxResult};
use crate::logging::LoggingConfig;

/// Environment variable overriding the VBoxManage executable
pub const VBOX_MANAGE_ENV: &str = "VBOX_MANAGE";
/// Environment variable overriding the log level and any configured filter
pub const VBOX_LOG_ENV: &str = "VBOX_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VBoxConfig {
    /// VBoxManage executable, looked up on PATH unless absolute
    pub vboxmanage: String,
    /// Shell used to run commands instead of the platform default
    pub shell: Option<String>,
    pub logging: LoggingConfig,
}

impl Default for VBoxConfig {
    fn default() -> Self {
        Self {
            vboxmanage: "VBoxManage".to_string(),
            shell: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl VBoxConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> VBoxResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> VBoxResult<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> VBoxResult<Self> {
        if let Ok(vboxmanage) = env::var(VBOX_MANAGE_ENV) {
            self.vboxmanage = vboxmanage;
        }
        if let Ok(level) = env::var(VBOX_LOG_ENV) {
            // A configured filter would otherwise shadow the level
            self.logging.level = level;
            self.logging.env_filter = None;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> VBoxResult<()> {
        if self.vboxmanage.trim().is_empty() {
            return Err(VBoxError::Configuration(
                "vboxmanage executable must not be empty".to_string(),
            ));
        }
        if let Some(shell) = &self.shell {
            if shell.trim().is_empty() {
                return Err(VBoxError::Configuration(
                    "shell must not be empty when set".to_string(),
                ));
            }
        }
        self.logging.validate()
    }
}
