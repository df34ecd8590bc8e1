use thiserror::Error;
use vbox_relatable::RelationshipError;

pub type VBoxResult<T> = Result<T, VBoxError>;

#[derive(Debug, Error)]
pub enum VBoxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Command failed with status {status}: {command}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Invalid attribute '{key}': {message}")]
    InvalidAttribute { key: String, message: String },

    #[error(transparent)]
    Relationship(#[from] RelationshipError),
}

impl VBoxError {
    pub fn invalid_attribute(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

// Hooks report failures through the relationship error type; a relationship
// error travelling back up is unwrapped rather than nested.
impl From<VBoxError> for RelationshipError {
    fn from(err: VBoxError) -> Self {
        match err {
            VBoxError::Relationship(inner) => inner,
            other => RelationshipError::Hook(anyhow::Error::new(other)),
        }
    }
}
