//! Test doubles for code that shells out to VBoxManage

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::command::CommandExecutor;
use crate::error::{VBoxError, VBoxResult};

#[derive(Debug, Default)]
struct Recording {
    commands: Vec<String>,
    responses: Vec<(String, String)>,
    failures: Vec<(String, i32)>,
}

/// Executor that records every command instead of running it
///
/// Responses and failures are matched by substring, first match wins.
/// Unmatched commands succeed with empty output.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer commands containing `pattern` with `output`
    pub fn respond_to(&self, pattern: &str, output: &str) {
        self.lock()
            .responses
            .push((pattern.to_string(), output.to_string()));
    }

    /// Fail commands containing `pattern` with exit `status`
    pub fn fail_on(&self, pattern: &str, status: i32) {
        self.lock().failures.push((pattern.to_string(), status));
    }

    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    pub fn clear(&self) {
        self.lock().commands.clear();
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, command: &str) -> VBoxResult<String> {
        let mut recording = self.lock();
        recording.commands.push(command.to_string());

        if let Some((_, status)) = recording
            .failures
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
        {
            return Err(VBoxError::CommandFailed {
                command: command.to_string(),
                status: *status,
                stderr: String::new(),
            });
        }

        Ok(recording
            .responses
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }
}
