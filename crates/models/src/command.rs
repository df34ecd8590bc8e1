//! Command construction and execution for VBoxManage

use std::fmt;
use std::process::Command;
use std::sync::Arc;

use crate::config::VBoxConfig;
use crate::error::{VBoxError, VBoxResult};
use crate::platform::Platform;

/// Quote a value for a POSIX shell
///
/// Values made only of safe characters are returned unchanged.
pub fn shell_escape(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }

    let safe = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if safe {
        return value.to_string();
    }

    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Quote a value for `cmd.exe`
pub fn windows_escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Arguments handed to `cmd` for a complete command line
///
/// With `/S`, cmd strips exactly the outer pair of quotes, so quoted
/// executables and arguments inside `command` survive intact.
pub fn cmd_arguments(flag: &str, command: &str) -> String {
    format!("/S {} \"{}\"", flag, command)
}

/// Runs a complete shell command line and returns its standard output
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: &str) -> VBoxResult<String>;
}

/// Executes commands through the platform shell
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    platform: Platform,
    shell: Option<String>,
}

impl SystemExecutor {
    pub fn new(platform: Platform, shell: Option<String>) -> Self {
        Self { platform, shell }
    }

    fn shell(&self) -> (&str, &str) {
        let flag = if self.platform.is_windows() { "/C" } else { "-c" };
        match &self.shell {
            Some(shell) => (shell.as_str(), flag),
            None if self.platform.is_windows() => ("cmd", flag),
            None => ("sh", flag),
        }
    }

    /// Process that runs `command` through the shell
    pub fn command(&self, command: &str) -> Command {
        let (shell, flag) = self.shell();
        let mut process = Command::new(shell);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            process.raw_arg(cmd_arguments(flag, command));
        }
        #[cfg(not(windows))]
        {
            process.arg(flag).arg(command);
        }

        process
    }
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self::new(Platform::current(), None)
    }
}

impl CommandExecutor for SystemExecutor {
    fn execute(&self, command: &str) -> VBoxResult<String> {
        let mut process = self.command(command);
        tracing::debug!(shell = ?process.get_program(), command, "executing command");

        let output = process.output()?;

        if !output.status.success() {
            let status = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(command, status, stderr = %stderr, "command failed");
            return Err(VBoxError::CommandFailed {
                command: command.to_string(),
                status,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Handle for running VBoxManage subcommands
#[derive(Clone)]
pub struct VBoxManage {
    executable: String,
    platform: Platform,
    executor: Arc<dyn CommandExecutor>,
}

impl VBoxManage {
    pub fn new(
        executable: impl Into<String>,
        platform: Platform,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            executable: executable.into(),
            platform,
            executor,
        }
    }

    /// VBoxManage as configured, running through the system shell
    pub fn from_config(config: &VBoxConfig) -> Self {
        let platform = Platform::current();
        let executor = SystemExecutor::new(platform.clone(), config.shell.clone());
        Self::new(config.vboxmanage.clone(), platform, Arc::new(executor))
    }

    /// VBoxManage as configured, running through a custom executor
    pub fn with_executor(config: &VBoxConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self::new(config.vboxmanage.clone(), Platform::current(), executor)
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Quote a single argument for this platform's shell
    pub fn escape(&self, value: &str) -> String {
        if self.platform.is_windows() {
            windows_escape(value)
        } else {
            shell_escape(value)
        }
    }

    /// Full command line for `args`, which must already be escaped
    pub fn command_line(&self, args: &str) -> String {
        format!("{} {}", self.escape(&self.executable), args)
    }

    pub fn run(&self, args: &str) -> VBoxResult<String> {
        self.executor.execute(&self.command_line(args))
    }
}

impl fmt::Debug for VBoxManage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VBoxManage")
            .field("executable", &self.executable)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}
