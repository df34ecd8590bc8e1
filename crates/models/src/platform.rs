//! Host platform detection

/// Operating system the library is talking to VirtualBox on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    target_os: String,
}

impl Platform {
    pub fn new(target_os: impl Into<String>) -> Self {
        Self {
            target_os: target_os.into().to_lowercase(),
        }
    }

    /// Platform this binary was compiled for
    pub fn current() -> Self {
        Self::new(std::env::consts::OS)
    }

    pub fn target_os(&self) -> &str {
        &self.target_os
    }

    pub fn is_mac(&self) -> bool {
        self.target_os == "macos" || self.target_os.contains("darwin")
    }

    pub fn is_windows(&self) -> bool {
        self.target_os == "windows"
            || ["mswin", "mingw", "cygwin"]
                .iter()
                .any(|name| self.target_os.contains(name))
    }

    pub fn is_linux(&self) -> bool {
        self.target_os.contains("linux")
    }

    pub fn is_solaris(&self) -> bool {
        self.target_os.contains("solaris")
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
