//! Host platform identity.

/// Operating system of the build host.
///
/// Only the distinctions the flag assembly cares about are modelled;
/// everything that is neither Linux, Darwin nor Windows is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    Darwin,
    Windows,
    Other,
}

impl HostOs {
    /// Detect the host operating system.
    pub fn current() -> Self {
        HostOs::from_os_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` style name.
    pub fn from_os_name(os: &str) -> Self {
        match os {
            "linux" => HostOs::Linux,
            "macos" | "darwin" | "ios" => HostOs::Darwin,
            "windows" => HostOs::Windows,
            _ => HostOs::Other,
        }
    }

    pub fn is_darwin(&self) -> bool {
        matches!(self, HostOs::Darwin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HostOs::Linux => "linux",
            HostOs::Darwin => "darwin",
            HostOs::Windows => "windows",
            HostOs::Other => "other",
        }
    }
}

impl std::fmt::Display for HostOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
