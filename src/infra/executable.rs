//! Host executable detection
//!
//! The test for "is this file executable" differs per host. The strategy is
//! picked once with [`ExecutableCheck::detect`] and then passed around.

use std::fs::Metadata;
use std::path::Path;

/// How the current host decides whether a file is executable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableCheck {
    /// Any of the user/group/other execute bits is set
    ModeBits,
    /// Hosts without execute bits: every regular file qualifies
    RegularFile,
}

impl ExecutableCheck {
    /// Pick the check for the host we are running on
    pub fn detect() -> Self {
        if cfg!(unix) {
            Self::ModeBits
        } else {
            Self::RegularFile
        }
    }

    /// Whether `path` is a regular file this host would execute
    pub fn is_executable(self, path: &Path) -> bool {
        let Ok(metadata) = std::fs::metadata(path) else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }

        match self {
            Self::ModeBits => has_execute_bits(&metadata),
            Self::RegularFile => true,
        }
    }
}

#[cfg(unix)]
fn has_execute_bits(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_bits(_metadata: &Metadata) -> bool {
    true
}

/// Mark a file executable for everyone (no-op off Unix)
pub fn make_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut permissions = std::fs::metadata(path)?.permissions();
        permissions.set_mode(permissions.mode() | 0o755);
        std::fs::set_permissions(path, permissions)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
