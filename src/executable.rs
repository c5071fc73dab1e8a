//! Locating and validating the cx executable.

use crate::error::ConfigError;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// File name of the executable shipped for the current platform.
#[cfg(target_os = "windows")]
pub const BUNDLED_EXECUTABLE: &str = "cx.exe";
/// File name of the executable shipped for the current platform.
#[cfg(target_os = "macos")]
pub const BUNDLED_EXECUTABLE: &str = "cx-mac";
/// File name of the executable shipped for the current platform.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const BUNDLED_EXECUTABLE: &str = "cx-linux";

/// Default directory holding the bundled executable: `resources/` next to the
/// running program.
pub fn default_resources_dir() -> Result<PathBuf, ConfigError> {
    let exe = std::env::current_exe().map_err(|e| ConfigError::BundledExecutableUnavailable {
        reason: e.to_string(),
    })?;
    let dir = exe
        .parent()
        .ok_or_else(|| ConfigError::BundledExecutableUnavailable {
            reason: format!("{} has no parent directory", exe.display()),
        })?;
    Ok(dir.join("resources"))
}

/// Make the bundled executable runnable by everyone.
#[cfg(unix)]
pub fn mark_executable(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::ExecutableNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::PermissionUpdateFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        }
    })
}

#[cfg(not(unix))]
pub fn mark_executable(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

/// Canonicalize an executable path and check it can be run.
///
/// # Errors
///
/// - `ExecutableNotFound` if the path doesn't exist
/// - `ExecutableResolveFailed` for other canonicalization or stat failures
/// - `ExecutableIsDirectory` / `ExecutableNotRegularFile` for non-files
/// - `NotExecutable` if no execute permission applies to the current user
pub fn resolve_executable(path: &Path) -> Result<PathBuf, ConfigError> {
    let canonical = std::fs::canonicalize(path).map_err(|e| {
        let path_str = path.display().to_string();
        match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::ExecutableNotFound { path: path_str },
            _ => ConfigError::ExecutableResolveFailed {
                path: path_str,
                reason: e.to_string(),
            },
        }
    })?;

    check_binary(&canonical)?;
    Ok(canonical)
}

/// Check that a path points to a regular file the current user may execute.
pub fn check_binary(path: &Path) -> Result<(), ConfigError> {
    let display = || path.display().to_string();

    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ExecutableResolveFailed {
        path: display(),
        reason: e.to_string(),
    })?;
    let file_type = metadata.file_type();

    if file_type.is_dir() {
        Err(ConfigError::ExecutableIsDirectory { path: display() })
    } else if !file_type.is_file() {
        Err(ConfigError::ExecutableNotRegularFile { path: display() })
    } else if !is_executable(&metadata) {
        Err(ConfigError::NotExecutable { path: display() })
    } else {
        Ok(())
    }
}

/// Whether the execute bit of the current user's permission class is set.
///
/// Exactly one class applies: owner, else group, else other. root only needs
/// some execute bit.
#[cfg(unix)]
fn is_executable(metadata: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;

    // SAFETY: getuid/getgid cannot fail and touch no memory.
    let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };

    let execute_bit = if uid == 0 {
        0o111
    } else if uid == metadata.uid() {
        0o100
    } else if gid == metadata.gid() {
        0o010
    } else {
        0o001
    };
    metadata.mode() & execute_bit != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &Metadata) -> bool {
    true
}
