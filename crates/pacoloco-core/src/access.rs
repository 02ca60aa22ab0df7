//! Filesystem permission probes
//!
//! Checks are done with `access(2)` against the real filesystem using the
//! real uid of the process, so they reflect what the service user can do
//! rather than just whether the path exists.

use nix::unistd::{self, AccessFlags, User};
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;

/// Access required on a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    fn flags(&self) -> AccessFlags {
        match self {
            AccessMode::Read => AccessFlags::R_OK,
            AccessMode::Write => AccessFlags::W_OK,
            AccessMode::ReadWrite => AccessFlags::R_OK | AccessFlags::W_OK,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessMode::Read => "readable",
            AccessMode::Write => "writable",
            AccessMode::ReadWrite => "readable and writable",
        };
        f.write_str(s)
    }
}

/// Whether the current user has `mode` access to `path`
pub fn is_accessible(path: &Path, mode: AccessMode) -> bool {
    unistd::access(path, mode.flags()).is_ok()
}

/// Require `mode` access to `path`
///
/// On failure the error names the current user. If the user itself cannot
/// be resolved, that error is returned instead.
pub fn check_access(path: &Path, mode: AccessMode) -> Result<(), ConfigError> {
    if is_accessible(path, mode) {
        return Ok(());
    }

    let user = current_user()?;
    Err(ConfigError::PathNotAccessible {
        path: path.to_path_buf(),
        mode,
        user,
    })
}

/// Login name of the real uid running the process
pub fn current_user() -> Result<String, ConfigError> {
    let uid = unistd::getuid();
    match User::from_uid(uid) {
        Ok(Some(user)) => Ok(user.name),
        Ok(None) => Err(ConfigError::IdentityLookup(format!(
            "no passwd entry for uid {}",
            uid
        ))),
        Err(errno) => Err(ConfigError::IdentityLookup(format!(
            "lookup of uid {} failed: {}",
            uid, errno
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_directory_read_write() {
        let dir = TempDir::new().unwrap();
        assert!(check_access(dir.path(), AccessMode::ReadWrite).is_ok());
        assert!(check_access(dir.path(), AccessMode::Read).is_ok());
    }

    #[test]
    fn test_file_readable() {
        let file = NamedTempFile::new().unwrap();
        assert!(is_accessible(file.path(), AccessMode::Read));
        assert!(is_accessible(file.path(), AccessMode::Write));
    }

    #[test]
    fn test_missing_path_names_user() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = check_access(&missing, AccessMode::ReadWrite).unwrap_err();
        match err {
            ConfigError::PathNotAccessible { path, mode, user } => {
                assert_eq!(path, missing);
                assert_eq!(mode, AccessMode::ReadWrite);
                assert_eq!(user, current_user().unwrap());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(AccessMode::Read.to_string(), "readable");
        assert_eq!(AccessMode::ReadWrite.to_string(), "readable and writable");
    }
}
