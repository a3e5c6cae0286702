// src/instance.rs - One robot process per machine
use crate::error::RobotError;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lock file claimed by the running robot process.
///
/// The file holds the owner's pid and is removed when the lock is dropped.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Claims `path`.
    ///
    /// A freshly started program may race the teardown of the one it replaces,
    /// so an existing lock is checked a second time after `retry_delay`.
    pub fn acquire(path: impl Into<PathBuf>, retry_delay: Duration) -> Result<Self, RobotError> {
        let path = path.into();
        if path.exists() {
            tracing::debug!("Instance lock {} present, checking again", path.display());
            std::thread::sleep(retry_delay);
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())?;
                tracing::debug!("Claimed instance lock {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::error!("An instance of Robot already exists.");
                Err(RobotError::MultipleInstances { path })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        tracing::debug!("Release instance lock {}", self.path.display());
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("Failed to remove instance lock {}: {}", self.path.display(), e);
        }
    }
}
