//! Non-blocking publication to a named pipe.
//!
//! The pipe is created once at startup and opened for writing on every
//! publish. When no reader is attached the open fails immediately with
//! `ENXIO`; the sample is skipped instead of stalling the acquisition
//! cadence. The handle never persists across publishes, so a reader that
//! attaches later only sees subsequent records.

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use nix::errno::Errno;
use nix::libc;
use nix::sys::stat::Mode;
use nix::unistd;
use thiserror::Error;

/// Result of one publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The payload was handed to an attached reader.
    Delivered,
    /// No reader had the pipe open; the payload was skipped.
    NoReader,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to create pipe {}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },
    #[error("failed to open pipe {} for writing", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write to pipe {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writer end of the named pipe consumers attach to.
#[derive(Debug, Clone)]
pub struct PipePublisher {
    path: PathBuf,
}

impl PipePublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the pipe unless something already sits at the path. A pipe
    /// that appeared in the meantime also counts as success.
    pub fn ensure_exists(&self) -> Result<(), PublishError> {
        if self.path.exists() {
            return Ok(());
        }
        info!("creating named pipe at {}", self.path.display());
        match unistd::mkfifo(&self.path, Mode::from_bits_truncate(0o666)) {
            Ok(()) | Err(Errno::EEXIST) => Ok(()),
            Err(source) => Err(PublishError::Create {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Write `payload` as one record. An absent reader is `NoReader`, not
    /// an error; the open never blocks waiting for one.
    pub fn publish(&self, payload: &[u8]) -> Result<PublishOutcome, PublishError> {
        let mut pipe = match OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
        {
            Ok(pipe) => pipe,
            Err(err) if err.raw_os_error() == Some(libc::ENXIO) => {
                return Ok(PublishOutcome::NoReader);
            }
            Err(source) => {
                return Err(PublishError::Open {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let written = pipe.write(payload).map_err(|source| PublishError::Write {
            path: self.path.clone(),
            source,
        })?;
        // Short writes are reported, not retried.
        if written < payload.len() {
            warn!(
                "short write to {}: {written} of {} bytes",
                self.path.display(),
                payload.len()
            );
        }
        Ok(PublishOutcome::Delivered)
    }
}
