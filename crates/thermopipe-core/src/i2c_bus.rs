//! Addressed register reads over the Linux I2C character device.
//!
//! Every transaction opens the bus device, selects the peripheral, writes
//! the command byte, waits out the sensor's conversion time and reads the
//! reply in one message. The handle is scoped to the call, so it is closed
//! on every exit path.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::debug;
use nix::libc::{c_int, c_ulong};
use thiserror::Error;

// From <linux/i2c-dev.h>.
const I2C_SLAVE: c_ulong = 0x0703;
const I2C_TIMEOUT: c_ulong = 0x0702;

nix::ioctl_write_int_bad!(i2c_slave, I2C_SLAVE);
nix::ioctl_write_int_bad!(i2c_timeout, I2C_TIMEOUT);

/// Adapter-level bound on one transaction, in 10 ms units.
const TRANSACTION_TIMEOUT_10MS: c_int = 25;

/// Conversion settle time between the command write and the data read.
const SETTLE_DELAY: Duration = Duration::from_millis(1);

/// Failure modes of one bus transaction.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open bus device {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to select device {addr:#04x}")]
    AddressSelect {
        addr: u8,
        #[source]
        source: nix::Error,
    },
    #[error("failed to write command byte {command:#04x}")]
    CommandWrite {
        command: u8,
        #[source]
        source: std::io::Error,
    },
    #[error("bus read failed")]
    Read {
        #[source]
        source: std::io::Error,
    },
    #[error("short read from device, expected {expected}, got {got}")]
    ShortRead { expected: usize, got: usize },
}

/// One I2C bus controller, addressed by device path.
#[derive(Debug, Clone)]
pub struct I2cBus {
    path: PathBuf,
}

impl I2cBus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read `N` bytes from `device_addr` after writing the single
    /// `command` byte. The returned frame is freshly zeroed for each call;
    /// a reply shorter than `N` is an error, never a partial frame.
    pub fn read_register<const N: usize>(
        &self,
        device_addr: u8,
        command: u8,
    ) -> Result<[u8; N], TransportError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|source| TransportError::Open {
                path: self.path.clone(),
                source,
            })?;

        // Bound the transaction so a wedged bus cannot stall the caller
        // indefinitely. Units are 10 ms; not every adapter honours the
        // request, so a refusal is not fatal.
        if let Err(err) = unsafe { i2c_timeout(file.as_raw_fd(), TRANSACTION_TIMEOUT_10MS) } {
            debug!("I2C_TIMEOUT not applied on {}: {err}", self.path.display());
        }

        unsafe { i2c_slave(file.as_raw_fd(), c_int::from(device_addr)) }.map_err(|source| {
            TransportError::AddressSelect {
                addr: device_addr,
                source,
            }
        })?;

        file.write_all(&[command])
            .map_err(|source| TransportError::CommandWrite { command, source })?;

        thread::sleep(SETTLE_DELAY);

        read_reply(&mut file)
    }
}

/// Single read of exactly `N` bytes. The kernel driver answers a register
/// read as one message, so a short count is a failed transaction.
fn read_reply<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N], TransportError> {
    let mut frame = [0u8; N];
    let got = reader
        .read(&mut frame)
        .map_err(|source| TransportError::Read { source })?;
    if got != N {
        return Err(TransportError::ShortRead { expected: N, got });
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "bus fault"))
        }
    }

    #[test]
    fn full_reply_is_returned_verbatim() {
        let mut reader = Cursor::new(vec![7u8; 35]);
        let frame: [u8; 35] = read_reply(&mut reader).unwrap();
        assert_eq!(frame, [7u8; 35]);
    }

    #[test]
    fn short_reply_reports_exact_counts() {
        let mut reader = Cursor::new(vec![0u8; 11]);
        let err = read_reply::<_, 35>(&mut reader).unwrap_err();
        match err {
            TransportError::ShortRead { expected, got } => {
                assert_eq!(expected, 35);
                assert_eq!(got, 11);
            }
            other => panic!("expected ShortRead, got {other:?}"),
        }
    }

    #[test]
    fn read_error_is_not_a_short_read() {
        let err = read_reply::<_, 35>(&mut BrokenReader).unwrap_err();
        assert!(matches!(err, TransportError::Read { .. }));
    }

    #[test]
    fn open_failure_names_the_device() {
        let bus = I2cBus::new("/dev/does-not-exist-i2c");
        let err = bus.read_register::<35>(0x0A, 0x4C).unwrap_err();
        match &err {
            TransportError::Open { path, .. } => {
                assert_eq!(path, Path::new("/dev/does-not-exist-i2c"));
            }
            other => panic!("expected Open, got {other:?}"),
        }
        assert!(err.to_string().contains("/dev/does-not-exist-i2c"));
    }
}
