//! Device-facing services: the I2C bus transport and the pipe publisher.

pub mod i2c_bus;
pub mod pipe;

pub use i2c_bus::{I2cBus, TransportError};
pub use pipe::{PipePublisher, PublishError, PublishOutcome};
