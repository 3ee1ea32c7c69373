use thiserror::Error;

/// An error produced by the positioner.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum PositionerError {
    /// The positioner is not connected or has been closed.
    #[error("Positioner is not connected")]
    NotConnected,
    /// The axis index is out of range.
    #[error("Invalid axis index: {0}")]
    InvalidAxis(u8),
    /// The device did not answer or answered with an error.
    #[error("Communication error: {0}")]
    Communication(String),
    /// A parameter was rejected by the device.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// The requested function is not available on this device or library.
    #[error("Not available: {0}")]
    NotAvailable(String),
    /// The device is locked by another application.
    #[error("Device is locked by another application")]
    DeviceLocked,
}
