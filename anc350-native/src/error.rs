use anc350_core::positioner::PositionerError;
use thiserror::Error;

use crate::DriverVersion;

/// An error produced by the vendor library.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum NativeError {
    /// The vendor library could not be loaded.
    #[error("Library {0} not found. Please install the ANC350 driver.")]
    LibraryNotFound(String),
    /// The vendor library does not export a function.
    #[error("Function {0} not found in the library")]
    FunctionNotFound(String),
    /// The binding does not support the configured driver version.
    #[error("The {1} library is required, but {0} is configured")]
    UnsupportedVersion(DriverVersion, DriverVersion),
    /// Discovery found fewer devices than the requested index.
    #[error("No device found at index {0}")]
    DeviceNotFound(u32),
    /// The position unit does not match the library.
    #[error("{0} position is not supported by this library")]
    UnsupportedPosition(&'static str),
    /// Unspecified error.
    #[error("Unspecified error")]
    Unspecified,
    /// The driver timed out.
    #[error("Timeout during data retrieval")]
    Timeout,
    /// No contact with the positioner.
    #[error("No contact with the positioner")]
    NotConnected,
    /// The driver returned a malformed response.
    #[error("Error in the driver response")]
    DriverError,
    /// The boot image was not found.
    #[error("Boot image not found")]
    FileNotFound,
    /// An invalid parameter.
    #[error("Transferred parameter is invalid")]
    InvalidParam,
    /// The device is locked by another connection.
    #[error("Device is already in use")]
    DeviceLocked,
    /// A parameter out of specification.
    #[error("Transferred parameter is out of specification")]
    NotSpecifiedParam,
    /// Unknown error.
    #[error("Unknown error")]
    Unknown,
    /// Invalid device number.
    #[error("Invalid device number")]
    NoDevice,
    /// Invalid axis number.
    #[error("Invalid axis number")]
    NoAxis,
    /// Parameter out of range.
    #[error("Parameter out of range")]
    OutOfRange,
    /// The function is not available on this device type.
    #[error("Function not available for this device type")]
    NotAvailable,
    /// A return code outside the documented set.
    #[error("Unknown return code: {0}")]
    UnknownCode(i32),
}

impl NativeError {
    /// Translates a return code of the `version` library.
    ///
    /// An ignored boot (code 4 of the version 2 library) only means the device was already running, so it is logged and treated as success.
    pub fn from_code(version: DriverVersion, code: i32) -> Result<(), NativeError> {
        match (version, code) {
            (_, 0) => Ok(()),
            (_, -1) => Err(NativeError::Unspecified),
            (_, 1) => Err(NativeError::Timeout),
            (_, 2) => Err(NativeError::NotConnected),
            (_, 3) => Err(NativeError::DriverError),
            (_, 7) => Err(NativeError::DeviceLocked),
            (DriverVersion::V2, 4) => {
                tracing::warn!("Boot ignored, the device was already running");
                Ok(())
            }
            (DriverVersion::V2, 5) => Err(NativeError::FileNotFound),
            (DriverVersion::V2, 6) => Err(NativeError::InvalidParam),
            (DriverVersion::V2, 8) => Err(NativeError::NotSpecifiedParam),
            (DriverVersion::V3 | DriverVersion::V4, 8) => Err(NativeError::Unknown),
            (DriverVersion::V3 | DriverVersion::V4, 9) => Err(NativeError::NoDevice),
            (DriverVersion::V3 | DriverVersion::V4, 10) => Err(NativeError::NoAxis),
            (DriverVersion::V3 | DriverVersion::V4, 11) => Err(NativeError::OutOfRange),
            (DriverVersion::V3 | DriverVersion::V4, 12) => Err(NativeError::NotAvailable),
            (_, code) => Err(NativeError::UnknownCode(code)),
        }
    }
}

impl From<NativeError> for PositionerError {
    fn from(err: NativeError) -> Self {
        match err {
            NativeError::NotConnected => PositionerError::NotConnected,
            NativeError::DeviceLocked => PositionerError::DeviceLocked,
            NativeError::InvalidParam
            | NativeError::NotSpecifiedParam
            | NativeError::OutOfRange
            | NativeError::NoAxis
            | NativeError::UnsupportedPosition(_) => PositionerError::InvalidParameter(err.to_string()),
            NativeError::FunctionNotFound(_) | NativeError::NotAvailable => {
                PositionerError::NotAvailable(err.to_string())
            }
            err => PositionerError::Communication(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(Ok(()), 0)]
    #[case(Err(NativeError::Unspecified), -1)]
    #[case(Err(NativeError::Timeout), 1)]
    #[case(Err(NativeError::NotConnected), 2)]
    #[case(Err(NativeError::DriverError), 3)]
    #[case(Ok(()), 4)]
    #[case(Err(NativeError::FileNotFound), 5)]
    #[case(Err(NativeError::InvalidParam), 6)]
    #[case(Err(NativeError::DeviceLocked), 7)]
    #[case(Err(NativeError::NotSpecifiedParam), 8)]
    #[case(Err(NativeError::UnknownCode(9)), 9)]
    #[test]
    fn v2_codes(#[case] expect: Result<(), NativeError>, #[case] code: i32) {
        assert_eq!(expect, NativeError::from_code(DriverVersion::V2, code));
    }

    #[rstest::rstest]
    #[case(Ok(()), 0)]
    #[case(Err(NativeError::Unspecified), -1)]
    #[case(Err(NativeError::UnknownCode(4)), 4)]
    #[case(Err(NativeError::DeviceLocked), 7)]
    #[case(Err(NativeError::Unknown), 8)]
    #[case(Err(NativeError::NoDevice), 9)]
    #[case(Err(NativeError::NoAxis), 10)]
    #[case(Err(NativeError::OutOfRange), 11)]
    #[case(Err(NativeError::NotAvailable), 12)]
    #[case(Err(NativeError::UnknownCode(13)), 13)]
    #[test]
    fn v4_codes(
        #[case] expect: Result<(), NativeError>,
        #[case] code: i32,
        #[values(DriverVersion::V3, DriverVersion::V4)] version: DriverVersion,
    ) {
        assert_eq!(expect, NativeError::from_code(version, code));
    }

    #[rstest::rstest]
    #[case(PositionerError::NotConnected, NativeError::NotConnected)]
    #[case(PositionerError::DeviceLocked, NativeError::DeviceLocked)]
    #[case(
        PositionerError::InvalidParameter("Parameter out of range".to_string()),
        NativeError::OutOfRange
    )]
    #[case(
        PositionerError::NotAvailable("Function ANC_saveParams not found in the library".to_string()),
        NativeError::FunctionNotFound("ANC_saveParams".to_string())
    )]
    #[case(
        PositionerError::Communication("Timeout during data retrieval".to_string()),
        NativeError::Timeout
    )]
    #[test]
    fn into_positioner_error(#[case] expect: PositionerError, #[case] err: NativeError) {
        assert_eq!(expect, PositionerError::from(err));
    }
}
