use std::time::Duration;

use anc350_core::{
    axis::Axis, bitmask::BitmaskError, positioner::PositionerError, status::Fault,
};
use thiserror::Error;

/// A interface for error handling in anc350.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum ANC350Error {
    /// A bitmask argument is out of range.
    #[error("{0}")]
    InvalidArgument(#[from] BitmaskError),
    /// The axis index is out of range.
    #[error("Invalid axis index: {0}")]
    InvalidAxis(u8),
    /// The motion group is empty or addresses an axis more than once.
    #[error("Invalid motion group: {0}")]
    InvalidGroup(String),
    /// The status query or a command to the positioner failed.
    #[error("{0}")]
    DeviceCommunication(PositionerError),
    /// A fault was observed while the axis was moving.
    #[error("{axis} faulted ({fault}), status: {status:#b}")]
    Faulted {
        /// The first faulted axis.
        axis: Axis,
        /// The fault condition.
        fault: Fault,
        /// The status bitmask of the faulted sample.
        status: u64,
    },
    /// The motion did not complete within the timeout.
    #[error("Motion did not complete within {0:?}")]
    Timeout(Duration),
    /// The poll was cancelled.
    #[error("Poll was cancelled")]
    Cancelled,
}

impl From<PositionerError> for ANC350Error {
    fn from(e: PositionerError) -> Self {
        match e {
            PositionerError::InvalidAxis(idx) => ANC350Error::InvalidAxis(idx),
            e => ANC350Error::DeviceCommunication(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(ANC350Error::InvalidAxis(3), PositionerError::InvalidAxis(3))]
    #[case(
        ANC350Error::DeviceCommunication(PositionerError::NotConnected),
        PositionerError::NotConnected
    )]
    #[case(
        ANC350Error::DeviceCommunication(PositionerError::DeviceLocked),
        PositionerError::DeviceLocked
    )]
    #[test]
    fn from_positioner_error(#[case] expect: ANC350Error, #[case] e: PositionerError) {
        assert_eq!(expect, ANC350Error::from(e));
    }

    #[test]
    fn display() {
        assert_eq!(
            "axis 1 faulted (sensor error), status: 0b101",
            ANC350Error::Faulted {
                axis: Axis::Y,
                fault: Fault::SensorError,
                status: 0b101,
            }
            .to_string()
        );
        assert_eq!(
            "Invalid argument: bitmask value must be non-negative",
            ANC350Error::from(BitmaskError::NegativeValue).to_string()
        );
    }
}
