mod extended;
mod legacy;

pub use extended::ExtendedStatus;
pub use legacy::LegacyStatus;

use std::fmt::Debug;

use derive_more::Display;

use crate::bitmask::{self, BitmaskError};

/// The reason an axis is considered faulted.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The position sensor reports an error.
    #[display("sensor error")]
    SensorError,
    /// The position sensor is disconnected.
    #[display("sensor disconnected")]
    SensorDisconnected,
    /// The actuator stopped or reached a hardware limit.
    #[display("end of travel")]
    EndOfTravel,
}

/// A fixed-order set of boolean status flags of an axis.
///
/// The flag at position `i` of [`StatusFlags::to_flags`] is bit `i` of the encoded integer.
pub trait StatusFlags: Debug + Clone + Copy + PartialEq + Send + Sync + 'static {
    /// The number of flags.
    const WIDTH: usize;

    /// Creates the status from exactly [`StatusFlags::WIDTH`] flags.
    fn from_flags(flags: &[bool]) -> Self;

    /// The flags in bit order.
    fn to_flags(&self) -> Vec<bool>;

    /// Checks if the axis is moving.
    fn is_moving(&self) -> bool;

    /// Checks if the motion goal of the axis has been reached.
    fn is_target_reached(&self) -> bool;

    /// The first fault condition present in the flags, regardless of motion.
    fn fault_condition(&self) -> Option<Fault>;

    /// The fault of the axis.
    ///
    /// A fault condition only invalidates the position while the axis is moving.
    fn fault(&self) -> Option<Fault> {
        if self.is_moving() {
            self.fault_condition()
        } else {
            None
        }
    }

    /// Decodes the status from a bitmask.
    ///
    /// Bits beyond [`StatusFlags::WIDTH`] are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BitmaskError::NegativeValue`] if `value` is negative.
    fn decode(value: impl TryInto<u64>) -> Result<Self, BitmaskError> {
        let value: u64 = value
            .try_into()
            .map_err(|_| BitmaskError::NegativeValue)?;
        let known = (1u64 << Self::WIDTH) - 1;
        if value & !known != 0 {
            tracing::warn!(
                "Unknown status bits {:#x} are ignored",
                value & !known
            );
        }
        Ok(Self::from_flags(&bitmask::decode(
            value & known,
            Some(Self::WIDTH),
        )?))
    }

    /// Encodes the status into a bitmask.
    fn encode(&self) -> u64 {
        bitmask::encode(self.to_flags())
    }
}
