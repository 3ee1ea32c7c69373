use derive_new::new;

use super::{Fault, StatusFlags};

/// Axis status of the version 2 library.
///
/// Bit 0 is moving, bit 1 stop detected, bit 2 sensor error and bit 3 sensor disconnected.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyStatus {
    /// The axis is moving.
    pub moving: bool,
    /// The stop detection was triggered.
    pub stop_detected: bool,
    /// The sensor is in error state.
    pub sensor_error: bool,
    /// The sensor is disconnected.
    pub sensor_disconnected: bool,
}

impl StatusFlags for LegacyStatus {
    const WIDTH: usize = 4;

    fn from_flags(flags: &[bool]) -> Self {
        Self {
            moving: flags[0],
            stop_detected: flags[1],
            sensor_error: flags[2],
            sensor_disconnected: flags[3],
        }
    }

    fn to_flags(&self) -> Vec<bool> {
        vec![
            self.moving,
            self.stop_detected,
            self.sensor_error,
            self.sensor_disconnected,
        ]
    }

    fn is_moving(&self) -> bool {
        self.moving
    }

    // There is no target flag in this version; an approach is over once the axis stops.
    fn is_target_reached(&self) -> bool {
        !self.moving
    }

    fn fault_condition(&self) -> Option<Fault> {
        if self.sensor_error {
            Some(Fault::SensorError)
        } else if self.sensor_disconnected {
            Some(Fault::SensorDisconnected)
        } else if self.stop_detected {
            Some(Fault::EndOfTravel)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(LegacyStatus::new(false, false, false, false), 0)]
    #[case(LegacyStatus::new(true, false, false, false), 1)]
    #[case(LegacyStatus::new(false, true, false, false), 2)]
    #[case(LegacyStatus::new(true, false, true, false), 5)]
    #[case(LegacyStatus::new(false, false, false, true), 8)]
    #[case(LegacyStatus::new(true, true, true, true), 15)]
    #[case(LegacyStatus::new(true, false, false, false), 17)]
    #[test]
    fn decode(#[case] expect: LegacyStatus, #[case] value: i32) -> anyhow::Result<()> {
        assert_eq!(expect, LegacyStatus::decode(value)?);
        assert_eq!((value & 0xF) as u64, expect.encode());
        Ok(())
    }

    #[test]
    fn decode_negative() {
        assert!(LegacyStatus::decode(-1).is_err());
    }

    #[rstest::rstest]
    #[case(None, LegacyStatus::new(true, false, false, false))]
    #[case(Some(Fault::SensorError), LegacyStatus::new(true, false, true, false))]
    #[case(Some(Fault::SensorError), LegacyStatus::new(true, true, true, true))]
    #[case(Some(Fault::SensorDisconnected), LegacyStatus::new(true, false, false, true))]
    #[case(Some(Fault::EndOfTravel), LegacyStatus::new(true, true, false, false))]
    #[case(None, LegacyStatus::new(false, true, true, false))]
    #[test]
    fn fault(#[case] expect: Option<Fault>, #[case] status: LegacyStatus) {
        assert_eq!(expect, status.fault());
    }

    #[test]
    fn target_reached() {
        assert!(LegacyStatus::new(false, false, false, false).is_target_reached());
        assert!(!LegacyStatus::new(true, false, false, false).is_target_reached());
    }
}
