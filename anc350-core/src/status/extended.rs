use derive_new::new;

use super::{Fault, StatusFlags};

/// Axis status of the version 3/4 library.
///
/// The flags are packed in the order the library reports them, starting with `connected` at bit 0.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedStatus {
    /// The axis is connected to a sensor.
    pub connected: bool,
    /// The voltage output of the axis is enabled.
    pub enabled: bool,
    /// The axis is moving.
    pub moving: bool,
    /// The target is reached in automatic positioning.
    pub target_reached: bool,
    /// End of travel detected in forward direction.
    pub eot_forward: bool,
    /// End of travel detected in backward direction.
    pub eot_backward: bool,
    /// The sensor is in error state.
    pub sensor_error: bool,
}

impl StatusFlags for ExtendedStatus {
    const WIDTH: usize = 7;

    fn from_flags(flags: &[bool]) -> Self {
        Self {
            connected: flags[0],
            enabled: flags[1],
            moving: flags[2],
            target_reached: flags[3],
            eot_forward: flags[4],
            eot_backward: flags[5],
            sensor_error: flags[6],
        }
    }

    fn to_flags(&self) -> Vec<bool> {
        vec![
            self.connected,
            self.enabled,
            self.moving,
            self.target_reached,
            self.eot_forward,
            self.eot_backward,
            self.sensor_error,
        ]
    }

    fn is_moving(&self) -> bool {
        self.moving
    }

    fn is_target_reached(&self) -> bool {
        self.target_reached
    }

    fn fault_condition(&self) -> Option<Fault> {
        if self.sensor_error {
            Some(Fault::SensorError)
        } else if self.eot_forward || self.eot_backward {
            Some(Fault::EndOfTravel)
        } else {
            None
        }
    }
}
