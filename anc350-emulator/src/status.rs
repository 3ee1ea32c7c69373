use std::time::Duration;

use anc350_core::{
    axis::NUM_AXES,
    position::Position,
    status::{ExtendedStatus, LegacyStatus, StatusFlags},
};

use crate::{AxisEmulator, EmulatorOption};

/// A status variant that can be reported by the [`Emulator`].
///
/// [`Emulator`]: crate::Emulator
pub trait Emulated: StatusFlags {
    /// The option with a step and limits suited to the position unit.
    fn default_option() -> EmulatorOption;

    /// Builds the status from the state of an axis.
    fn from_axis(axis: &AxisEmulator) -> Self;

    /// Converts an emulated position to the reported position.
    fn position(value: f64) -> Position;
}

impl Emulated for LegacyStatus {
    // 0.1 mm steps on a 5 mm travel in nanometres
    fn default_option() -> EmulatorOption {
        EmulatorOption {
            step: 100_000.,
            target_range: 100.,
            limits: (0., 5_000_000.),
            initial: [0.; NUM_AXES],
            latency: Duration::ZERO,
        }
    }

    fn from_axis(axis: &AxisEmulator) -> Self {
        let (eot_forward, eot_backward) = axis.eot();
        Self {
            moving: axis.is_moving(),
            stop_detected: eot_forward || eot_backward,
            sensor_error: axis.has_sensor_error(),
            sensor_disconnected: !axis.is_sensor_connected(),
        }
    }

    fn position(value: f64) -> Position {
        Position::Scaled(value.round() as i32)
    }
}

impl Emulated for ExtendedStatus {
    fn default_option() -> EmulatorOption {
        EmulatorOption {
            step: 1e-4,
            target_range: 1e-7,
            limits: (0., 5e-3),
            initial: [0.; NUM_AXES],
            latency: Duration::ZERO,
        }
    }

    fn from_axis(axis: &AxisEmulator) -> Self {
        let (eot_forward, eot_backward) = axis.eot();
        Self {
            connected: axis.is_sensor_connected(),
            enabled: axis.is_output_enabled(),
            moving: axis.is_moving(),
            target_reached: axis.is_target_reached(),
            eot_forward,
            eot_backward,
            sensor_error: axis.has_sensor_error(),
        }
    }

    fn position(value: f64) -> Position {
        Position::Metric(value)
    }
}
