use std::ffi::CString;

use anc350_core::{
    axis::{Axis, AxisSet},
    position::{Direction, Move, Position},
    positioner::{Positioner, PositionerError},
    status::LegacyStatus,
};

use crate::{
    library::{call, NativeLibrary},
    DriverVersion, NativeError, NativeOption,
};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct RawPositionerInfo {
    id: i32,
    locked: i32,
}

/// The hardware ID and lock state of the first device found by [`Anc350v2`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionerInfo {
    /// The number of connected devices.
    pub count: i32,
    /// The hardware ID.
    pub id: i32,
    /// The device is locked by another application.
    pub locked: bool,
}

/// The type of amplitude control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AmplitudeControl {
    /// Holds the speed constant.
    Speed = 0,
    /// Holds the amplitude constant (open loop).
    Amplitude = 1,
    /// Holds the step width constant.
    StepWidth = 2,
}

/// The reference position of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// The reference position.
    pub position: i32,
    /// The reference position is valid.
    pub valid: bool,
}

const fn bln(value: bool) -> i32 {
    value as i32
}

fn scaled(pos: Position) -> Result<i32, NativeError> {
    match pos {
        Position::Scaled(v) => Ok(v),
        Position::Metric(_) => Err(NativeError::UnsupportedPosition("Metric")),
    }
}

/// A [`Positioner`] using the version 2 library (`anc350v2`).
///
/// Positions are [`Position::Scaled`] values in the actuator unit multiplied by 1000.
/// The exported functions are the decorated stdcall names of the 32-bit library.
#[derive(Debug)]
pub struct Anc350v2 {
    lib: NativeLibrary,
    handle: i32,
    info: PositionerInfo,
    open: bool,
}

impl Anc350v2 {
    /// Loads the library and connects to the device at [`NativeOption::device_index`].
    #[tracing::instrument(level = "debug")]
    pub fn open(option: NativeOption) -> Result<Self, NativeError> {
        if option.version != DriverVersion::V2 {
            return Err(NativeError::UnsupportedVersion(option.version, DriverVersion::V2));
        }
        let lib = NativeLibrary::load(&option)?;
        let info = Self::check_impl(&lib)?;
        tracing::info!(
            "{} ANC350 connected, id: {}, locked: {}",
            info.count,
            info.id,
            info.locked
        );
        if info.count <= 0 || option.device_index >= info.count as u32 {
            return Err(NativeError::DeviceNotFound(option.device_index));
        }
        let mut handle = 0i32;
        call!(lib, "_PositionerConnect@8", fn(i32, *mut i32), option.device_index as i32, &mut handle as *mut _)?;
        Ok(Self {
            lib,
            handle,
            info,
            open: true,
        })
    }

    fn check_impl(lib: &NativeLibrary) -> Result<PositionerInfo, NativeError> {
        let mut raw = RawPositionerInfo::default();
        let count = unsafe {
            lib.symbol::<unsafe extern "system" fn(*mut RawPositionerInfo) -> i32>(
                "_PositionerCheck@4",
            )?(&mut raw as *mut _)
        };
        Ok(PositionerInfo {
            count,
            id: raw.id,
            locked: raw.locked != 0,
        })
    }

    /// The device information found on connection.
    #[must_use]
    pub const fn info(&self) -> PositionerInfo {
        self.info
    }

    /// Determines the number of connected devices and the hardware ID of the first one.
    pub fn check(&self) -> Result<PositionerInfo, NativeError> {
        Self::check_impl(&self.lib)
    }

    fn get_i32(&self, name: &'static str, axis: Axis) -> Result<i32, NativeError> {
        let mut value = 0;
        let code = unsafe {
            self.lib.symbol::<unsafe extern "system" fn(i32, i32, *mut i32) -> i32>(name)?(
                self.handle,
                i32::from(axis),
                &mut value as *mut _,
            )
        };
        self.lib.check(name, code)?;
        Ok(value)
    }

    fn set_i32(&self, name: &'static str, axis: Axis, value: i32) -> Result<(), NativeError> {
        let code = unsafe {
            self.lib.symbol::<unsafe extern "system" fn(i32, i32, i32) -> i32>(name)?(
                self.handle,
                i32::from(axis),
                value,
            )
        };
        self.lib.check(name, code)
    }

    fn axis_only(&self, name: &'static str, axis: Axis) -> Result<(), NativeError> {
        let code = unsafe {
            self.lib.symbol::<unsafe extern "system" fn(i32, i32) -> i32>(name)?(
                self.handle,
                i32::from(axis),
            )
        };
        self.lib.check(name, code)
    }

    fn device_only(&self, name: &'static str, value: i32) -> Result<(), NativeError> {
        let code = unsafe {
            self.lib.symbol::<unsafe extern "system" fn(i32, i32) -> i32>(name)?(
                self.handle,
                value,
            )
        };
        self.lib.check(name, code)
    }

    fn indexed(&self, name: &'static str, index: i32, value: i32) -> Result<(), NativeError> {
        let code = unsafe {
            self.lib.symbol::<unsafe extern "system" fn(i32, i32, i32) -> i32>(name)?(
                self.handle,
                index,
                value,
            )
        };
        self.lib.check(name, code)
    }

    /// Activates or deactivates the AC input of a dither axis.
    pub fn set_ac_in_enable(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerAcInEnable@12", axis, bln(enable))
    }

    /// Sets the amplitude setpoint in mV.
    pub fn set_amplitude(&self, axis: Axis, amplitude: i32) -> Result<(), NativeError> {
        self.set_i32("_PositionerAmplitude@12", axis, amplitude)
    }

    /// Selects the type of amplitude control.
    pub fn set_amplitude_control(&self, axis: Axis, mode: AmplitudeControl) -> Result<(), NativeError> {
        self.set_i32("_PositionerAmplitudeControl@12", axis, mode as i32)
    }

    /// Activates or deactivates the bandwidth limiter of a scanner axis.
    pub fn set_bandwidth_limit_enable(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerBandwidthLimitEnable@12", axis, bln(enable))
    }

    /// Measures the capacitance of the piezo in nF.
    pub fn cap_measure(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerCapMeasure@12", axis)
    }

    /// Clears the stop detection status when the stop detection is sticky.
    pub fn clear_stop_detection(&self, axis: Axis) -> Result<(), NativeError> {
        self.axis_only("_PositionerClearStopDetection@8", axis)
    }

    /// Activates or deactivates the DC input of a scanner axis.
    pub fn set_dc_in_enable(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerDcInEnable@12", axis, bln(enable))
    }

    /// Sets the DC level in mV.
    pub fn set_dc_level(&self, axis: Axis, level: i32) -> Result<(), NativeError> {
        self.set_i32("_PositionerDCLevel@12", axis, level)
    }

    /// Enables or disables the duty cycle mode.
    pub fn set_duty_cycle_enable(&self, enable: bool) -> Result<(), NativeError> {
        self.device_only("_PositionerDutyCycleEnable@8", bln(enable))
    }

    /// Sets the off time of the duty cycle in ms.
    pub fn set_duty_cycle_off_time(&self, value: i32) -> Result<(), NativeError> {
        self.device_only("_PositionerDutyCycleOffTime@8", value)
    }

    /// Sets the period of the duty cycle in ms.
    pub fn set_duty_cycle_period(&self, value: i32) -> Result<(), NativeError> {
        self.device_only("_PositionerDutyCyclePeriod@8", value)
    }

    /// Sets the trigger input for backward external steps. `0` disables it.
    pub fn set_external_step_bkw_input(&self, axis: Axis, input: i32) -> Result<(), NativeError> {
        self.set_i32("_PositionerExternalStepBkwInput@12", axis, input)
    }

    /// Sets the trigger input for forward external steps. `0` disables it.
    pub fn set_external_step_fwd_input(&self, axis: Axis, input: i32) -> Result<(), NativeError> {
        self.set_i32("_PositionerExternalStepFwdInput@12", axis, input)
    }

    /// Selects the edge of external step inputs, `0` for rising and `1` for falling.
    pub fn set_external_step_input_edge(&self, axis: Axis, edge: i32) -> Result<(), NativeError> {
        self.set_i32("_PositionerExternalStepInputEdge@12", axis, edge)
    }

    /// Sets the frequency in Hz.
    pub fn set_frequency(&self, axis: Axis, frequency: i32) -> Result<(), NativeError> {
        self.set_i32("_PositionerFrequency@12", axis, frequency)
    }

    /// Checks if the AC input is enabled.
    pub fn ac_in_enable(&self, axis: Axis) -> Result<bool, NativeError> {
        Ok(self.get_i32("_PositionerGetAcInEnable@12", axis)? != 0)
    }

    /// Gets the amplitude in mV.
    pub fn amplitude(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetAmplitude@12", axis)
    }

    /// Checks if the bandwidth limit is enabled.
    pub fn bandwidth_limit_enable(&self, axis: Axis) -> Result<bool, NativeError> {
        Ok(self.get_i32("_PositionerGetBandwidthLimitEnable@12", axis)? != 0)
    }

    /// Checks if the DC input is enabled.
    pub fn dc_in_enable(&self, axis: Axis) -> Result<bool, NativeError> {
        Ok(self.get_i32("_PositionerGetDcInEnable@12", axis)? != 0)
    }

    /// Gets the DC level in mV.
    pub fn dc_level(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetDcLevel@12", axis)
    }

    /// Gets the frequency in Hz.
    pub fn frequency(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetFrequency@12", axis)
    }

    /// Checks if the internal signal generation is enabled.
    pub fn int_enable(&self, axis: Axis) -> Result<bool, NativeError> {
        Ok(self.get_i32("_PositionerGetIntEnable@12", axis)? != 0)
    }

    /// Gets the current position in nm or m°.
    pub fn position(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetPosition@12", axis)
    }

    /// Gets the reference position and whether it is valid.
    pub fn reference(&self, axis: Axis) -> Result<Reference, NativeError> {
        let mut position = 0;
        let mut valid = 0;
        call!(
            self.lib,
            "_PositionerGetReference@16",
            fn(i32, i32, *mut i32, *mut i32),
            self.handle,
            i32::from(axis),
            &mut position as *mut _,
            &mut valid as *mut _
        )?;
        Ok(Reference {
            position,
            valid: valid != 0,
        })
    }

    /// Gets the rotation count of the reference position.
    pub fn reference_rot_count(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetReferenceRotCount@12", axis)
    }

    /// Gets the rotation count.
    pub fn rot_count(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetRotCount@12", axis)
    }

    /// Gets the speed in nm/s or m°/s.
    pub fn speed(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetSpeed@12", axis)
    }

    /// Gets the status bitmask of `axis`. See [`LegacyStatus`] for the meaning of each bit.
    pub fn status(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetStatus@12", axis)
    }

    /// Gets the width of a single step in nm or m°.
    pub fn stepwidth(&self, axis: Axis) -> Result<i32, NativeError> {
        self.get_i32("_PositionerGetStepwidth@12", axis)
    }

    /// Activates or deactivates the internal signal generation of a dither axis.
    pub fn set_int_enable(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerIntEnable@12", axis, bln(enable))
    }

    /// Loads a parameter file for `axis`.
    pub fn load(&self, axis: Axis, filename: &str) -> Result<(), NativeError> {
        let filename = CString::new(filename).map_err(|_| NativeError::InvalidParam)?;
        call!(
            self.lib,
            "_PositionerLoad@12",
            fn(i32, i32, *const std::ffi::c_char),
            self.handle,
            i32::from(axis),
            filename.as_ptr()
        )
    }

    /// Starts an approach to an absolute position with a rotation count for rotators.
    pub fn move_absolute(&self, axis: Axis, position: i32, rot_count: i32) -> Result<(), NativeError> {
        call!(
            self.lib,
            "_PositionerMoveAbsolute@16",
            fn(i32, i32, i32, i32),
            self.handle,
            i32::from(axis),
            position,
            rot_count
        )
    }

    /// Starts a synchronized approach of `axes` to the targets set by [`Anc350v2::set_target_pos`].
    pub fn move_absolute_sync(&self, axes: AxisSet) -> Result<(), NativeError> {
        self.device_only("_PositionerMoveAbsoluteSync@8", axes.bits() as i32)
    }

    /// Starts a continuous move in `dir`.
    pub fn move_continuous(&self, axis: Axis, dir: Direction) -> Result<(), NativeError> {
        self.set_i32("_PositionerMoveContinuous@12", axis, dir as i32)
    }

    /// Starts an approach to the reference position.
    pub fn move_reference(&self, axis: Axis) -> Result<(), NativeError> {
        self.axis_only("_PositionerMoveReference@8", axis)
    }

    /// Starts an approach relative to the current position with a rotation count for rotators.
    pub fn move_relative(&self, axis: Axis, delta: i32, rot_count: i32) -> Result<(), NativeError> {
        call!(
            self.lib,
            "_PositionerMoveRelative@16",
            fn(i32, i32, i32, i32),
            self.handle,
            i32::from(axis),
            delta,
            rot_count
        )
    }

    /// Triggers a single step in `dir`.
    pub fn move_single_step(&self, axis: Axis, dir: Direction) -> Result<(), NativeError> {
        self.set_i32("_PositionerMoveSingleStep@12", axis, dir as i32)
    }

    /// Assigns `axis` to the quadrature interface `quadrature`.
    pub fn set_quadrature_axis(&self, quadrature: i32, axis: Axis) -> Result<(), NativeError> {
        self.indexed("_PositionerQuadratureAxis@12", quadrature, i32::from(axis))
    }

    /// Sets the step period of the quadrature input in nm.
    pub fn set_quadrature_input_period(&self, quadrature: i32, period: i32) -> Result<(), NativeError> {
        self.indexed("_PositionerQuadratureInputPeriod@12", quadrature, period)
    }

    /// Sets the step period of the quadrature output in nm.
    pub fn set_quadrature_output_period(&self, quadrature: i32, period: i32) -> Result<(), NativeError> {
        self.indexed("_PositionerQuadratureOutputPeriod@12", quadrature, period)
    }

    /// Sets the current position to zero.
    pub fn reset_position(&self, axis: Axis) -> Result<(), NativeError> {
        self.axis_only("_PositionerResetPosition@8", axis)
    }

    /// Switches the sensor power of group A.
    pub fn set_sensor_power_group_a(&self, enable: bool) -> Result<(), NativeError> {
        self.device_only("_PositionerSensorPowerGroupA@8", bln(enable))
    }

    /// Switches the sensor power of group B.
    pub fn set_sensor_power_group_b(&self, enable: bool) -> Result<(), NativeError> {
        self.device_only("_PositionerSensorPowerGroupB@8", bln(enable))
    }

    /// Programs the hardware ID used in [`PositionerInfo`].
    pub fn set_hardware_id(&self, id: i32) -> Result<(), NativeError> {
        self.device_only("_PositionerSetHardwareId@8", id)
    }

    /// Activates or deactivates the output of `axis`.
    pub fn set_output(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerSetOutput@12", axis, bln(enable))
    }

    /// Keeps the stop detection flag set until the next move.
    pub fn set_stop_detection_sticky(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerSetStopDetectionSticky@12", axis, bln(enable))
    }

    /// Grounds the output of `axis` after the target is reached.
    pub fn set_target_ground(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerSetTargetGround@12", axis, bln(enable))
    }

    /// Sets the target of `axis` for [`Anc350v2::move_absolute_sync`].
    pub fn set_target_pos(&self, axis: Axis, position: i32, rot_count: i32) -> Result<(), NativeError> {
        call!(
            self.lib,
            "_PositionerSetTargetPos@16",
            fn(i32, i32, i32, i32),
            self.handle,
            i32::from(axis),
            position,
            rot_count
        )
    }

    /// Restricts a rotator to a single revolution.
    pub fn set_single_circle_mode(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerSingleCircleMode@12", axis, bln(enable))
    }

    /// Sets the output voltage for resistive sensors in mV.
    pub fn set_static_amplitude(&self, amplitude: i32) -> Result<(), NativeError> {
        self.device_only("_PositionerStaticAmplitude@8", amplitude)
    }

    /// Triggers `steps` steps in the current direction.
    pub fn step_count(&self, axis: Axis, steps: i32) -> Result<(), NativeError> {
        self.set_i32("_PositionerStepCount@12", axis, steps)
    }

    /// Stops an approach.
    pub fn stop_approach(&self, axis: Axis) -> Result<(), NativeError> {
        self.axis_only("_PositionerStopApproach@8", axis)
    }

    /// Enables or disables the detection of blocked motion.
    pub fn set_stop_detection(&self, axis: Axis, enable: bool) -> Result<(), NativeError> {
        self.set_i32("_PositionerStopDetection@12", axis, bln(enable))
    }

    /// Stops a continuous move or single steps.
    pub fn stop_moving(&self, axis: Axis) -> Result<(), NativeError> {
        self.axis_only("_PositionerStopMoving@8", axis)
    }

    /// Sets the lower and upper thresholds of trigger `trigger`.
    pub fn set_trigger(&self, trigger: i32, low: i32, high: i32) -> Result<(), NativeError> {
        call!(
            self.lib,
            "_PositionerTrigger@16",
            fn(i32, i32, i32, i32),
            self.handle,
            trigger,
            low,
            high
        )
    }

    /// Assigns `axis` to trigger `trigger`.
    pub fn set_trigger_axis(&self, trigger: i32, axis: Axis) -> Result<(), NativeError> {
        self.indexed("_PositionerTriggerAxis@12", trigger, i32::from(axis))
    }

    /// Sets the hysteresis of trigger `trigger`.
    pub fn set_trigger_epsilon(&self, trigger: i32, epsilon: i32) -> Result<(), NativeError> {
        self.indexed("_PositionerTriggerEpsilon@12", trigger, epsilon)
    }

    /// Sets the mode of the trigger input.
    pub fn set_trigger_mode_in(&self, mode: i32) -> Result<(), NativeError> {
        self.device_only("_PositionerTriggerModeIn@8", mode)
    }

    /// Sets the mode of the trigger output.
    pub fn set_trigger_mode_out(&self, mode: i32) -> Result<(), NativeError> {
        self.device_only("_PositionerTriggerModeOut@8", mode)
    }

    /// Sets the polarity of trigger `trigger`.
    pub fn set_trigger_polarity(&self, trigger: i32, polarity: i32) -> Result<(), NativeError> {
        self.indexed("_PositionerTriggerPolarity@12", trigger, polarity)
    }

    /// Updates the target of an approach in progress.
    pub fn update_absolute(&self, axis: Axis, position: i32) -> Result<(), NativeError> {
        self.set_i32("_PositionerUpdateAbsolute@12", axis, position)
    }

    fn ensure_is_open(&self) -> Result<(), NativeError> {
        if self.open {
            Ok(())
        } else {
            Err(NativeError::NotConnected)
        }
    }
}

impl Positioner for Anc350v2 {
    type Status = LegacyStatus;

    fn query_status(&mut self, axis: Axis) -> Result<u64, PositionerError> {
        self.ensure_is_open()?;
        let status = self.status(axis)?;
        Ok(u64::try_from(status).map_err(|_| NativeError::DriverError)?)
    }

    fn query_position(&mut self, axis: Axis) -> Result<Position, PositionerError> {
        self.ensure_is_open()?;
        Ok(Position::Scaled(self.position(axis)?))
    }

    fn issue_move(&mut self, axis: Axis, mv: Move) -> Result<(), PositionerError> {
        self.ensure_is_open()?;
        match mv {
            Move::Absolute(target) => self.move_absolute(axis, scaled(target)?, 0)?,
            Move::Relative(delta) => self.move_relative(axis, scaled(delta)?, 0)?,
            Move::Continuous(dir) => self.move_continuous(axis, dir)?,
        }
        Ok(())
    }

    fn issue_stop(&mut self, axis: Axis) -> Result<(), PositionerError> {
        self.ensure_is_open()?;
        self.stop_approach(axis)?;
        self.stop_moving(axis)?;
        Ok(())
    }

    fn issue_move_sync(&mut self, targets: &[(Axis, Position)]) -> Result<(), PositionerError> {
        self.ensure_is_open()?;
        targets
            .iter()
            .try_for_each(|&(axis, target)| self.set_target_pos(axis, scaled(target)?, 0))?;
        self.move_absolute_sync(targets.iter().map(|&(axis, _)| axis).collect())?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PositionerError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        call!(self.lib, "_PositionerClose@4", fn(i32), self.handle)?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(Ok(2_000_000), Position::Scaled(2_000_000))]
    #[case(Ok(-1), Position::Scaled(-1))]
    #[case(Err(NativeError::UnsupportedPosition("Metric")), Position::Metric(2e-3))]
    #[test]
    fn scaled_position(#[case] expect: Result<i32, NativeError>, #[case] pos: Position) {
        assert_eq!(expect, scaled(pos));
    }

    #[test]
    fn open_rejects_other_version() {
        assert_eq!(
            Err(NativeError::UnsupportedVersion(DriverVersion::V4, DriverVersion::V2)),
            Anc350v2::open(NativeOption::default()).map(|_| ())
        );
    }

    #[test]
    fn open_without_library() {
        let option = NativeOption {
            library_path: Some("/nonexistent/libanc350v2.so".into()),
            ..NativeOption::v2()
        };
        assert!(matches!(
            Anc350v2::open(option),
            Err(NativeError::LibraryNotFound(_))
        ));
    }

    #[test]
    fn info_layout() {
        assert_eq!(8, std::mem::size_of::<RawPositionerInfo>());
    }
}
