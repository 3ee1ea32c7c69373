use std::ffi::{c_char, c_void, CStr};

use anc350_core::{
    axis::Axis,
    bitmask,
    position::{Direction, Move, Position},
    positioner::{Positioner, PositionerError},
    status::ExtendedStatus,
};

use crate::{
    library::{call, NativeLibrary},
    DriverVersion, Interfaces, NativeError, NativeOption,
};

bitflags::bitflags! {
    /// Features enabled on the device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceFeatures: u32 {
        /// Ethernet.
        const SYNC = 1 << 0;
        /// Low power loss measurement.
        const LOCKIN = 1 << 1;
        /// Duty cycle.
        const DUTY = 1 << 2;
        /// Control by the iOS app.
        const APP = 1 << 3;
    }
}

/// The type of the ANC350 device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DeviceType {
    /// ANC350 with resistive sensors.
    Res = 0,
    /// ANC350 with NUM sensors.
    Num = 1,
    /// ANC350 with FPS sensors.
    Fps = 2,
    /// ANC350 without sensors.
    None = 3,
}

impl TryFrom<i32> for DeviceType {
    type Error = NativeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DeviceType::Res),
            1 => Ok(DeviceType::Num),
            2 => Ok(DeviceType::Fps),
            3 => Ok(DeviceType::None),
            _ => Err(NativeError::DriverError),
        }
    }
}

/// The type of the actuator selected for an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ActuatorType {
    /// Linear positioner.
    Linear = 0,
    /// Goniometer.
    Goniometer = 1,
    /// Rotator.
    Rotator = 2,
}

impl TryFrom<i32> for ActuatorType {
    type Error = NativeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ActuatorType::Linear),
            1 => Ok(ActuatorType::Goniometer),
            2 => Ok(ActuatorType::Rotator),
            _ => Err(NativeError::DriverError),
        }
    }
}

/// The source of external step triggering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExtTriggerMode {
    /// No external triggering.
    Disable = 0,
    /// Steps from the quadrature input.
    Quadrature = 1,
    /// Steps from the trigger input.
    Trigger = 2,
}

/// Information about a discovered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// The sensor type of the device.
    pub device_type: DeviceType,
    /// The programmed hardware ID.
    pub id: i32,
    /// The serial number.
    pub serial: String,
    /// The IP address in dotted-decimal notation, or `USB`.
    pub address: String,
    /// The device is already connected.
    pub connected: bool,
}

#[derive(Debug)]
struct DeviceHandle(*mut c_void);

// The handle is only passed back to the library, which serializes access per device.
unsafe impl Send for DeviceHandle {}

const fn bln(value: bool) -> i32 {
    value as i32
}

fn metric(pos: Position) -> Result<f64, NativeError> {
    match pos {
        Position::Metric(v) => Ok(v),
        Position::Scaled(_) => Err(NativeError::UnsupportedPosition("Scaled")),
    }
}

fn c_string(buf: &[u8]) -> String {
    CStr::from_bytes_until_nul(buf)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(buf).into_owned())
}

// Packs the flags of `ANC_getAxisStatus` in the order of `ExtendedStatus`.
fn pack_axis_status(flags: [i32; 7]) -> u64 {
    bitmask::encode(flags.map(|flag| flag != 0))
}

/// A [`Positioner`] using the version 3 or 4 library (`anc350v3`, `anc350v4`).
///
/// Positions are [`Position::Metric`] values in metres, or degrees for goniometers and rotators.
#[derive(Debug)]
pub struct Anc350v4 {
    lib: NativeLibrary,
    device: DeviceHandle,
    open: bool,
}

impl Anc350v4 {
    /// Loads the library, discovers devices on [`NativeOption::interfaces`] and connects to the device at [`NativeOption::device_index`].
    #[tracing::instrument(level = "debug")]
    pub fn open(option: NativeOption) -> Result<Self, NativeError> {
        if option.version == DriverVersion::V2 {
            return Err(NativeError::UnsupportedVersion(option.version, DriverVersion::V4));
        }
        let lib = NativeLibrary::load(&option)?;
        let count = Self::discover_impl(&lib, option.interfaces)?;
        tracing::info!("{} ANC350 found", count);
        if option.device_index >= count {
            return Err(NativeError::DeviceNotFound(option.device_index));
        }
        let mut device: *mut c_void = std::ptr::null_mut();
        call!(lib, "ANC_connect", fn(u32, *mut *mut c_void), option.device_index, &mut device as *mut _)?;
        Ok(Self {
            lib,
            device: DeviceHandle(device),
            open: true,
        })
    }

    fn discover_impl(lib: &NativeLibrary, interfaces: Interfaces) -> Result<u32, NativeError> {
        let mut count = 0;
        call!(lib, "ANC_discover", fn(u32, *mut u32), interfaces.bits(), &mut count as *mut _)?;
        Ok(count)
    }

    fn handle(&self) -> *mut c_void {
        self.device.0
    }

    /// Returns information about the device at `index` of the last discovery.
    pub fn device_info(&self, index: u32) -> Result<DeviceInfo, NativeError> {
        let mut device_type = 0;
        let mut id = 0;
        let mut serial = [0u8; 16];
        let mut address = [0u8; 16];
        let mut connected = 0;
        call!(
            self.lib,
            "ANC_getDeviceInfo",
            fn(u32, *mut i32, *mut i32, *mut c_char, *mut c_char, *mut i32),
            index,
            &mut device_type as *mut _,
            &mut id as *mut _,
            serial.as_mut_ptr() as *mut c_char,
            address.as_mut_ptr() as *mut c_char,
            &mut connected as *mut _
        )?;
        Ok(DeviceInfo {
            device_type: DeviceType::try_from(device_type)?,
            id,
            serial: c_string(&serial),
            address: c_string(&address),
            connected: connected != 0,
        })
    }

    /// Reads the features enabled on the device.
    pub fn device_config(&self) -> Result<DeviceFeatures, NativeError> {
        let mut features = 0;
        call!(self.lib, "ANC_getDeviceConfig", fn(*mut c_void, *mut u32), self.handle(), &mut features as *mut _)?;
        Ok(DeviceFeatures::from_bits_truncate(features))
    }

    /// Reads the status flags of `axis` packed as an [`ExtendedStatus`] bitmask.
    pub fn axis_status(&self, axis: Axis) -> Result<u64, NativeError> {
        let mut flags = [0i32; 7];
        let [connected, enabled, moving, target, eot_fwd, eot_bwd, error] = &mut flags;
        call!(
            self.lib,
            "ANC_getAxisStatus",
            fn(*mut c_void, u32, *mut i32, *mut i32, *mut i32, *mut i32, *mut i32, *mut i32, *mut i32),
            self.handle(),
            axis.idx() as u32,
            connected as *mut _,
            enabled as *mut _,
            moving as *mut _,
            target as *mut _,
            eot_fwd as *mut _,
            eot_bwd as *mut _,
            error as *mut _
        )?;
        Ok(pack_axis_status(flags))
    }

    /// Enables or disables the voltage output of `axis`. With `auto_disable`, the output is disabled on end of travel.
    pub fn set_axis_output(&self, axis: Axis, enable: bool, auto_disable: bool) -> Result<(), NativeError> {
        call!(
            self.lib,
            "ANC_setAxisOutput",
            fn(*mut c_void, u32, i32, i32),
            self.handle(),
            axis.idx() as u32,
            bln(enable),
            bln(auto_disable)
        )
    }

    fn set_f64(&self, name: &'static str, axis: Axis, value: f64) -> Result<(), NativeError> {
        let code = unsafe {
            self.lib.symbol::<unsafe extern "system" fn(*mut c_void, u32, f64) -> i32>(name)?(
                self.handle(),
                axis.idx() as u32,
                value,
            )
        };
        self.lib.check(name, code)
    }

    fn get_f64(&self, name: &'static str, axis: Axis) -> Result<f64, NativeError> {
        let mut value = 0.;
        let code = unsafe {
            self.lib.symbol::<unsafe extern "system" fn(*mut c_void, u32, *mut f64) -> i32>(name)?(
                self.handle(),
                axis.idx() as u32,
                &mut value as *mut _,
            )
        };
        self.lib.check(name, code)?;
        Ok(value)
    }

    fn set_u32(&self, name: &'static str, axis: Axis, value: u32) -> Result<(), NativeError> {
        let code = unsafe {
            self.lib.symbol::<unsafe extern "system" fn(*mut c_void, u32, u32) -> i32>(name)?(
                self.handle(),
                axis.idx() as u32,
                value,
            )
        };
        self.lib.check(name, code)
    }

    /// Sets the amplitude in V.
    pub fn set_amplitude(&self, axis: Axis, amplitude: f64) -> Result<(), NativeError> {
        self.set_f64("ANC_setAmplitude", axis, amplitude)
    }

    /// Sets the frequency in Hz.
    pub fn set_frequency(&self, axis: Axis, frequency: f64) -> Result<(), NativeError> {
        self.set_f64("ANC_setFrequency", axis, frequency)
    }

    /// Sets the DC voltage in V.
    pub fn set_dc_voltage(&self, axis: Axis, voltage: f64) -> Result<(), NativeError> {
        self.set_f64("ANC_setDcVoltage", axis, voltage)
    }

    /// Gets the amplitude in V.
    pub fn amplitude(&self, axis: Axis) -> Result<f64, NativeError> {
        self.get_f64("ANC_getAmplitude", axis)
    }

    /// Gets the frequency in Hz.
    pub fn frequency(&self, axis: Axis) -> Result<f64, NativeError> {
        self.get_f64("ANC_getFrequency", axis)
    }

    /// Triggers a single step.
    pub fn start_single_step(&self, axis: Axis, dir: Direction) -> Result<(), NativeError> {
        call!(
            self.lib,
            "ANC_startSingleStep",
            fn(*mut c_void, u32, i32),
            self.handle(),
            axis.idx() as u32,
            bln(dir.is_backward())
        )
    }

    /// Starts or stops a continuous move.
    pub fn start_continuous_move(&self, axis: Axis, start: bool, dir: Direction) -> Result<(), NativeError> {
        call!(
            self.lib,
            "ANC_startContinousMove",
            fn(*mut c_void, u32, i32, i32),
            self.handle(),
            axis.idx() as u32,
            bln(start),
            bln(dir.is_backward())
        )
    }

    /// Enables or disables the approach to the target set by [`Anc350v4::set_target_position`].
    pub fn start_auto_move(&self, axis: Axis, enable: bool, relative: bool) -> Result<(), NativeError> {
        call!(
            self.lib,
            "ANC_startAutoMove",
            fn(*mut c_void, u32, i32, i32),
            self.handle(),
            axis.idx() as u32,
            bln(enable),
            bln(relative)
        )
    }

    /// Sets the target of the next auto move in m or °.
    pub fn set_target_position(&self, axis: Axis, target: f64) -> Result<(), NativeError> {
        self.set_f64("ANC_setTargetPosition", axis, target)
    }

    /// Sets the range around the target within which the target is considered reached.
    pub fn set_target_range(&self, axis: Axis, range: f64) -> Result<(), NativeError> {
        self.set_f64("ANC_setTargetRange", axis, range)
    }

    /// Gets the current position in m or °.
    pub fn position(&self, axis: Axis) -> Result<f64, NativeError> {
        self.get_f64("ANC_getPosition", axis)
    }

    /// Gets the firmware version of the device.
    pub fn firmware_version(&self) -> Result<i32, NativeError> {
        let mut version = 0;
        call!(self.lib, "ANC_getFirmwareVersion", fn(*mut c_void, *mut i32), self.handle(), &mut version as *mut _)?;
        Ok(version)
    }

    /// Selects the external step trigger of `axis`.
    pub fn configure_ext_trigger(&self, axis: Axis, mode: ExtTriggerMode) -> Result<(), NativeError> {
        self.set_u32("ANC_configureExtTrigger", axis, mode as u32)
    }

    /// Configures the A-Quad-B input for the target position. `resolution` is the step width in m.
    pub fn configure_aquadb_in(&self, axis: Axis, enable: bool, resolution: f64) -> Result<(), NativeError> {
        call!(
            self.lib,
            "ANC_configureAQuadBIn",
            fn(*mut c_void, u32, i32, f64),
            self.handle(),
            axis.idx() as u32,
            bln(enable),
            resolution
        )
    }

    /// Configures the A-Quad-B output of the current position. `clock` is in s.
    pub fn configure_aquadb_out(
        &self,
        axis: Axis,
        enable: bool,
        resolution: f64,
        clock: f64,
    ) -> Result<(), NativeError> {
        call!(
            self.lib,
            "ANC_configureAQuadBOut",
            fn(*mut c_void, u32, i32, f64, f64),
            self.handle(),
            axis.idx() as u32,
            bln(enable),
            resolution,
            clock
        )
    }

    /// Sets the polarity of the range trigger. `high` is active high.
    pub fn configure_rng_trigger_pol(&self, axis: Axis, high: bool) -> Result<(), NativeError> {
        self.set_u32("ANC_configureRngTriggerPol", axis, u32::from(high))
    }

    /// Configures the range trigger bounds in nm.
    pub fn configure_rng_trigger(&self, axis: Axis, lower: u32, upper: u32) -> Result<(), NativeError> {
        call!(
            self.lib,
            "ANC_configureRngTrigger",
            fn(*mut c_void, u32, u32, u32),
            self.handle(),
            axis.idx() as u32,
            lower,
            upper
        )
    }

    /// Sets the hysteresis of the range trigger in nm.
    pub fn configure_rng_trigger_eps(&self, axis: Axis, epsilon: u32) -> Result<(), NativeError> {
        self.set_u32("ANC_configureRngTriggerEps", axis, epsilon)
    }

    /// Enables or disables the trigger from the NSL input.
    pub fn configure_nsl_trigger(&self, enable: bool) -> Result<(), NativeError> {
        call!(self.lib, "ANC_configureNslTrigger", fn(*mut c_void, i32), self.handle(), bln(enable))
    }

    /// Selects the axis moved by the NSL trigger.
    pub fn configure_nsl_trigger_axis(&self, axis: Axis) -> Result<(), NativeError> {
        call!(
            self.lib,
            "ANC_configureNslTriggerAxis",
            fn(*mut c_void, u32),
            self.handle(),
            axis.idx() as u32
        )
    }

    /// Selects an actuator preset for `axis`.
    pub fn select_actuator(&self, axis: Axis, actuator: u32) -> Result<(), NativeError> {
        self.set_u32("ANC_selectActuator", axis, actuator)
    }

    /// Gets the name of the selected actuator.
    pub fn actuator_name(&self, axis: Axis) -> Result<String, NativeError> {
        let mut name = [0u8; 20];
        call!(
            self.lib,
            "ANC_getActuatorName",
            fn(*mut c_void, u32, *mut c_char),
            self.handle(),
            axis.idx() as u32,
            name.as_mut_ptr() as *mut c_char
        )?;
        Ok(c_string(&name))
    }

    /// Gets the type of the selected actuator.
    pub fn actuator_type(&self, axis: Axis) -> Result<ActuatorType, NativeError> {
        let mut ty = 0i32;
        call!(
            self.lib,
            "ANC_getActuatorType",
            fn(*mut c_void, u32, *mut i32),
            self.handle(),
            axis.idx() as u32,
            &mut ty as *mut _
        )?;
        ActuatorType::try_from(ty)
    }

    /// Measures the capacitance of the piezo in F. Blocks for a few seconds.
    pub fn measure_capacitance(&self, axis: Axis) -> Result<f64, NativeError> {
        self.get_f64("ANC_measureCapacitance", axis)
    }

    /// Saves amplitude, frequency, actuator selection, trigger and quadrature settings to the device flash.
    pub fn save_params(&self) -> Result<(), NativeError> {
        call!(self.lib, "ANC_saveParams", fn(*mut c_void), self.handle())
    }

    fn ensure_is_open(&self) -> Result<(), NativeError> {
        if self.open {
            Ok(())
        } else {
            Err(NativeError::NotConnected)
        }
    }
}

impl Positioner for Anc350v4 {
    type Status = ExtendedStatus;

    fn query_status(&mut self, axis: Axis) -> Result<u64, PositionerError> {
        self.ensure_is_open()?;
        Ok(self.axis_status(axis)?)
    }

    fn query_position(&mut self, axis: Axis) -> Result<Position, PositionerError> {
        self.ensure_is_open()?;
        Ok(Position::Metric(self.position(axis)?))
    }

    fn issue_move(&mut self, axis: Axis, mv: Move) -> Result<(), PositionerError> {
        self.ensure_is_open()?;
        match mv {
            Move::Absolute(target) => {
                self.set_target_position(axis, metric(target)?)?;
                self.start_auto_move(axis, true, false)?;
            }
            Move::Relative(delta) => {
                self.set_target_position(axis, metric(delta)?)?;
                self.start_auto_move(axis, true, true)?;
            }
            Move::Continuous(dir) => self.start_continuous_move(axis, true, dir)?,
        }
        Ok(())
    }

    fn issue_stop(&mut self, axis: Axis) -> Result<(), PositionerError> {
        self.ensure_is_open()?;
        self.start_auto_move(axis, false, false)?;
        self.start_continuous_move(axis, false, Direction::Forward)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PositionerError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        call!(self.lib, "ANC_disconnect", fn(*mut c_void), self.handle())?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use anc350_core::status::StatusFlags;

    use super::*;

    #[rstest::rstest]
    #[case(ExtendedStatus::new(true, true, true, false, false, false, false), [1, 1, 1, 0, 0, 0, 0])]
    #[case(ExtendedStatus::new(true, true, false, true, false, false, false), [1, 1, 0, 1, 0, 0, 0])]
    #[case(ExtendedStatus::new(false, true, true, false, true, false, true), [0, 1, 1, 0, 1, 0, 1])]
    #[case(ExtendedStatus::new(true, false, false, false, false, true, false), [1, 0, 0, 0, 0, 1, 0])]
    #[test]
    fn axis_status_packing(#[case] expect: ExtendedStatus, #[case] flags: [i32; 7]) -> anyhow::Result<()> {
        assert_eq!(expect, ExtendedStatus::decode(pack_axis_status(flags))?);
        Ok(())
    }

    #[test]
    fn nonzero_flag_is_set() {
        assert_eq!(0b000_0101, pack_axis_status([-1, 0, 2, 0, 0, 0, 0]));
    }

    #[rstest::rstest]
    #[case(DeviceFeatures::SYNC | DeviceFeatures::DUTY, 0b0101)]
    #[case(DeviceFeatures::all(), 0xFF)]
    #[case(DeviceFeatures::empty(), 0)]
    #[test]
    fn device_features(#[case] expect: DeviceFeatures, #[case] bits: u32) {
        assert_eq!(expect, DeviceFeatures::from_bits_truncate(bits));
    }

    #[rstest::rstest]
    #[case("ANPx101res", b"ANPx101res\0\0\0\0\0\0\0\0\0\0")]
    #[case("USB", b"USB\0garbage\0")]
    #[case("0123456789ABCDEF", b"0123456789ABCDEF")]
    #[test]
    fn string_buffer(#[case] expect: &str, #[case] buf: &[u8]) {
        assert_eq!(expect, c_string(buf));
    }

    #[rstest::rstest]
    #[case(Ok(ActuatorType::Goniometer), 1)]
    #[case(Err(NativeError::DriverError), 3)]
    #[test]
    fn actuator_type(#[case] expect: Result<ActuatorType, NativeError>, #[case] raw: i32) {
        assert_eq!(expect, ActuatorType::try_from(raw));
    }

    #[rstest::rstest]
    #[case(Ok(9e-3), Position::Metric(9e-3))]
    #[case(Err(NativeError::UnsupportedPosition("Scaled")), Position::Scaled(9))]
    #[test]
    fn metric_position(#[case] expect: Result<f64, NativeError>, #[case] pos: Position) {
        assert_eq!(expect, metric(pos));
    }

    #[test]
    fn open_rejects_v2() {
        assert_eq!(
            Err(NativeError::UnsupportedVersion(DriverVersion::V2, DriverVersion::V4)),
            Anc350v4::open(NativeOption::v2()).map(|_| ())
        );
    }
}
