#![warn(missing_docs)]

//! Deterministic in-process emulation of a three-axis ANC350.
//!
//! Each status query of an axis advances its motion by one step, so a test can count samples exactly.

mod axis;
mod option;
mod status;

pub use axis::AxisEmulator;
pub use option::EmulatorOption;
pub use status::Emulated;

use std::{marker::PhantomData, time::Instant};

use anc350_core::{
    axis::{Axis, NUM_AXES},
    position::{Move, Position},
    positioner::{Positioner, PositionerError},
    status::StatusFlags,
};

/// An emulated positioner reporting `St` status flags.
#[derive(Debug)]
pub struct Emulator<St: Emulated> {
    axes: [AxisEmulator; NUM_AXES],
    option: EmulatorOption,
    open: bool,
    broken: bool,
    _phantom: PhantomData<St>,
}

impl<St: Emulated> Default for Emulator<St> {
    fn default() -> Self {
        Self::new()
    }
}

impl<St: Emulated> Emulator<St> {
    /// Creates an emulator with the default option of `St`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_option(St::default_option())
    }

    /// Creates an emulator with `option`.
    #[must_use]
    pub fn with_option(option: EmulatorOption) -> Self {
        Self {
            axes: option.initial.map(AxisEmulator::new),
            option,
            open: true,
            broken: false,
            _phantom: PhantomData,
        }
    }

    /// The option the emulator was created with.
    #[must_use]
    pub const fn option(&self) -> &EmulatorOption {
        &self.option
    }

    /// The state of `axis`.
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> &AxisEmulator {
        &self.axes[axis.idx()]
    }

    /// Makes every subsequent call fail as if the connection was lost.
    pub fn break_down(&mut self) {
        self.broken = true;
    }

    /// Restores the connection lost by [`Emulator::break_down`].
    pub fn repair(&mut self) {
        self.broken = false;
    }

    /// Sets the sensor error flag of `axis`.
    pub fn inject_sensor_error(&mut self, axis: Axis, error: bool) {
        self.axes[axis.idx()].sensor_error = error;
    }

    /// Connects or disconnects the sensor of `axis`.
    pub fn set_sensor_connected(&mut self, axis: Axis, connected: bool) {
        self.axes[axis.idx()].sensor_connected = connected;
    }

    /// Enables or disables the output of `axis`. An axis with disabled output does not move.
    pub fn set_output(&mut self, axis: Axis, enable: bool) {
        let state = &mut self.axes[axis.idx()];
        state.output_enabled = enable;
        if !enable {
            state.stop();
        }
    }

    fn ensure_is_available(&self) -> Result<(), PositionerError> {
        if !self.open {
            return Err(PositionerError::NotConnected);
        }
        if self.broken {
            return Err(PositionerError::Communication(
                "emulated connection is lost".to_string(),
            ));
        }
        Ok(())
    }
}

impl<St: Emulated> Positioner for Emulator<St> {
    type Status = St;

    fn query_status(&mut self, axis: Axis) -> Result<u64, PositionerError> {
        self.ensure_is_available()?;
        let state = &mut self.axes[axis.idx()];
        state.queries += 1;
        state.step(&self.option);
        let status = St::from_axis(state);
        tracing::trace!("{}: {:.6e}, {:?}", axis, state.position, status);
        Ok(status.encode())
    }

    fn query_position(&mut self, axis: Axis) -> Result<Position, PositionerError> {
        self.ensure_is_available()?;
        Ok(St::position(self.axes[axis.idx()].position))
    }

    fn issue_move(&mut self, axis: Axis, mv: Move) -> Result<(), PositionerError> {
        self.ensure_is_available()?;
        tracing::debug!("{}: {}", axis, mv);
        let now = Instant::now();
        let state = &mut self.axes[axis.idx()];
        if !state.output_enabled {
            return Ok(());
        }
        match mv {
            Move::Absolute(target) => state.approach(target.value(), now),
            Move::Relative(delta) => state.approach(state.position + delta.value(), now),
            Move::Continuous(dir) => state.run(dir, now),
        }
        Ok(())
    }

    fn issue_stop(&mut self, axis: Axis) -> Result<(), PositionerError> {
        self.ensure_is_available()?;
        tracing::debug!("{}: stop", axis);
        self.axes[axis.idx()].stop();
        Ok(())
    }

    fn close(&mut self) -> Result<(), PositionerError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
