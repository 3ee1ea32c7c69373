use std::time::Instant;

use anc350_core::position::Direction;

use crate::EmulatorOption;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Motion {
    Idle,
    Approach,
    Continuous(Direction),
}

/// Emulated state of a single axis.
#[derive(Debug, Clone)]
pub struct AxisEmulator {
    pub(crate) position: f64,
    pub(crate) target: f64,
    pub(crate) motion: Motion,
    pub(crate) pending: Option<(Instant, Motion, f64)>,
    pub(crate) target_reached: bool,
    pub(crate) eot_forward: bool,
    pub(crate) eot_backward: bool,
    pub(crate) output_enabled: bool,
    pub(crate) sensor_connected: bool,
    pub(crate) sensor_error: bool,
    pub(crate) queries: usize,
}

impl AxisEmulator {
    pub(crate) fn new(position: f64) -> Self {
        Self {
            position,
            target: position,
            motion: Motion::Idle,
            pending: None,
            target_reached: false,
            eot_forward: false,
            eot_backward: false,
            output_enabled: true,
            sensor_connected: true,
            sensor_error: false,
            queries: 0,
        }
    }

    /// The current position.
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    /// The target of the last issued approach.
    #[must_use]
    pub fn target(&self) -> f64 {
        self.pending.map_or(self.target, |(_, _, target)| target)
    }

    /// Checks if the axis is moving. A move that has not started yet is not reported.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.motion != Motion::Idle
    }

    /// Checks if the last approach reached its target.
    #[must_use]
    pub const fn is_target_reached(&self) -> bool {
        self.target_reached
    }

    /// Checks if the output is enabled.
    #[must_use]
    pub const fn is_output_enabled(&self) -> bool {
        self.output_enabled
    }

    /// Checks if the sensor is connected.
    #[must_use]
    pub const fn is_sensor_connected(&self) -> bool {
        self.sensor_connected
    }

    /// Checks if the sensor reports an error.
    #[must_use]
    pub const fn has_sensor_error(&self) -> bool {
        self.sensor_error
    }

    /// The forward and backward end of travel flags.
    #[must_use]
    pub const fn eot(&self) -> (bool, bool) {
        (self.eot_forward, self.eot_backward)
    }

    /// The number of status queries of this axis.
    #[must_use]
    pub const fn queries(&self) -> usize {
        self.queries
    }

    /// The target becomes effective at the first step at least `latency` after `at`.
    pub(crate) fn approach(&mut self, target: f64, at: Instant) {
        self.pending = Some((at, Motion::Approach, target));
    }

    pub(crate) fn run(&mut self, dir: Direction, at: Instant) {
        self.pending = Some((at, Motion::Continuous(dir), self.target));
    }

    pub(crate) fn stop(&mut self) {
        self.pending = None;
        self.motion = Motion::Idle;
        self.target_reached = false;
    }

    fn clear_flags(&mut self) {
        self.target_reached = false;
        self.eot_forward = false;
        self.eot_backward = false;
    }

    // Advances the motion by one step. The sensor state does not stop the motion.
    pub(crate) fn step(&mut self, option: &EmulatorOption) {
        if let Some((at, motion, target)) = self.pending {
            if at.elapsed() < option.latency {
                return;
            }
            self.pending = None;
            self.motion = motion;
            self.target = target;
            self.clear_flags();
        }

        let (lower, upper) = option.limits;
        let goal = match self.motion {
            Motion::Idle => return,
            Motion::Approach => self.target,
            Motion::Continuous(Direction::Forward) => f64::INFINITY,
            Motion::Continuous(Direction::Backward) => f64::NEG_INFINITY,
        };

        let diff = goal - self.position;
        let next = if diff.abs() <= option.step {
            goal
        } else {
            self.position + option.step.copysign(diff)
        };
        self.position = next.clamp(lower, upper);
        self.eot_forward = goal > upper && self.position >= upper;
        self.eot_backward = goal < lower && self.position <= lower;

        if self.motion == Motion::Approach
            && (self.target - self.position).abs() <= option.target_range
        {
            self.target_reached = true;
            self.motion = Motion::Idle;
        }
    }
}
