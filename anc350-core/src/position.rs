use derive_more::Display;

/// A position reported by or sent to the positioner.
///
/// The unit depends on the library version. The core never interprets it beyond comparing and logging.
#[derive(Debug, Display, Clone, Copy, PartialEq, PartialOrd)]
pub enum Position {
    /// Version 2 position in the actuator unit multiplied by 1000 (nanometres for linear actuators).
    #[display("{}", _0)]
    Scaled(i32),
    /// Version 3/4 position in metres, or degrees for goniometers and rotators.
    #[display("{:e}", _0)]
    Metric(f64),
}

impl Position {
    /// Returns the value as `f64` regardless of the representation.
    #[must_use]
    pub fn value(&self) -> f64 {
        match *self {
            Position::Scaled(v) => v as f64,
            Position::Metric(v) => v,
        }
    }
}

impl From<i32> for Position {
    fn from(value: i32) -> Self {
        Position::Scaled(value)
    }
}

impl From<f64> for Position {
    fn from(value: f64) -> Self {
        Position::Metric(value)
    }
}

/// The direction of a step or continuous move.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Direction {
    /// Forward direction.
    #[default]
    Forward = 0,
    /// Backward direction.
    Backward = 1,
}

impl Direction {
    /// Checks if the direction is backward.
    #[must_use]
    pub const fn is_backward(&self) -> bool {
        matches!(self, Direction::Backward)
    }
}

/// A move command for a single axis.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum Move {
    /// Approach an absolute target position.
    #[display("absolute({})", _0)]
    Absolute(Position),
    /// Approach a target relative to the current position.
    #[display("relative({})", _0)]
    Relative(Position),
    /// Move continuously until stopped.
    #[display("continuous({})", _0)]
    Continuous(Direction),
}
