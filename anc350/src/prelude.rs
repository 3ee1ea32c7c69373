pub use crate::{
    controller::{CancelToken, Controller, MotionTarget, PollOption, PollSession, PollState},
    error::ANC350Error,
};

pub use anc350_core::{
    axis::{Axis, AxisSet, NUM_AXES},
    bitmask::BitmaskError,
    position::{Direction, Move, Position},
    positioner::{Positioner, PositionerError},
    sleep::{Sleep, SpinSleeper, StdSleeper},
    status::{ExtendedStatus, Fault, LegacyStatus, StatusFlags},
};
