use std::time::Duration;

use anc350_core::axis::NUM_AXES;

/// The option of [`Emulator`].
///
/// All values are in the position unit of the emulated status variant.
///
/// [`Emulator`]: crate::Emulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmulatorOption {
    /// The distance an axis moves per status query.
    pub step: f64,
    /// The distance to the target within which the target is reached.
    pub target_range: f64,
    /// The lower and upper travel limits.
    pub limits: (f64, f64),
    /// The initial positions.
    pub initial: [f64; NUM_AXES],
    /// The delay between issuing a move and the axis starting to move.
    pub latency: Duration,
}
