use std::time::Duration;

use anc350::prelude::*;
use anc350_emulator::{Emulator, EmulatorOption};

/// Opens a controller on an emulator whose axes reach a target `distance` away after `distance` samples.
pub fn open_emulator(distance: usize) -> Controller<Emulator<ExtendedStatus>> {
    Controller::open_with(
        Emulator::with_option(EmulatorOption {
            step: 1.,
            target_range: 0.5,
            limits: (0., distance as f64),
            initial: [0.; NUM_AXES],
            latency: Duration::ZERO,
        }),
        StdSleeper,
        PollOption {
            interval: Duration::ZERO,
            timeout: None,
        },
    )
}
