mod tests;

use std::time::Duration;

use anyhow::Result;

use anc350::prelude::*;
use anc350_emulator::Emulator;

fn main() -> Result<()> {
    tests::init_tracing();

    let anc = Controller::open_with(
        Emulator::<ExtendedStatus>::new(),
        StdSleeper,
        PollOption {
            interval: Duration::from_millis(100),
            timeout: Some(Duration::from_secs(10)),
        },
    );

    tests::run(anc, |mm| Position::Metric(mm * 1e-3))
}
