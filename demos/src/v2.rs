mod tests;

use anyhow::Result;

use anc350::prelude::*;
use anc350_native::{Anc350v2, NativeOption};

fn main() -> Result<()> {
    tests::init_tracing();

    let positioner = Anc350v2::open(NativeOption::v2())?;
    let info = positioner.info();
    println!("ANC350 id: {}, locked: {}", info.id, info.locked);
    Axis::all().try_for_each(|axis| -> Result<()> {
        println!("{axis} capacitance: {} nF", positioner.cap_measure(axis)?);
        Ok(())
    })?;
    positioner.set_static_amplitude(2000)?;

    tests::run(Controller::open(positioner), |mm| {
        Position::Scaled((mm * 1e6).round() as i32)
    })
}
