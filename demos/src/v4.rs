mod tests;

use anyhow::Result;

use anc350::prelude::*;
use anc350_native::{Anc350v4, NativeOption};

fn main() -> Result<()> {
    tests::init_tracing();

    let positioner = Anc350v4::open(NativeOption::default())?;
    let info = positioner.device_info(0)?;
    println!(
        "{:?} id: {}, serial: {}, address: {}",
        info.device_type, info.id, info.serial, info.address
    );
    println!("firmware version: {}", positioner.firmware_version()?);
    println!("features: {:?}", positioner.device_config()?);
    Axis::all().try_for_each(|axis| -> Result<()> {
        println!(
            "{axis} {} ({:?}) capacitance: {:e} F",
            positioner.actuator_name(axis)?,
            positioner.actuator_type(axis)?,
            positioner.measure_capacitance(axis)?
        );
        positioner.set_frequency(axis, 200.)?;
        positioner.set_amplitude(axis, 45.)?;
        positioner.set_axis_output(axis, true, false)?;
        positioner.set_target_range(axis, 1e-6)?;
        Ok(())
    })?;

    tests::run(Controller::open(positioner), |mm| Position::Metric(mm * 1e-3))
}
