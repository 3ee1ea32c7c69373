use anc350::prelude::*;

use super::Scale;

pub fn sync(anc: &mut Controller<impl Positioner>, scale: Scale) -> anyhow::Result<()> {
    let targets = [(Axis::X, scale(2.5)), (Axis::Y, scale(2.5))];
    println!(
        "moving axes {:#b} synchronously",
        targets.iter().map(|&(axis, _)| axis).collect::<AxisSet>().bits()
    );

    let mut session = anc.move_sync(&targets)?;
    anc.wait(&mut session)?;

    for (axis, _) in targets {
        println!("{axis} arrived at {}", anc.position(axis)?);
    }
    Ok(())
}
