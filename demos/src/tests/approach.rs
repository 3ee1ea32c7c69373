use anc350::prelude::*;

use super::Scale;

pub fn approach(anc: &mut Controller<impl Positioner>, scale: Scale) -> anyhow::Result<()> {
    for (axis, mm) in [(Axis::X, 2.), (Axis::Y, 2.)] {
        println!("moving {axis} to {mm} mm");
        let mut session = anc.move_axis(axis, Move::Absolute(scale(mm)))?;
        anc.wait(&mut session)?;
        println!(
            "{axis} arrived at {} after {} samples",
            anc.position(axis)?,
            session.samples()
        );
    }
    Ok(())
}

pub fn relative(anc: &mut Controller<impl Positioner>, scale: Scale) -> anyhow::Result<()> {
    let axis = Axis::X;
    let before = anc.position(axis)?;
    let mut session = anc.move_axis(axis, Move::Relative(scale(-0.5)))?;
    anc.wait(&mut session)?;
    println!("{axis} moved from {before} to {}", anc.position(axis)?);
    Ok(())
}
