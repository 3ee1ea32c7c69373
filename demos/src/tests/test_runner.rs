use std::io::{self, Write};

use anc350::prelude::*;

use super::{approach::*, continuous::*, sync::*, Scale};

pub fn run<P: Positioner>(mut anc: Controller<P>, scale: Scale) -> anyhow::Result<()> {
    type Test<P> = (&'static str, fn(&'_ mut Controller<P>, Scale) -> anyhow::Result<()>);

    let examples: Vec<Test<_>> = vec![
        ("Axis by axis approach test", |anc, scale| approach(anc, scale)),
        ("Relative approach test", |anc, scale| relative(anc, scale)),
        ("Synchronized approach test", |anc, scale| sync(anc, scale)),
        ("Continuous move test", |anc, _| continuous(anc)),
    ];

    loop {
        examples.iter().enumerate().for_each(|(i, (name, _))| {
            println!("[{i}]: {name}");
        });
        println!("[Others]: Finish");
        print!("Choose number: ");
        io::stdout().flush()?;

        let mut s = String::new();
        io::stdin().read_line(&mut s)?;
        match s.trim().parse::<usize>() {
            Ok(i) if i < examples.len() => {
                if let Err(e) = (examples[i].1)(&mut anc, scale) {
                    println!("failed: {e}");
                }
            }
            _ => break,
        }
    }

    tracing::info!("Closing connection");
    anc.close()?;

    Ok(())
}
