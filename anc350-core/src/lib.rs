#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core traits and types for the ANC350 positioner.

/// Axis addressing.
pub mod axis;
/// Conversion between boolean flag sequences and integer bitmasks.
pub mod bitmask;
/// Positions and move commands.
pub mod position;
/// A interface to the positioner device.
pub mod positioner;
/// Waiting between status samples.
pub mod sleep;
/// Axis status flags.
pub mod status;
