#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Motion control for the attocube ANC350 positioner.
//!
//! A [`Controller`] issues moves through a [`Positioner`] and waits for their completion by polling the axis status.
//!
//! [`Positioner`]: anc350_core::positioner::Positioner

/// Controller and motion completion polling.
pub mod controller;
/// Error type surfaced by the controller.
pub mod error;
/// A module that contains the most commonly used items.
pub mod prelude;

pub use anc350_core as core;

pub use controller::Controller;
