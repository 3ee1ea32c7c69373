#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! [`Positioner`] implementations using the attocube ANC350 vendor libraries.
//!
//! [`Anc350v2`] binds `anc350v2`, which reports [`LegacyStatus`]. [`Anc350v4`] binds `anc350v3` or `anc350v4`, which reports [`ExtendedStatus`].
//!
//! [`Positioner`]: anc350_core::positioner::Positioner
//! [`LegacyStatus`]: anc350_core::status::LegacyStatus
//! [`ExtendedStatus`]: anc350_core::status::ExtendedStatus

mod error;
mod library;
mod option;
mod v2;
mod v4;

pub use error::NativeError;
pub use option::{DriverVersion, Interfaces, NativeOption};
pub use v2::{AmplitudeControl, Anc350v2, PositionerInfo, Reference};
pub use v4::{ActuatorType, Anc350v4, DeviceFeatures, DeviceInfo, DeviceType, ExtTriggerMode};
