use std::{ffi::OsString, path::PathBuf};

use derive_more::Display;

bitflags::bitflags! {
    /// Interfaces searched by device discovery of the version 3/4 library.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Interfaces: u32 {
        /// USB.
        const USB = 1 << 0;
        /// Ethernet.
        const ETHERNET = 1 << 1;
        /// USB and Ethernet.
        const ALL = Self::USB.bits() | Self::ETHERNET.bits();
    }
}

/// The version of the vendor library.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DriverVersion {
    /// `anc350v2`, with scaled positions.
    #[display("v2")]
    V2,
    /// `anc350v3`.
    #[display("v3")]
    V3,
    /// `anc350v4`.
    #[display("v4")]
    V4,
}

impl DriverVersion {
    /// The library name without the platform prefix and extension.
    #[must_use]
    pub const fn library_name(&self) -> &'static str {
        match self {
            DriverVersion::V2 => "anc350v2",
            DriverVersion::V3 => "anc350v3",
            DriverVersion::V4 => "anc350v4",
        }
    }
}

/// The option of [`Anc350v2`] and [`Anc350v4`].
///
/// [`Anc350v2`]: crate::Anc350v2
/// [`Anc350v4`]: crate::Anc350v4
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeOption {
    /// The library version. The default is [`DriverVersion::V4`].
    pub version: DriverVersion,
    /// The path of the library. If `None`, the platform library name of [`NativeOption::version`] is searched.
    pub library_path: Option<PathBuf>,
    /// The sequence number of the device to connect.
    pub device_index: u32,
    /// The interfaces searched on discovery. Ignored by the version 2 library.
    pub interfaces: Interfaces,
}

impl NativeOption {
    /// The option for the version 2 library.
    #[must_use]
    pub fn v2() -> Self {
        Self {
            version: DriverVersion::V2,
            ..Default::default()
        }
    }

    /// The option for the version 3 library.
    #[must_use]
    pub fn v3() -> Self {
        Self {
            version: DriverVersion::V3,
            ..Default::default()
        }
    }

    pub(crate) fn library_path(&self) -> OsString {
        self.library_path.as_ref().map_or_else(
            || libloading::library_filename(self.version.library_name()),
            |path| path.clone().into_os_string(),
        )
    }
}

impl Default for NativeOption {
    fn default() -> Self {
        Self {
            version: DriverVersion::V4,
            library_path: None,
            device_index: 0,
            interfaces: Interfaces::ALL,
        }
    }
}
