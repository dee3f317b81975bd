//! tzcompat core: error model and version descriptor reader
//!
//! Reads the fixed-width preamble of the time zone module version file and
//! decodes it into a [`VersionDescriptor`].
//!
//! ```no_run
//! use std::path::Path;
//! use tzcompat_core::{VersionDescriptor, TZ_MODULE_VERSION_FILE};
//!
//! let descriptor = VersionDescriptor::read(Path::new(TZ_MODULE_VERSION_FILE))?;
//! println!("format {} / tzdb {}", descriptor.major_format_version(), descriptor.tzdb_version());
//! # Ok::<(), tzcompat_core::TzCompatError>(())
//! ```

pub mod descriptor;
pub mod error;
pub mod reader;

pub use descriptor::{
    read_major_format_version, read_tzdb_version, VersionDescriptor, MAJOR_VERSION_PREFIX_LEN,
    TZDB_VERSION_PREFIX_LEN, TZ_MODULE_VERSION_FILE,
};
pub use error::{ErrorKind, Result, TzCompatError};
pub use reader::{read_exact_prefix, read_prefix};
