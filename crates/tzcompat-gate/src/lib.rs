//! tzcompat gate: checks the installed time zone module against the platform
//!
//! ```text
//! version file ──► VersionDescriptor ──┬─► major format version ─┐
//!                                      │   SdkPolicyTable ───────┴─► compatibility
//!                                      └─► tzdb version ─────────┐
//!                                          reporters (icu, ...) ─┴─► tzdb_consistency
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tzcompat_gate::{ConsistencyValidator, StaticPlatform, StaticVersionSource};
//! use tzcompat_policy::PlatformRelease;
//!
//! let validator = ConsistencyValidator::new("/apex/com.android.tzdata/etc/tz/tz_version");
//! let platform = StaticPlatform::new(PlatformRelease::UPSIDE_DOWN_CAKE);
//! let icu = StaticVersionSource::new("icu", "2024a");
//! let time_utils = StaticVersionSource::new("platform", "2024a");
//!
//! let report = validator.run(&platform, &[&icu, &time_utils]);
//! println!("{}", report);
//! ```

pub mod collaborators;
pub mod config;
pub mod report;
pub mod validator;

pub use collaborators::{
    FileVersionSource, PlatformInfo, StaticPlatform, StaticVersionSource, TzdbVersionSource,
};
pub use config::{
    PlatformConfig, ReporterConfig, ValidatorConfig, ICU_REPORTER, PLATFORM_REPORTER,
    REQUIRED_REPORTERS,
};
pub use report::{Check, CheckStatus, ValidationReport};
pub use validator::{ConsistencyValidator, COMPATIBILITY_CHECK, CONSISTENCY_CHECK};
