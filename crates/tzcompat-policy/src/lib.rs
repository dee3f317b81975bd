//! tzcompat policy: which time zone format version each release expects
//!
//! Each finalized platform release pins the major format version of the time
//! zone module it can load. The mapping is an ordered table of rules:
//!
//! ```text
//! release ──► first matching rule ──► Fixed    ──► "007"
//!                                 ├─► SameAs   ──► rule of the other release
//!                                 └─► Staging  ──► threshold on build signal
//!             no rule ──► PolicyGap
//! ```
//!
//! # Example
//!
//! ```
//! use tzcompat_policy::{default_table, PlatformRelease};
//!
//! let table = default_table();
//! assert_eq!(table.expected_major_version(PlatformRelease::TIRAMISU, None)?, "006");
//!
//! // The staging release needs the bundled ICU major version.
//! assert_eq!(table.expected_major_version(PlatformRelease::VANILLA_ICE_CREAM, Some(76))?, "009");
//! # Ok::<(), tzcompat_core::TzCompatError>(())
//! ```

pub mod release;
pub mod rule;
pub mod table;

pub use release::{BuildSignal, PlatformRelease};
pub use rule::{
    Expectation, PolicyRule, StagingRule, STAGING_ICU_THRESHOLD, STAGING_VERSION_CURRENT,
    STAGING_VERSION_NEXT,
};
pub use table::{default_table, Resolved, SdkPolicyTable};
