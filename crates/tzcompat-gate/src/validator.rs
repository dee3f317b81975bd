//! Consistency validator
//!
//! Runs the two checks over the module version file:
//!
//! - **compatibility**: the file's major format version is the one the policy
//!   table expects for the running release
//! - **tzdb consistency**: the file's tzdb version matches what every other
//!   reporter on the platform says

use crate::collaborators::{PlatformInfo, TzdbVersionSource};
use crate::report::{Check, ValidationReport};
use std::path::{Path, PathBuf};
use tzcompat_core::{
    read_major_format_version, read_tzdb_version, Result, TzCompatError, VersionDescriptor,
};
use tzcompat_policy::{default_table, Resolved, SdkPolicyTable};

pub const COMPATIBILITY_CHECK: &str = "compatibility";
pub const CONSISTENCY_CHECK: &str = "tzdb_consistency";

/// Validator bound to one version file and one policy table
#[derive(Debug, Clone)]
pub struct ConsistencyValidator {
    version_file: PathBuf,
    table: SdkPolicyTable,
}

impl ConsistencyValidator {
    /// Validator using the built-in policy table
    pub fn new(version_file: impl Into<PathBuf>) -> Self {
        Self::with_table(version_file, default_table().clone())
    }

    pub fn with_table(version_file: impl Into<PathBuf>, table: SdkPolicyTable) -> Self {
        Self {
            version_file: version_file.into(),
            table,
        }
    }

    pub fn version_file(&self) -> &Path {
        &self.version_file
    }

    pub fn table(&self) -> &SdkPolicyTable {
        &self.table
    }

    /// Compatibility check alone; reads only the major version prefix.
    pub fn check_compatibility(&self, platform: &dyn PlatformInfo) -> Result<Resolved> {
        let observed = read_major_format_version(&self.version_file)?;
        self.compare_major(&observed, platform)
    }

    /// Consistency check alone; returns the agreed tzdb version.
    pub fn check_tzdb_consistency(&self, sources: &[&dyn TzdbVersionSource]) -> Result<String> {
        let module = read_tzdb_version(&self.version_file)?;
        self.compare_tzdb(&module, sources)?;
        Ok(module)
    }

    /// Run both checks against one freshly read descriptor.
    ///
    /// Neither check short-circuits the other.
    pub fn run(
        &self,
        platform: &dyn PlatformInfo,
        sources: &[&dyn TzdbVersionSource],
    ) -> ValidationReport {
        let descriptor = match VersionDescriptor::read(&self.version_file) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::warn!(path = %self.version_file.display(), error = %err, "version file unreadable");
                let checks = vec![
                    Check::fail(COMPATIBILITY_CHECK, err.to_string(), err.kind()),
                    Check::fail(CONSISTENCY_CHECK, err.to_string(), err.kind()),
                ];
                return ValidationReport::from_checks(checks, None);
            }
        };

        let compat = match self.compare_major(descriptor.major_format_version(), platform) {
            Ok(resolved) => Check::pass(
                COMPATIBILITY_CHECK,
                format!(
                    "release {} expects {} (rule {}), module has {}",
                    platform.release(),
                    resolved.version,
                    resolved.rule_id,
                    descriptor.major_format_version()
                ),
            ),
            Err(err) => Check::fail(COMPATIBILITY_CHECK, err.to_string(), err.kind()),
        };

        let consistency = match self.compare_tzdb(descriptor.tzdb_version(), sources) {
            Ok(()) => Check::pass(
                CONSISTENCY_CHECK,
                format!(
                    "{} reporters agree on tzdb {}",
                    sources.len(),
                    descriptor.tzdb_version()
                ),
            ),
            Err(err) => Check::fail(CONSISTENCY_CHECK, err.to_string(), err.kind()),
        };

        let report = ValidationReport::from_checks(
            vec![compat, consistency],
            Some(descriptor.preamble_digest().to_string()),
        );
        tracing::info!(trace_id = %report.trace_id, verdict = %report.verdict, "validation finished");
        report
    }

    fn compare_major(&self, observed: &str, platform: &dyn PlatformInfo) -> Result<Resolved> {
        let release = platform.release();
        let resolved = self.table.resolve(release, platform.build_signal())?;

        if resolved.version != observed {
            tracing::warn!(release = %release, expected = %resolved.version, observed, "format version mismatch");
            return Err(TzCompatError::Incompatible {
                release: release.to_string(),
                expected: resolved.version,
                observed: observed.to_string(),
            });
        }

        tracing::debug!(release = %release, version = observed, "format version compatible");
        Ok(resolved)
    }

    fn compare_tzdb(&self, module: &str, sources: &[&dyn TzdbVersionSource]) -> Result<()> {
        if sources.is_empty() {
            return Err(TzCompatError::Config(
                "no tzdb version reporters to compare against".to_string(),
            ));
        }

        for source in sources {
            let reported = source.tzdb_version()?;
            if reported != module {
                tracing::warn!(source = source.name(), module, reported = %reported, "tzdb version disagreement");
                return Err(TzCompatError::Inconsistent {
                    source_name: source.name().to_string(),
                    module: module.to_string(),
                    reported,
                });
            }
            tracing::debug!(source = source.name(), version = module, "tzdb version agrees");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{StaticPlatform, StaticVersionSource};
    use crate::report::CheckStatus;
    use tzcompat_core::ErrorKind;
    use tzcompat_policy::{PlatformRelease, STAGING_ICU_THRESHOLD};

    fn validator(contents: &str) -> (tempfile::TempDir, ConsistencyValidator) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tz_version");
        std::fs::write(&path, contents).unwrap();
        (dir, ConsistencyValidator::new(path))
    }

    #[test]
    fn test_compatible_release() {
        let (_dir, v) = validator("007.002|00042|xx");
        let platform = StaticPlatform::new(PlatformRelease::UPSIDE_DOWN_CAKE);

        let resolved = v.check_compatibility(&platform).unwrap();
        assert_eq!(resolved.version, "007");
    }

    #[test]
    fn test_incompatible_release() {
        let (_dir, v) = validator("007.002|00042|xx");
        let platform = StaticPlatform::new(PlatformRelease::TIRAMISU);

        match v.check_compatibility(&platform).unwrap_err() {
            TzCompatError::Incompatible {
                release,
                expected,
                observed,
            } => {
                assert_eq!(release, "33 (TIRAMISU)");
                assert_eq!(expected, "006");
                assert_eq!(observed, "007");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_release_is_gap_not_pass() {
        let (_dir, v) = validator("007.002|00042|xx");
        let err = v
            .check_compatibility(&StaticPlatform::new(PlatformRelease::new(36)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyGap);
    }

    #[test]
    fn test_staging_release_uses_signal() {
        let (_dir, v) = validator("009.001|2024b|");
        let next = StaticPlatform::new(PlatformRelease::VANILLA_ICE_CREAM)
            .with_build_signal(STAGING_ICU_THRESHOLD + 1);
        assert_eq!(v.check_compatibility(&next).unwrap().version, "009");

        let current = StaticPlatform::new(PlatformRelease::VANILLA_ICE_CREAM)
            .with_build_signal(STAGING_ICU_THRESHOLD);
        let err = v.check_compatibility(&current).unwrap_err();
        assert!(matches!(err, TzCompatError::Incompatible { ref expected, .. } if expected == "008"));
    }

    #[test]
    fn test_consistency_names_disagreeing_source() {
        let (_dir, v) = validator("007.002|00042|xx");
        let icu = StaticVersionSource::new("icu", "00042");
        let platform = StaticVersionSource::new("platform", "00043");

        let err = v.check_tzdb_consistency(&[&icu, &platform]).unwrap_err();
        match err {
            TzCompatError::Inconsistent {
                source_name,
                module,
                reported,
            } => {
                assert_eq!(source_name, "platform");
                assert_eq!(module, "00042");
                assert_eq!(reported, "00043");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(
            v.check_tzdb_consistency(&[&icu, &icu]).unwrap(),
            "00042"
        );
    }

    #[test]
    fn test_consistency_requires_sources() {
        let (_dir, v) = validator("007.002|00042|xx");
        let err = v.check_tzdb_consistency(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_run_collects_both_failures() {
        let (_dir, v) = validator("007.002|00042|xx");
        let platform = StaticPlatform::new(PlatformRelease::TIRAMISU);
        let icu = StaticVersionSource::new("icu", "00041");

        let report = v.run(&platform, &[&icu]);

        assert!(!report.passed());
        assert_eq!(report.failures().count(), 2);
        assert_eq!(report.checks[0].error, Some(ErrorKind::Compatibility));
        assert_eq!(report.checks[1].error, Some(ErrorKind::Inconsistency));
        assert!(report.descriptor_digest.is_some());
    }

    #[test]
    fn test_run_short_file() {
        let (_dir, v) = validator("007.0");
        let platform = StaticPlatform::new(PlatformRelease::UPSIDE_DOWN_CAKE);
        let icu = StaticVersionSource::new("icu", "00042");

        let report = v.run(&platform, &[&icu]);

        assert_eq!(report.verdict, "FAIL");
        assert!(report
            .checks
            .iter()
            .all(|c| c.status == CheckStatus::Fail && c.error == Some(ErrorKind::Format)));
        assert!(report.descriptor_digest.is_none());
    }

    #[test]
    fn test_run_is_idempotent() {
        let (_dir, v) = validator("007.002|00042|xx");
        let platform = StaticPlatform::new(PlatformRelease::UPSIDE_DOWN_CAKE);
        let icu = StaticVersionSource::new("icu", "00042");

        let first = v.run(&platform, &[&icu]);
        let second = v.run(&platform, &[&icu]);

        assert!(first.passed() && second.passed());
        assert_eq!(first.descriptor_digest, second.descriptor_digest);
        assert_eq!(first.checks[0].message, second.checks[0].message);
    }
}
