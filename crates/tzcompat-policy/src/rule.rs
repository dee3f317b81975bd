//! Individual policy rules
//!
//! A rule maps one platform release to the major format version the time
//! zone module must carry on that release.

use crate::release::{BuildSignal, PlatformRelease};
use serde::{Deserialize, Serialize};

/// Highest calendar/locale library major version that still belongs to the
/// current staging release. The next release ships a newer library.
pub const STAGING_ICU_THRESHOLD: BuildSignal = 75;

/// Expected format version on the staging release at or below the threshold.
pub const STAGING_VERSION_CURRENT: &str = "008";

/// Expected format version on the staging release above the threshold.
pub const STAGING_VERSION_NEXT: &str = "009";

/// A single policy rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Unique identifier for the rule (defaults to `sdk_<release>`)
    #[serde(default)]
    pub id: String,

    /// Release this rule applies to
    pub release: PlatformRelease,

    /// How the expected version is obtained
    pub expectation: Expectation,

    /// Why the rule looks the way it does
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl PolicyRule {
    /// Rule with a fixed expected version
    pub fn fixed(release: PlatformRelease, version: impl Into<String>) -> Self {
        Self::new(
            release,
            Expectation::Fixed {
                version: version.into(),
            },
        )
    }

    /// Rule sharing the expected version of another release
    pub fn alias(release: PlatformRelease, of: PlatformRelease) -> Self {
        Self::new(release, Expectation::SameAs { release: of })
    }

    /// Rule for the release that is still in staging
    pub fn staging(release: PlatformRelease, rule: StagingRule) -> Self {
        Self::new(release, Expectation::Staging(rule))
    }

    fn new(release: PlatformRelease, expectation: Expectation) -> Self {
        Self {
            id: default_id(release),
            release,
            expectation,
            description: String::new(),
        }
    }

    /// Set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn matches(&self, release: PlatformRelease) -> bool {
        self.release == release
    }

    pub fn is_staging(&self) -> bool {
        matches!(self.expectation, Expectation::Staging(_))
    }

    pub(crate) fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = default_id(self.release);
        }
    }
}

fn default_id(release: PlatformRelease) -> String {
    format!("sdk_{}", release.sdk_int())
}

/// Where a rule's expected version comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// A fixed 3-digit version
    Fixed { version: String },
    /// Same version as another release (format unchanged between them)
    SameAs { release: PlatformRelease },
    /// Chosen by a threshold on the build signal
    Staging(StagingRule),
}

/// Threshold rule for a release that has no final identity yet.
///
/// The staging branch reports the latest finalized release, so the bundled
/// library version is the only hint of which release it is heading for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingRule {
    /// Signals at or below this belong to the current release
    pub threshold: BuildSignal,
    pub at_or_below: String,
    pub above: String,
}

impl StagingRule {
    pub fn new(
        threshold: BuildSignal,
        at_or_below: impl Into<String>,
        above: impl Into<String>,
    ) -> Self {
        Self {
            threshold,
            at_or_below: at_or_below.into(),
            above: above.into(),
        }
    }

    pub fn resolve(&self, signal: BuildSignal) -> &str {
        if signal > self.threshold {
            &self.above
        } else {
            &self.at_or_below
        }
    }
}

impl Default for StagingRule {
    fn default() -> Self {
        Self::new(
            STAGING_ICU_THRESHOLD,
            STAGING_VERSION_CURRENT,
            STAGING_VERSION_NEXT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_threshold_boundary() {
        let rule = StagingRule::default();

        assert_eq!(rule.resolve(STAGING_ICU_THRESHOLD - 1), STAGING_VERSION_CURRENT);
        assert_eq!(rule.resolve(STAGING_ICU_THRESHOLD), STAGING_VERSION_CURRENT);
        assert_eq!(rule.resolve(STAGING_ICU_THRESHOLD + 1), STAGING_VERSION_NEXT);
    }

    #[test]
    fn test_rule_builders() {
        let rule = PolicyRule::fixed(PlatformRelease::R, "004").with_description("R");
        assert_eq!(rule.id, "sdk_30");
        assert!(rule.matches(PlatformRelease::R));
        assert!(!rule.matches(PlatformRelease::S));
        assert!(!rule.is_staging());

        let rule = PolicyRule::staging(PlatformRelease::VANILLA_ICE_CREAM, StagingRule::default())
            .with_id("staging");
        assert_eq!(rule.id, "staging");
        assert!(rule.is_staging());
    }

    #[test]
    fn test_expectation_yaml_shape() {
        let yaml = r#"
release: 35
expectation:
  kind: staging
  threshold: 75
  at_or_below: "008"
  above: "009"
"#;
        let mut rule: PolicyRule = serde_yaml::from_str(yaml).unwrap();
        rule.ensure_id();

        assert_eq!(rule.id, "sdk_35");
        assert_eq!(
            rule.expectation,
            Expectation::Staging(StagingRule::default())
        );
    }
}
