//! Ordered policy table
//!
//! Rules are evaluated in order and the first rule whose release matches
//! wins. A release with no rule is a policy gap: the table has to be extended
//! when a new release is finalized, there is no default answer.

use crate::release::{BuildSignal, PlatformRelease};
use crate::rule::{Expectation, PolicyRule, StagingRule};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tzcompat_core::{Result, TzCompatError};

static DEFAULT_TABLE: Lazy<SdkPolicyTable> = Lazy::new(SdkPolicyTable::android);

/// Built-in table, constructed once per process.
pub fn default_table() -> &'static SdkPolicyTable {
    &DEFAULT_TABLE
}

/// Result of resolving a release against the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    /// Rule that matched the release
    pub rule_id: String,
    /// Expected major format version
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkPolicyTable {
    /// Table name (e.g., "android")
    pub name: String,

    /// Rules in evaluation order
    pub rules: Vec<PolicyRule>,
}

impl SdkPolicyTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Append a rule
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The platform history: one line per finalized release.
    pub fn android() -> Self {
        Self::new("android")
            .with_rule(PolicyRule::fixed(PlatformRelease::Q, "003"))
            .with_rule(PolicyRule::fixed(PlatformRelease::R, "004"))
            .with_rule(PolicyRule::fixed(PlatformRelease::S, "005"))
            .with_rule(
                PolicyRule::alias(PlatformRelease::S_V2, PlatformRelease::S)
                    .with_description("format version did not change from S"),
            )
            .with_rule(PolicyRule::fixed(PlatformRelease::TIRAMISU, "006"))
            .with_rule(PolicyRule::fixed(PlatformRelease::UPSIDE_DOWN_CAKE, "007"))
            .with_rule(
                PolicyRule::staging(PlatformRelease::VANILLA_ICE_CREAM, StagingRule::default())
                    .with_description(
                        "main reports the latest release; a newer ICU means the next format version",
                    ),
            )
    }

    /// Load a table from YAML and validate it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let table: Self = serde_yaml::from_str(yaml)
            .map_err(|e| TzCompatError::Config(format!("policy table: {}", e)))?;
        table.normalized()
    }

    /// Load a table from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)
            .map_err(|e| TzCompatError::Config(format!("policy table: {}", e)))?;
        table.normalized()
    }

    /// Load a table file; `.json` is read as JSON, anything else as YAML
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TzCompatError::io(path, e))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let table = if is_json {
            Self::from_json(&text)?
        } else {
            Self::from_yaml(&text)?
        };
        tracing::debug!(path = %path.display(), name = %table.name, rules = table.rules.len(), "loaded policy table");
        Ok(table)
    }

    fn normalized(mut self) -> Result<Self> {
        for rule in &mut self.rules {
            rule.ensure_id();
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the table is well formed.
    ///
    /// Each release has one rule, every alias ends at a fixed version, there
    /// is at most one staging rule and every version is 3 ASCII digits.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.release) {
                return Err(TzCompatError::Config(format!(
                    "release {} has more than one rule",
                    rule.release
                )));
            }
        }

        let staging = self.rules.iter().filter(|r| r.is_staging()).count();
        if staging > 1 {
            return Err(TzCompatError::Config(format!(
                "{} staging rules, at most one allowed",
                staging
            )));
        }

        for rule in &self.rules {
            match &rule.expectation {
                Expectation::Fixed { version } => check_version(&rule.id, version)?,
                Expectation::Staging(staging) => {
                    check_version(&rule.id, &staging.at_or_below)?;
                    check_version(&rule.id, &staging.above)?;
                }
                Expectation::SameAs { .. } => {
                    self.follow_alias(rule)?;
                }
            }
        }

        Ok(())
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Releases covered by the table, in table order
    pub fn releases(&self) -> Vec<PlatformRelease> {
        self.rules.iter().map(|r| r.release).collect()
    }

    /// First rule matching `release`
    pub fn rule_for(&self, release: PlatformRelease) -> Option<&PolicyRule> {
        self.rules.iter().find(|r| r.matches(release))
    }

    /// Resolve the expected version for `release`.
    ///
    /// `signal` is only consulted when the matching rule is a staging rule.
    pub fn resolve(&self, release: PlatformRelease, signal: Option<BuildSignal>) -> Result<Resolved> {
        let rule = self.rule_for(release).ok_or_else(|| TzCompatError::PolicyGap {
            release: release.to_string(),
        })?;

        let version = match &rule.expectation {
            Expectation::Fixed { version } => version.clone(),
            Expectation::SameAs { .. } => self.follow_alias(rule)?.to_string(),
            Expectation::Staging(staging) => {
                let signal = signal.ok_or_else(|| TzCompatError::MissingBuildSignal {
                    release: release.to_string(),
                })?;
                let version = staging.resolve(signal);
                tracing::debug!(
                    release = %release,
                    signal,
                    threshold = staging.threshold,
                    version,
                    "staging rule resolved by build signal"
                );
                version.to_string()
            }
        };

        Ok(Resolved {
            rule_id: rule.id.clone(),
            version,
        })
    }

    pub fn expected_major_version(
        &self,
        release: PlatformRelease,
        signal: Option<BuildSignal>,
    ) -> Result<String> {
        self.resolve(release, signal).map(|r| r.version)
    }

    /// One-line description of the rule for `release`
    pub fn describe(&self, release: PlatformRelease) -> Option<String> {
        let rule = self.rule_for(release)?;
        let what = match &rule.expectation {
            Expectation::Fixed { version } => version.clone(),
            Expectation::SameAs { release: of } => format!("same as {}", of),
            Expectation::Staging(s) => format!(
                "{} if build signal <= {}, else {}",
                s.at_or_below, s.threshold, s.above
            ),
        };
        Some(format!("{}: {} [{}]", rule.release, what, rule.id))
    }

    /// Follow `SameAs` links from `rule` until a fixed version.
    fn follow_alias<'a>(&'a self, rule: &'a PolicyRule) -> Result<&'a str> {
        let mut current = rule;
        // every hop visits a distinct rule, so more hops than rules is a cycle
        for _ in 0..=self.rules.len() {
            match &current.expectation {
                Expectation::Fixed { version } => return Ok(version),
                Expectation::SameAs { release } => {
                    current = self.rule_for(*release).ok_or_else(|| {
                        TzCompatError::Config(format!(
                            "rule {} aliases release {}, which has no rule",
                            rule.id, release
                        ))
                    })?;
                }
                Expectation::Staging(_) => {
                    return Err(TzCompatError::Config(format!(
                        "rule {} aliases the staging release {}",
                        rule.id, current.release
                    )))
                }
            }
        }
        Err(TzCompatError::Config(format!(
            "rule {} has a cyclic alias",
            rule.id
        )))
    }
}

impl Default for SdkPolicyTable {
    fn default() -> Self {
        Self::android()
    }
}

fn check_version(rule_id: &str, version: &str) -> Result<()> {
    if version.len() == 3 && version.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(TzCompatError::Config(format!(
            "rule {} expects {:?}, not a 3-digit format version",
            rule_id, version
        )))
    }
}
