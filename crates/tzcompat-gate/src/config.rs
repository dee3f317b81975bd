//! Validator configuration
//!
//! Loaded from YAML. Every field is optional; the CLI fills or overrides
//! values from flags and environment variables.
//!
//! ```yaml
//! version_file: /apex/com.android.tzdata/etc/tz/tz_version
//! policy_table: policy.yaml
//! platform:
//!   sdk: 34
//!   icu_major: 74
//! reporters:
//!   - name: icu
//!     version: 2024a
//!   - name: platform
//!     file: /system/etc/tzdata_version
//! ```

use crate::collaborators::{
    FileVersionSource, StaticPlatform, StaticVersionSource, TzdbVersionSource,
};
use crate::validator::ConsistencyValidator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tzcompat_core::{Result, TzCompatError, TZ_MODULE_VERSION_FILE};
use tzcompat_policy::{default_table, PlatformRelease, SdkPolicyTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Module version file
    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,

    /// Custom policy table (YAML or JSON); built-in table when absent
    #[serde(default)]
    pub policy_table: Option<PathBuf>,

    #[serde(default)]
    pub platform: PlatformConfig,

    /// Reporters compared against the module's tzdb version, in order
    #[serde(default)]
    pub reporters: Vec<ReporterConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// SDK integer of the running release
    pub sdk: Option<u32>,

    /// Bundled ICU major version, needed on the staging release
    pub icu_major: Option<u32>,
}

/// One tzdb version reporter: either a literal version or a file holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterConfig {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Reporter for the tzdb version bundled with ICU
pub const ICU_REPORTER: &str = "icu";

/// Reporter for the tzdb version seen by the platform time utilities
pub const PLATFORM_REPORTER: &str = "platform";

/// Reporters every consistency check must consult
pub const REQUIRED_REPORTERS: [&str; 2] = [ICU_REPORTER, PLATFORM_REPORTER];

fn default_version_file() -> PathBuf {
    PathBuf::from(TZ_MODULE_VERSION_FILE)
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            version_file: default_version_file(),
            policy_table: None,
            platform: PlatformConfig::default(),
            reporters: Vec::new(),
        }
    }
}

impl ValidatorConfig {
    /// Load config from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| TzCompatError::Config(format!("config: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TzCompatError::io(path, e))?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), "loaded validator config");
        Ok(config)
    }

    /// Set or replace a reporter by name
    pub fn set_reporter(&mut self, reporter: ReporterConfig) {
        match self.reporters.iter_mut().find(|r| r.name == reporter.name) {
            Some(existing) => *existing = reporter,
            None => self.reporters.push(reporter),
        }
    }

    pub fn table(&self) -> Result<SdkPolicyTable> {
        match &self.policy_table {
            Some(path) => SdkPolicyTable::from_file(path),
            None => Ok(default_table().clone()),
        }
    }

    pub fn validator(&self) -> Result<ConsistencyValidator> {
        Ok(ConsistencyValidator::with_table(
            self.version_file.clone(),
            self.table()?,
        ))
    }

    pub fn platform(&self) -> Result<StaticPlatform> {
        let sdk = self.platform.sdk.ok_or_else(|| {
            TzCompatError::Config("platform sdk release is not set".to_string())
        })?;

        let platform = StaticPlatform::new(PlatformRelease::new(sdk));
        Ok(match self.platform.icu_major {
            Some(major) => platform.with_build_signal(major),
            None => platform,
        })
    }

    /// Build the configured reporters, in order.
    ///
    /// Both [`REQUIRED_REPORTERS`] must be present; extra reporters are
    /// compared too.
    pub fn sources(&self) -> Result<Vec<Box<dyn TzdbVersionSource>>> {
        let missing: Vec<&str> = REQUIRED_REPORTERS
            .into_iter()
            .filter(|name| !self.reporters.iter().any(|r| r.name == *name))
            .collect();
        if !missing.is_empty() {
            return Err(TzCompatError::Config(format!(
                "reporter(s) not configured: {}",
                missing.join(", ")
            )));
        }

        self.reporters.iter().map(ReporterConfig::source).collect()
    }
}

impl ReporterConfig {
    pub fn literal(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            file: None,
        }
    }

    pub fn from_file(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version: None,
            file: Some(file.into()),
        }
    }

    fn source(&self) -> Result<Box<dyn TzdbVersionSource>> {
        match (&self.version, &self.file) {
            (Some(version), None) => Ok(Box::new(StaticVersionSource::new(&self.name, version))),
            (None, Some(file)) => Ok(Box::new(FileVersionSource::new(&self.name, file))),
            _ => Err(TzCompatError::Config(format!(
                "reporter {} needs exactly one of version or file",
                self.name
            ))),
        }
    }
}
