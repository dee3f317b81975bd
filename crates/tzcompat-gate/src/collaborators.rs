//! Independent reporters of platform and tzdb version information

use std::path::PathBuf;
use tzcompat_core::{Result, TzCompatError};
use tzcompat_policy::{BuildSignal, PlatformRelease};

/// Something else on the platform that bundles tzdb data and can say which
/// version it has.
pub trait TzdbVersionSource {
    /// Name used in failure messages (e.g., "icu", "platform")
    fn name(&self) -> &str;

    fn tzdb_version(&self) -> Result<String>;
}

/// Identity of the platform under test
pub trait PlatformInfo {
    fn release(&self) -> PlatformRelease;

    /// Bundled calendar/locale library major version, if known
    fn build_signal(&self) -> Option<BuildSignal>;
}

/// A version reported up front (flags, config, or a test)
#[derive(Debug, Clone)]
pub struct StaticVersionSource {
    name: String,
    version: String,
}

impl StaticVersionSource {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl TzdbVersionSource for StaticVersionSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn tzdb_version(&self) -> Result<String> {
        Ok(self.version.clone())
    }
}

/// Reads the version from a text file holding just the version string
#[derive(Debug, Clone)]
pub struct FileVersionSource {
    name: String,
    path: PathBuf,
}

impl FileVersionSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl TzdbVersionSource for FileVersionSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn tzdb_version(&self) -> Result<String> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| TzCompatError::io(&self.path, e))?;
        let version = text.trim();
        if version.is_empty() {
            return Err(TzCompatError::Config(format!(
                "{} version file {} is empty",
                self.name,
                self.path.display()
            )));
        }
        Ok(version.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPlatform {
    release: PlatformRelease,
    build_signal: Option<BuildSignal>,
}

impl StaticPlatform {
    pub fn new(release: PlatformRelease) -> Self {
        Self {
            release,
            build_signal: None,
        }
    }

    pub fn with_build_signal(mut self, signal: BuildSignal) -> Self {
        self.build_signal = Some(signal);
        self
    }
}

impl PlatformInfo for StaticPlatform {
    fn release(&self) -> PlatformRelease {
        self.release
    }

    fn build_signal(&self) -> Option<BuildSignal> {
        self.build_signal
    }
}
