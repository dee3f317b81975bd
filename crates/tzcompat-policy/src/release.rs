//! Platform release identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Secondary version signal consulted for the staging release: the major
/// version of the bundled calendar/locale library.
pub type BuildSignal = u32;

/// A platform release, identified by its SDK integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformRelease(u32);

impl PlatformRelease {
    pub const Q: Self = Self(29);
    pub const R: Self = Self(30);
    pub const S: Self = Self(31);
    pub const S_V2: Self = Self(32);
    pub const TIRAMISU: Self = Self(33);
    pub const UPSIDE_DOWN_CAKE: Self = Self(34);
    pub const VANILLA_ICE_CREAM: Self = Self(35);

    pub const fn new(sdk_int: u32) -> Self {
        Self(sdk_int)
    }

    pub const fn sdk_int(self) -> u32 {
        self.0
    }

    /// Codename for releases this crate knows about.
    pub fn codename(self) -> Option<&'static str> {
        match self.0 {
            29 => Some("Q"),
            30 => Some("R"),
            31 => Some("S"),
            32 => Some("S_V2"),
            33 => Some("TIRAMISU"),
            34 => Some("UPSIDE_DOWN_CAKE"),
            35 => Some("VANILLA_ICE_CREAM"),
            _ => None,
        }
    }
}

impl From<u32> for PlatformRelease {
    fn from(sdk_int: u32) -> Self {
        Self(sdk_int)
    }
}

impl fmt::Display for PlatformRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.codename() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(PlatformRelease::TIRAMISU.to_string(), "33 (TIRAMISU)");
        assert_eq!(PlatformRelease::new(99).to_string(), "99");
    }

    #[test]
    fn test_ordering_follows_sdk_int() {
        assert!(PlatformRelease::S < PlatformRelease::S_V2);
        assert_eq!(PlatformRelease::from(34), PlatformRelease::UPSIDE_DOWN_CAKE);
    }
}
