//! Version descriptor of the time zone data module
//!
//! The version file starts with a fixed-width ASCII preamble:
//!
//! ```text
//! xxx.yyy|zzzzz|....
//! ^^^     ^^^^^
//! major   tzdb version
//! ```
//!
//! Only the first 7 bytes (major format version) and the first 13 bytes
//! (tzdb version) are ever read. Anything after offset 13 is ignored so that
//! new trailing fields do not break older readers.

use crate::error::{Result, TzCompatError};
use crate::reader::read_exact_prefix;
use serde::Serialize;
use std::path::Path;

/// Default location of the module version file on device.
pub const TZ_MODULE_VERSION_FILE: &str = "/apex/com.android.tzdata/etc/tz/tz_version";

/// Bytes needed to extract the major format version (`xxx.yyy`).
pub const MAJOR_VERSION_PREFIX_LEN: usize = 7;

/// Bytes needed to extract the tzdb version (`xxx.yyy|zzzzz`).
pub const TZDB_VERSION_PREFIX_LEN: usize = 13;

const MEMORY_ORIGIN: &str = "<memory>";

/// Decoded version file. Built fresh for every check and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDescriptor {
    major_format_version: String,
    tzdb_version: String,
    /// `blake3:` digest of the 13-byte preamble the fields came from
    preamble_digest: String,
}

impl VersionDescriptor {
    /// Read both fields from the file at `path`, one bounded read each.
    pub fn read(path: &Path) -> Result<Self> {
        let major_format_version = read_major_format_version(path)?;

        let preamble = read_exact_prefix(path, TZDB_VERSION_PREFIX_LEN)?;
        let origin = path.display().to_string();
        let tzdb_version = tzdb_version_from(&preamble, &origin)?;

        tracing::debug!(
            path = %path.display(),
            major = %major_format_version,
            tzdb = %tzdb_version,
            "decoded version descriptor"
        );

        Ok(Self {
            major_format_version,
            tzdb_version,
            preamble_digest: digest(&preamble),
        })
    }

    /// Decode a descriptor from bytes already in memory.
    ///
    /// `preamble` must hold at least [`TZDB_VERSION_PREFIX_LEN`] bytes; extra
    /// bytes are ignored.
    pub fn parse(preamble: &[u8]) -> Result<Self> {
        let major = preamble
            .get(..MAJOR_VERSION_PREFIX_LEN)
            .ok_or_else(|| short(MEMORY_ORIGIN, MAJOR_VERSION_PREFIX_LEN, preamble.len()))?;
        let full = preamble
            .get(..TZDB_VERSION_PREFIX_LEN)
            .ok_or_else(|| short(MEMORY_ORIGIN, TZDB_VERSION_PREFIX_LEN, preamble.len()))?;

        Ok(Self {
            major_format_version: major_version_from(major, MEMORY_ORIGIN)?,
            tzdb_version: tzdb_version_from(full, MEMORY_ORIGIN)?,
            preamble_digest: digest(full),
        })
    }

    pub fn major_format_version(&self) -> &str {
        &self.major_format_version
    }

    pub fn tzdb_version(&self) -> &str {
        &self.tzdb_version
    }

    pub fn preamble_digest(&self) -> &str {
        &self.preamble_digest
    }
}

/// Read the major format version (`xxx`) from the first 7 bytes of `path`.
pub fn read_major_format_version(path: &Path) -> Result<String> {
    let bytes = read_exact_prefix(path, MAJOR_VERSION_PREFIX_LEN)?;
    major_version_from(&bytes, &path.display().to_string())
}

/// Read the tzdb version (`zzzzz`) from the first 13 bytes of `path`.
pub fn read_tzdb_version(path: &Path) -> Result<String> {
    let bytes = read_exact_prefix(path, TZDB_VERSION_PREFIX_LEN)?;
    tzdb_version_from(&bytes, &path.display().to_string())
}

fn major_version_from(bytes: &[u8], origin: &str) -> Result<String> {
    let text = decode(bytes, MAJOR_VERSION_PREFIX_LEN, origin)?;
    component(text, '.', 0, "major format version")
}

fn tzdb_version_from(bytes: &[u8], origin: &str) -> Result<String> {
    let text = decode(bytes, TZDB_VERSION_PREFIX_LEN, origin)?;
    component(text, '|', 1, "tzdb version")
}

fn decode<'a>(bytes: &'a [u8], expected: usize, origin: &str) -> Result<&'a str> {
    if bytes.len() != expected {
        return Err(short(origin, expected, bytes.len()));
    }
    if !bytes.is_ascii() {
        return Err(TzCompatError::NotAscii {
            origin: origin.to_string(),
        });
    }
    std::str::from_utf8(bytes).map_err(|_| TzCompatError::NotAscii {
        origin: origin.to_string(),
    })
}

/// Split `text` on `delimiter` and return component `index`.
///
/// Trailing empty components are dropped before indexing, so `"005."` has one
/// component and `"..."` has none.
fn component(text: &str, delimiter: char, index: usize, field: &'static str) -> Result<String> {
    let mut parts: Vec<&str> = text.split(delimiter).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }

    parts
        .get(index)
        .map(|p| p.to_string())
        .ok_or_else(|| TzCompatError::MissingField {
            field,
            delimiter,
            content: text.to_string(),
        })
}

fn short(origin: &str, expected: usize, actual: usize) -> TzCompatError {
    TzCompatError::ShortRead {
        origin: origin.to_string(),
        expected,
        actual,
    }
}

fn digest(bytes: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(bytes))
}
