//! Bounded prefix reads over the module version file
use crate::error::{Result, TzCompatError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads up to `max_bytes` bytes from the start of `path`.
///
/// The returned buffer is shorter than `max_bytes` if the file is shorter.
/// Nothing past `max_bytes` is ever read.
pub fn read_prefix(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    if max_bytes == 0 {
        return Err(TzCompatError::InvalidArgument(format!(
            "max_bytes == {}",
            max_bytes
        )));
    }

    let file = File::open(path).map_err(|e| TzCompatError::io(path, e))?;
    let mut buf = Vec::with_capacity(max_bytes);
    file.take(max_bytes as u64)
        .read_to_end(&mut buf)
        .map_err(|e| TzCompatError::io(path, e))?;

    tracing::trace!(path = %path.display(), requested = max_bytes, read = buf.len(), "read prefix");
    Ok(buf)
}

/// Reads exactly `len` bytes from the start of `path`.
///
/// A short file is a [`TzCompatError::ShortRead`]; no partial result is returned.
pub fn read_exact_prefix(path: &Path, len: usize) -> Result<Vec<u8>> {
    let bytes = read_prefix(path, len)?;
    if bytes.len() != len {
        return Err(TzCompatError::ShortRead {
            origin: path.display().to_string(),
            expected: len,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}
