//! Test fixture helpers
//!
//! Stages fixture files (always with the license file that sits next to
//! them) into scratch directories, and tears those directories down.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory, under a resource root, that holds fixture data
pub const TEST_DATA_RESOURCE_DIR: &str = "data";

/// License file expected beside every fixture
pub const LICENSE_FILE_NAME: &str = "LICENSE";

/// Name the module version file is staged under
pub const VERSION_FILE_NAME: &str = "tz_version";

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("FIXTURE/NOT_FOUND: resource={}", .0.display())]
    NotFound(PathBuf),

    #[error("FIXTURE/NOT_DELETED: {} still exists", .0.display())]
    NotDeleted(PathBuf),

    #[error("FIXTURE/IO: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FixtureError>;

/// Copy `data/<resource>` from `resource_root` into `target_dir`, together
/// with the `LICENSE` in the resource's directory.
///
/// `target_dir` is created if needed. Returns the staged resource path.
pub fn copy_test_resource(resource_root: &Path, resource: &str, target_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(target_dir)?;

    let relative = Path::new(TEST_DATA_RESOURCE_DIR).join(resource);
    let source = resource_root.join(&relative);
    let file_name = source
        .file_name()
        .ok_or_else(|| FixtureError::NotFound(source.clone()))?;

    let staged = target_dir.join(file_name);
    copy_resource(&source, &staged)?;

    let license_dir = source.parent().unwrap_or(resource_root);
    copy_resource(
        &license_dir.join(LICENSE_FILE_NAME),
        &target_dir.join(LICENSE_FILE_NAME),
    )?;

    tracing::debug!(resource = %relative.display(), target = %staged.display(), "staged test resource");
    Ok(staged)
}

fn copy_resource(source: &Path, target: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(FixtureError::NotFound(source.to_path_buf()));
    }
    fs::copy(source, target)?;
    Ok(())
}

/// Fresh temp directory named after `prefix`; removed when dropped.
pub fn create_temp_dir(prefix: &str) -> Result<tempfile::TempDir> {
    Ok(tempfile::Builder::new().prefix(prefix).tempdir()?)
}

/// Recursively delete `dir`, then confirm it is gone.
pub fn delete_directory(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    if dir.exists() {
        return Err(FixtureError::NotDeleted(dir.to_path_buf()));
    }
    Ok(())
}

/// Write a module version file with `contents` into `dir`.
pub fn write_version_file(dir: &Path, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
    let path = dir.join(VERSION_FILE_NAME);
    fs::write(&path, contents)?;
    Ok(path)
}

/// Workspace-level fixture root (`testing/fixtures`).
pub fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("testing")
        .join("fixtures")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_root() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join(TEST_DATA_RESOURCE_DIR).join("v7");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("tz_version"), "007.002|00042|").unwrap();
        fs::write(data.join(LICENSE_FILE_NAME), "license text").unwrap();
        root
    }

    #[test]
    fn test_copy_with_license() {
        let root = resource_root();
        let target = tempfile::tempdir().unwrap();
        let nested = target.path().join("a").join("b");

        let staged = copy_test_resource(root.path(), "v7/tz_version", &nested).unwrap();

        assert_eq!(staged, nested.join("tz_version"));
        assert_eq!(fs::read_to_string(&staged).unwrap(), "007.002|00042|");
        assert!(nested.join(LICENSE_FILE_NAME).is_file());
    }

    #[test]
    fn test_missing_resource_fails() {
        let root = resource_root();
        let target = tempfile::tempdir().unwrap();

        let err = copy_test_resource(root.path(), "v7/absent", target.path()).unwrap_err();
        assert!(matches!(err, FixtureError::NotFound(_)));
    }

    #[test]
    fn test_missing_license_fails() {
        let root = resource_root();
        fs::remove_file(root.path().join("data/v7").join(LICENSE_FILE_NAME)).unwrap();
        let target = tempfile::tempdir().unwrap();

        let err = copy_test_resource(root.path(), "v7/tz_version", target.path()).unwrap_err();
        match err {
            FixtureError::NotFound(path) => assert!(path.ends_with(LICENSE_FILE_NAME)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_delete_directory() {
        let temp = create_temp_dir("TzCompatTest").unwrap();
        let dir = temp.path().join("staged");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("f"), "x").unwrap();

        delete_directory(&dir).unwrap();
        assert!(!dir.exists());

        // already gone is fine
        delete_directory(&dir).unwrap();
    }

    #[test]
    fn test_temp_dir_prefix() {
        let temp = create_temp_dir("TzCompatTest").unwrap();
        let name = temp.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("TzCompatTest"));
    }

    #[test]
    fn test_workspace_fixtures_present() {
        let root = fixtures_root();
        assert!(root.join(TEST_DATA_RESOURCE_DIR).join(LICENSE_FILE_NAME).is_file());
    }
}
