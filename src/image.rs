//! Golden-image comparison.
//!
//! Rendered responses are persisted as `{tag}_actual.png` under the system
//! temp directory and compared byte-for-byte against a checked-in
//! `{tag}_expected.png`. There is no tolerance: rendering must be
//! bit-reproducible, which is the point of these regression tests.
//!
//! Set `UPDATE_EXPECTED=1` to record the actual bytes as the new golden
//! instead of comparing.

use std::path::{Path, PathBuf};

use crate::error::{HarnessError, HarnessResult};

/// Where the actual image for a tag is written. Tags may contain `/`.
pub fn actual_image_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_actual.png", tag))
}

/// Where the golden image for a tag is expected.
pub fn expected_image_path(resource_dir: &Path, tag: &str) -> PathBuf {
    resource_dir.join(format!("{}_expected.png", tag))
}

/// Persist a rendered response for later comparison.
pub fn write_actual_image(bytes: &[u8], tag: &str) -> HarnessResult<PathBuf> {
    let path = actual_image_path(tag);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Compare the previously written actual image against the golden one.
pub fn compare_images(resource_dir: &Path, tag: &str) -> HarnessResult<()> {
    let actual_path = actual_image_path(tag);
    let expected_path = expected_image_path(resource_dir, tag);

    if std::env::var("UPDATE_EXPECTED").is_ok_and(|v| v == "1") {
        if let Some(parent) = expected_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&actual_path, &expected_path)?;
        tracing::info!(tag, "recorded new golden image");
        return Ok(());
    }

    if !expected_path.exists() {
        return Err(HarnessError::MissingExpectedImage(expected_path));
    }

    let actual = std::fs::read(&actual_path)?;
    let expected = std::fs::read(&expected_path)?;

    if actual != expected {
        return Err(HarnessError::ImageMismatch {
            actual: actual_path,
            expected: expected_path,
        });
    }

    Ok(())
}
