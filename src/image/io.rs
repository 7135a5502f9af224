//! File helpers used by the command-line tool.
//!
//! - `load_grayscale_f32`: decode an image and convert it to intensities in [0, 1].
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::ImageF32;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk as 8-bit luma, scaled to [0, 1].
pub fn load_grayscale_f32(path: &Path) -> Result<ImageF32, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    let w = img.width() as usize;
    let h = img.height() as usize;
    let data = img.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
    Ok(ImageF32 {
        w,
        h,
        stride: w,
        data,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
