//! Still photo capture from preview frames

use crate::errors::CameraError;
use crate::recording::timestamped_path;
use crate::types::CameraFrame;
use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JPEG quality used for photos
pub const PHOTO_QUALITY: u8 = 95;

/// Encode `frame` as JPEG at `<dir>/<base>_<timestamp>.jpg`
pub fn save_photo(frame: &CameraFrame, dir: &Path, base: &str) -> Result<PathBuf, CameraError> {
    if !frame.is_valid() {
        return Err(CameraError::CaptureError(format!(
            "Frame {} is not a packed RGB8 {}x{} image",
            frame.id, frame.width, frame.height
        )));
    }

    fs::create_dir_all(dir)
        .map_err(|e| CameraError::IoError(format!("Failed to create {:?}: {}", dir, e)))?;

    let path = timestamped_path(dir, base, "jpg", Local::now());
    let file = File::create(&path)
        .map_err(|e| CameraError::IoError(format!("Failed to create {:?}: {}", path, e)))?;

    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), PHOTO_QUALITY);
    encoder
        .encode(
            &frame.data,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CameraError::IoError(format!("Failed to encode photo: {}", e)))?;

    log::info!("Saved photo {} to {:?}", frame.id, path);
    Ok(path)
}
