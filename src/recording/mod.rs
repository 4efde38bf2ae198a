//! Video recording
//!
//! The capture session writes frames through the [`VideoWriter`] trait and
//! creates writers through a [`WriterFactory`]. With the `recording`
//! feature, [`Mp4WriterFactory`] produces H.264 in MP4 using:
//! - openh264 for H.264 encoding
//! - muxide for MP4 muxing

mod config;
#[cfg(feature = "recording")]
mod encoder;
#[cfg(feature = "recording")]
mod mp4;

pub use config::{RecordingConfig, RecordingStats};
#[cfg(feature = "recording")]
pub use encoder::{EncodedFrame, H264Encoder};
#[cfg(feature = "recording")]
pub use mp4::{Mp4Writer, Mp4WriterFactory};

use crate::errors::CameraError;
use crate::types::CameraFrame;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Sink for the frames of one recording
pub trait VideoWriter {
    fn write_frame(&mut self, frame: &CameraFrame) -> Result<(), CameraError>;

    /// Finalize the file
    fn finish(self: Box<Self>) -> Result<RecordingStats, CameraError>;
}

/// Creates a [`VideoWriter`] per recording
pub trait WriterFactory {
    /// File extension of produced recordings, without the dot
    fn extension(&self) -> &str;

    fn create(
        &self,
        path: &Path,
        config: RecordingConfig,
    ) -> Result<Box<dyn VideoWriter>, CameraError>;
}

/// Writer factory for this build: MP4 with the `recording` feature,
/// otherwise one that refuses to record
pub fn native_writer_factory() -> Box<dyn WriterFactory> {
    #[cfg(feature = "recording")]
    {
        Box::new(Mp4WriterFactory)
    }
    #[cfg(not(feature = "recording"))]
    {
        Box::new(UnsupportedWriterFactory)
    }
}

/// Stand-in used when the crate is built without an encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedWriterFactory;

impl WriterFactory for UnsupportedWriterFactory {
    fn extension(&self) -> &str {
        "mp4"
    }

    fn create(
        &self,
        _path: &Path,
        _config: RecordingConfig,
    ) -> Result<Box<dyn VideoWriter>, CameraError> {
        Err(CameraError::InvalidState(
            "built without the recording feature".to_string(),
        ))
    }
}

/// `<dir>/<base>_<YYYYMMDD_HHMMSS>.<ext>`, with `_N` added until the name is free
pub fn timestamped_path(dir: &Path, base: &str, ext: &str, now: DateTime<Local>) -> PathBuf {
    let stem = format!("{}_{}", base, now.format("%Y%m%d_%H%M%S"));
    let mut candidate = dir.join(format!("{}.{}", stem, ext));
    let mut suffix = 1u32;
    while candidate.exists() {
        candidate = dir.join(format!("{}_{}.{}", stem, suffix, ext));
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests;
