//! Recording configuration types

use crate::config::CameraConfig;
use crate::types::Resolution;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Video width in pixels
    pub width: u32,
    /// Video height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: f64,
    /// Target bitrate in bits per second
    pub bitrate: u32,
    /// Enable fast-start for web playback (moov before mdat)
    pub fast_start: bool,
    /// Optional title metadata
    pub title: Option<String>,
}

impl RecordingConfig {
    /// Create a new recording configuration with explicit dimensions
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            bitrate: default_bitrate(Resolution::new(width, height)),
            fast_start: true,
            title: None,
        }
    }

    /// Recording matching the negotiated stream size and the configured rate
    pub fn for_stream(resolution: Resolution, camera: &CameraConfig) -> Self {
        let fps = if camera.fps() > 0.0 { camera.fps() } else { 30.0 };
        Self::new(resolution.width, resolution.height, fps).with_title(camera.video_name.clone())
    }

    /// Set the title metadata
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set fast-start mode
    pub fn with_fast_start(mut self, enabled: bool) -> Self {
        self.fast_start = enabled;
        self
    }
}

/// 2.5 Mbps up to 720p, 5 Mbps up to 1080p, 10 Mbps above
fn default_bitrate(resolution: Resolution) -> u32 {
    match resolution.area() {
        0..=921_600 => 2_500_000,
        921_601..=2_073_600 => 5_000_000,
        _ => 10_000_000,
    }
}

/// Statistics returned after finishing a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingStats {
    /// Total number of video frames written
    pub video_frames: u64,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Total bytes written to file
    pub bytes_written: u64,
    /// Number of dropped frames (if any)
    pub dropped_frames: u64,
    /// Output file path
    pub output_path: PathBuf,
}

impl RecordingStats {
    /// Calculate the average bitrate achieved
    pub fn avg_bitrate(&self) -> f64 {
        if self.duration_secs > 0.0 {
            (self.bytes_written as f64 * 8.0) / self.duration_secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitrate_tiers() {
        assert_eq!(RecordingConfig::new(640, 480, 30.0).bitrate, 2_500_000);
        assert_eq!(RecordingConfig::new(1280, 720, 30.0).bitrate, 2_500_000);
        assert_eq!(RecordingConfig::new(1920, 1080, 30.0).bitrate, 5_000_000);
        assert_eq!(RecordingConfig::new(3840, 2160, 30.0).bitrate, 10_000_000);
    }

    #[test]
    fn test_for_stream_uses_camera_rate() {
        let mut camera = CameraConfig::default();
        camera.fps_num = 15;
        camera.fps_denom = 1;
        let config = RecordingConfig::for_stream(Resolution::new(640, 480), &camera);
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.fps, 15.0);
        assert_eq!(config.title.as_deref(), Some("boothcam_video"));
    }

    #[test]
    fn test_avg_bitrate() {
        let stats = RecordingStats {
            video_frames: 30,
            duration_secs: 2.0,
            bytes_written: 250_000,
            dropped_frames: 0,
            output_path: PathBuf::from("out.mp4"),
        };
        assert_eq!(stats.avg_bitrate(), 1_000_000.0);
    }
}
