//! MP4 writer combining the H.264 encoder and the muxer

use super::encoder::H264Encoder;
use super::{RecordingConfig, RecordingStats, VideoWriter, WriterFactory};
use crate::errors::CameraError;
use crate::types::CameraFrame;
use muxide::api::{Metadata, MuxerBuilder, VideoCodec};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct Mp4Writer {
    encoder: H264Encoder,
    muxer: muxide::api::Muxer<BufWriter<File>>,
    config: RecordingConfig,
    output_path: PathBuf,
    frame_count: u64,
    dropped_frames: u64,
    start_time: Instant,
}

impl Mp4Writer {
    pub fn create(output_path: &Path, config: RecordingConfig) -> Result<Self, CameraError> {
        // Encoder first so a bad size never leaves an empty file behind
        let encoder = H264Encoder::new(config.width, config.height, config.fps, config.bitrate)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CameraError::IoError(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }

        let file = File::create(output_path)
            .map_err(|e| CameraError::IoError(format!("Failed to create output file: {}", e)))?;

        let mut metadata = Metadata::new().with_current_time();
        if let Some(ref title) = config.title {
            metadata = metadata.with_title(title);
        }

        let muxer = MuxerBuilder::new(BufWriter::new(file))
            .video(VideoCodec::H264, config.width, config.height, config.fps)
            .with_fast_start(config.fast_start)
            .with_metadata(metadata)
            .build()
            .map_err(|e| {
                let _ = std::fs::remove_file(output_path);
                CameraError::MuxingError(format!("Failed to create muxer: {}", e))
            })?;

        log::info!(
            "Recording {}x{}@{} to {:?}",
            config.width,
            config.height,
            config.fps,
            output_path
        );

        Ok(Self {
            encoder,
            muxer,
            config,
            output_path: output_path.to_path_buf(),
            frame_count: 0,
            dropped_frames: 0,
            start_time: Instant::now(),
        })
    }
}

impl VideoWriter for Mp4Writer {
    fn write_frame(&mut self, frame: &CameraFrame) -> Result<(), CameraError> {
        if frame.width != self.config.width || frame.height != self.config.height {
            return Err(CameraError::EncodingError(format!(
                "Frame dimensions {}x{} don't match recording config {}x{}",
                frame.width, frame.height, self.config.width, self.config.height
            )));
        }

        let encoded = self.encoder.encode_rgb(&frame.data)?;

        // Encoder may skip a frame under rate control
        if encoded.data.is_empty() {
            self.dropped_frames += 1;
            return Ok(());
        }

        let pts = self.frame_count as f64 / self.config.fps;
        self.muxer
            .write_video(pts, &encoded.data, encoded.is_keyframe)
            .map_err(|e| CameraError::MuxingError(format!("Failed to write frame: {}", e)))?;

        self.frame_count += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RecordingStats, CameraError> {
        let this = *self;
        let muxer_stats = this.muxer.finish_with_stats().map_err(|e| {
            CameraError::MuxingError(format!("Failed to finalize recording: {}", e))
        })?;

        log::info!(
            "Finished {:?}: {} frames in {:.1}s wall time",
            this.output_path,
            muxer_stats.video_frames,
            this.start_time.elapsed().as_secs_f64()
        );

        Ok(RecordingStats {
            video_frames: muxer_stats.video_frames,
            duration_secs: muxer_stats.duration_secs,
            bytes_written: muxer_stats.bytes_written,
            dropped_frames: this.dropped_frames,
            output_path: this.output_path,
        })
    }
}

/// Produces [`Mp4Writer`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct Mp4WriterFactory;

impl WriterFactory for Mp4WriterFactory {
    fn extension(&self) -> &str {
        "mp4"
    }

    fn create(
        &self,
        path: &Path,
        config: RecordingConfig,
    ) -> Result<Box<dyn VideoWriter>, CameraError> {
        Ok(Box::new(Mp4Writer::create(path, config)?))
    }
}
