//! Tests for the recording module

#[cfg(test)]
mod recording_tests {
    use crate::recording::timestamped_path;
    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    #[test]
    fn test_timestamped_path_format() {
        let dir = tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let path = timestamped_path(dir.path(), "clip", "mp4", now);
        assert_eq!(path, dir.path().join("clip_20240309_140507.mp4"));
    }

    #[test]
    fn test_timestamped_path_avoids_overwrite() {
        let dir = tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let first = timestamped_path(dir.path(), "clip", "mp4", now);
        std::fs::write(&first, b"x").unwrap();
        let second = timestamped_path(dir.path(), "clip", "mp4", now);
        assert_eq!(second, dir.path().join("clip_20240309_140507_1.mp4"));

        std::fs::write(&second, b"x").unwrap();
        let third = timestamped_path(dir.path(), "clip", "mp4", now);
        assert_eq!(third, dir.path().join("clip_20240309_140507_2.mp4"));
    }

    #[cfg(feature = "recording")]
    #[test]
    fn test_mp4_factory_workflow() {
        use crate::recording::{Mp4WriterFactory, RecordingConfig, WriterFactory};
        use crate::testing::synthetic_video_frame;

        let dir = tempdir().unwrap();
        let output = dir.path().join("workflow.mp4");
        let factory = Mp4WriterFactory;
        assert_eq!(factory.extension(), "mp4");

        let mut writer = factory
            .create(&output, RecordingConfig::new(320, 240, 15.0).with_title("Integration Test"))
            .expect("Failed to create writer");

        for i in 0..15 {
            writer
                .write_frame(&synthetic_video_frame(i, 320, 240))
                .expect("Failed to write frame");
        }

        let stats = writer.finish().expect("Failed to finish");
        assert_eq!(stats.video_frames, 15);
        assert!(stats.bytes_written > 0);
        assert!(std::fs::metadata(&output).is_ok());
    }

    #[cfg(not(feature = "recording"))]
    #[test]
    fn test_native_factory_refuses_without_encoder() {
        use crate::errors::CameraError;
        use crate::recording::{native_writer_factory, RecordingConfig};

        let dir = tempdir().unwrap();
        let factory = native_writer_factory();
        let result = factory.create(&dir.path().join("x.mp4"), RecordingConfig::new(640, 480, 30.0));
        assert!(matches!(result, Err(CameraError::InvalidState(_))));
    }

    #[cfg(feature = "recording")]
    #[test]
    fn test_rejected_size_leaves_no_file() {
        use crate::recording::{Mp4WriterFactory, RecordingConfig, WriterFactory};

        let dir = tempdir().unwrap();
        let output = dir.path().join("odd.mp4");
        let result = Mp4WriterFactory.create(&output, RecordingConfig::new(321, 240, 30.0));

        assert!(result.is_err());
        assert!(!output.exists());
    }
}
