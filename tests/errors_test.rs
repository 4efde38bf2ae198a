#[cfg(test)]
mod error_tests {
    use boothcam::errors::CameraError;
    use std::error::Error;

    #[test]
    fn test_camera_error_unavailable() {
        let error = CameraError::DeviceUnavailable("/dev/video0 busy".to_string());
        assert!(error.to_string().contains("Camera unavailable"));
        assert!(error.to_string().contains("/dev/video0 busy"));
    }

    #[test]
    fn test_camera_error_disconnected() {
        let error = CameraError::DeviceDisconnected("/dev/video1".to_string());
        assert_eq!(error.to_string(), "Camera disconnected: /dev/video1");
        assert!(error.is_disconnect());
    }

    #[test]
    fn test_only_disconnect_is_disconnect() {
        let others = [
            CameraError::DeviceUnavailable("x".to_string()),
            CameraError::StreamError("x".to_string()),
            CameraError::CaptureError("x".to_string()),
            CameraError::IoError("x".to_string()),
        ];
        for error in others {
            assert!(!error.is_disconnect(), "{:?}", error);
        }
    }

    #[test]
    fn test_camera_error_display_trait() {
        let error = CameraError::CaptureError("Display test".to_string());
        assert_eq!(format!("{}", error), "Capture error: Display test");

        let error = CameraError::UnsupportedResolution("123x45".to_string());
        assert_eq!(format!("{}", error), "Unsupported resolution: 123x45");

        let error = CameraError::InvalidState("recording".to_string());
        assert_eq!(format!("{}", error), "Invalid session state: recording");
    }

    #[test]
    fn test_config_errors_display() {
        let load = CameraError::ConfigLoadFailure("bad toml".to_string());
        let save = CameraError::ConfigSaveFailure("read-only".to_string());
        assert_eq!(load.to_string(), "Config load error: bad toml");
        assert_eq!(save.to_string(), "Config save error: read-only");
    }

    #[test]
    fn test_camera_error_debug_format() {
        let error = CameraError::StreamError("Debug test".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("StreamError"));
        assert!(debug_str.contains("Debug test"));
    }

    #[test]
    fn test_camera_error_implements_error_trait() {
        let error = CameraError::DeviceUnavailable("Error trait test".to_string());
        let _error_trait: &dyn Error = &error;
        assert!(error.source().is_none());
    }

    #[test]
    fn test_all_error_variants() {
        let mut errors = vec![
            CameraError::DeviceUnavailable("a".to_string()),
            CameraError::DeviceDisconnected("b".to_string()),
            CameraError::UnsupportedResolution("c".to_string()),
            CameraError::ConfigLoadFailure("d".to_string()),
            CameraError::ConfigSaveFailure("e".to_string()),
            CameraError::CaptureError("f".to_string()),
            CameraError::StreamError("g".to_string()),
            CameraError::InvalidState("h".to_string()),
            CameraError::IoError("i".to_string()),
        ];

        #[cfg(feature = "recording")]
        {
            errors.push(CameraError::EncodingError("j".to_string()));
            errors.push(CameraError::MuxingError("k".to_string()));
        }

        for error in errors {
            assert!(!error.to_string().is_empty());
            assert!(!format!("{:?}", error).is_empty());
        }
    }

    #[test]
    fn test_error_clone_and_equality() {
        let original = CameraError::DeviceUnavailable("Clone test".to_string());
        let cloned = original.clone();
        assert_eq!(original, cloned);
        assert_ne!(
            original,
            CameraError::DeviceDisconnected("Clone test".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no write access");
        let error: CameraError = io.into();
        match error {
            CameraError::IoError(msg) => assert!(msg.contains("no write access")),
            other => panic!("Wrong error variant: {:?}", other),
        }
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn read_missing() -> Result<String, CameraError> {
            Ok(std::fs::read_to_string("/definitely/not/here/boothcam.toml")?)
        }

        assert!(matches!(read_missing(), Err(CameraError::IoError(_))));
    }

    #[test]
    fn test_error_message_with_special_characters() {
        let message = "Camera \"USB 2.0\" at usb-0000:00:14.0-1 (ünïcödé)";
        let error = CameraError::DeviceUnavailable(message.to_string());
        assert!(error.to_string().contains(message));
    }

    #[cfg(feature = "recording")]
    #[test]
    fn test_recording_errors_display() {
        assert_eq!(
            CameraError::EncodingError("odd width".to_string()).to_string(),
            "Encoding error: odd width"
        );
        assert_eq!(
            CameraError::MuxingError("closed".to_string()).to_string(),
            "Muxing error: closed"
        );
    }
}
