use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// Open failed, or no device could be found
    DeviceUnavailable(String),
    /// The open device went away while streaming
    DeviceDisconnected(String),
    UnsupportedResolution(String),
    ConfigLoadFailure(String),
    ConfigSaveFailure(String),
    CaptureError(String),
    StreamError(String),
    /// Operation not valid in the current session state
    InvalidState(String),
    IoError(String),
    #[cfg(feature = "recording")]
    EncodingError(String),
    #[cfg(feature = "recording")]
    MuxingError(String),
}

impl CameraError {
    /// True for errors that mean the hardware handle is gone for good
    pub fn is_disconnect(&self) -> bool {
        matches!(self, CameraError::DeviceDisconnected(_))
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CameraError::DeviceUnavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            CameraError::DeviceDisconnected(msg) => write!(f, "Camera disconnected: {}", msg),
            CameraError::UnsupportedResolution(msg) => {
                write!(f, "Unsupported resolution: {}", msg)
            }
            CameraError::ConfigLoadFailure(msg) => write!(f, "Config load error: {}", msg),
            CameraError::ConfigSaveFailure(msg) => write!(f, "Config save error: {}", msg),
            CameraError::CaptureError(msg) => write!(f, "Capture error: {}", msg),
            CameraError::StreamError(msg) => write!(f, "Stream error: {}", msg),
            CameraError::InvalidState(msg) => write!(f, "Invalid session state: {}", msg),
            CameraError::IoError(msg) => write!(f, "IO error: {}", msg),
            #[cfg(feature = "recording")]
            CameraError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            #[cfg(feature = "recording")]
            CameraError::MuxingError(msg) => write!(f, "Muxing error: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<std::io::Error> for CameraError {
    fn from(e: std::io::Error) -> Self {
        CameraError::IoError(e.to_string())
    }
}
