//! boothcam: camera core for photo-booth applications
//!
//! This crate owns everything between the operating system's camera stack
//! and a preview/record UI: which cameras exist, which one is open, what
//! resolution it runs at, where photos and recordings go, and what the user
//! chose last time.
//!
//! # Features
//! - Device enumeration and hot-plug monitoring (V4L2, AVFoundation, MediaFoundation)
//! - A single capture session with start/stop/switch/restart
//! - Resolution negotiation against what the device reports
//! - MP4 recording with pause/resume (`recording` feature)
//! - JPEG photos
//! - Settings persisted as TOML
//!
//! # Usage
//! ```rust,ignore
//! use boothcam::{CaptureSession, ConfigStore};
//!
//! let mut session = CaptureSession::native(ConfigStore::default_location());
//! let mut events = session.subscribe();
//! session.start()?;
//! loop {
//!     session.process_frame()?;
//!     if let Some(frame) = session.take_preview_frame() {
//!         // draw frame
//!     }
//! }
//! ```
pub mod config;
pub mod errors;
pub mod photo;
pub mod platform;
pub mod recording;
pub mod registry;
pub mod session;
pub mod timing;
pub mod types;

// Testing utilities - synthetic backend for hardware-free tests
pub mod testing;

// Re-exports for convenience
pub use config::{CameraConfig, ConfigStore};
pub use errors::CameraError;
pub use platform::{native_backend, CameraBackend, CameraDevice, DeviceEvent, DeviceMonitor};
pub use registry::DeviceRegistry;
pub use session::{CaptureSession, RecorderState, SessionEvent, SessionState};
pub use types::{CameraFrame, DeviceDescriptor, Platform, Resolution};

/// Detect the current platform using the Platform enum
pub fn current_platform() -> Platform {
    Platform::current()
}

/// Initialize logging for the camera system
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "boothcam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        platform: Platform::current(),
        recording: cfg!(feature = "recording"),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub platform: Platform,
    /// Built with the MP4 recorder
    pub recording: bool,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let platform = current_platform();
        assert_ne!(platform, Platform::Unknown);
    }

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "boothcam");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
        assert_eq!(info.recording, cfg!(feature = "recording"));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
