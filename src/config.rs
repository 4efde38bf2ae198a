//! Configuration management for boothcam
//!
//! Loads and saves the persisted camera record: requested resolution and
//! frame rate, the last used device, and the photo/video output locations.

use crate::errors::CameraError;
use crate::types::{DeviceDescriptor, Resolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fallback resolution when nothing usable is stored
pub const DEFAULT_RESOLUTION: Resolution = Resolution::new(1280, 720);

/// Persisted camera settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Requested capture width
    pub width: u32,
    /// Requested capture height
    pub height: u32,
    /// Name (or id) of the last opened device
    pub device_name: String,
    /// Location label of the last opened device
    pub device_location: String,
    pub video_path: PathBuf,
    /// Base name for recordings; a timestamp is appended
    pub video_name: String,
    pub photo_path: PathBuf,
    /// Base name for photos; a timestamp is appended
    pub photo_name: String,
    pub fps_num: u32,
    pub fps_denom: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_RESOLUTION.width,
            height: DEFAULT_RESOLUTION.height,
            device_name: String::new(),
            device_location: String::new(),
            video_path: media_dir(dirs::video_dir()),
            video_name: "boothcam_video".to_string(),
            photo_path: media_dir(dirs::picture_dir()),
            photo_name: "boothcam_photo".to_string(),
            fps_num: 30,
            fps_denom: 1,
        }
    }
}

fn media_dir(base: Option<PathBuf>) -> PathBuf {
    base.map(|dir| dir.join("Camera"))
        .unwrap_or_else(|| PathBuf::from("./captures"))
}

impl CameraConfig {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.width = resolution.width;
        self.height = resolution.height;
    }

    /// Frames per second as a float, 0.0 when the denominator is zero
    pub fn fps(&self) -> f64 {
        if self.fps_denom == 0 {
            0.0
        } else {
            self.fps_num as f64 / self.fps_denom as f64
        }
    }

    /// Remember the device so the next start can reopen the same camera
    pub fn remember_device(&mut self, device: &DeviceDescriptor) {
        self.device_name = device.id.clone();
        self.device_location = device.location.clone();
    }

    /// Last device key, `None` when nothing was stored
    pub fn last_device(&self) -> Option<&str> {
        if self.device_name.is_empty() {
            None
        } else {
            Some(&self.device_name)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("Invalid resolution".to_string());
        }
        if self.fps_num == 0 || self.fps_denom == 0 {
            return Err("Invalid frame rate (numerator and denominator must be non-zero)".to_string());
        }
        if self.video_name.is_empty() || self.photo_name.is_empty() {
            return Err("Output base names must not be empty".to_string());
        }
        Ok(())
    }
}

/// Reads and writes the [`CameraConfig`] TOML file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at `<config dir>/boothcam/boothcam.toml`
    pub fn default_location() -> Self {
        let path = dirs::config_dir()
            .map(|dir| dir.join("boothcam").join("boothcam.toml"))
            .unwrap_or_else(|| PathBuf::from("boothcam.toml"));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, failing on missing, unreadable or invalid storage
    pub fn try_load(&self) -> Result<CameraConfig, CameraError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            CameraError::ConfigLoadFailure(format!("Failed to read {:?}: {}", self.path, e))
        })?;

        let config: CameraConfig = toml::from_str(&contents).map_err(|e| {
            CameraError::ConfigLoadFailure(format!("Failed to parse {:?}: {}", self.path, e))
        })?;

        config
            .validate()
            .map_err(|e| CameraError::ConfigLoadFailure(format!("{:?}: {}", self.path, e)))?;

        Ok(config)
    }

    /// Load the record, falling back to defaults on any storage problem
    pub fn parse_config(&self) -> CameraConfig {
        if !self.path.exists() {
            log::info!("Config file not found at {:?}, using defaults", self.path);
            return CameraConfig::default();
        }

        match self.try_load() {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", self.path);
                config
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                CameraConfig::default()
            }
        }
    }

    /// Save the record as pretty TOML
    pub fn save_config(&self, config: &CameraConfig) -> Result<(), CameraError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CameraError::ConfigSaveFailure(format!(
                        "Failed to create config directory: {}",
                        e
                    ))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            CameraError::ConfigSaveFailure(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&self.path, toml_string).map_err(|e| {
            CameraError::ConfigSaveFailure(format!("Failed to write {:?}: {}", self.path, e))
        })?;

        log::info!("Saved configuration to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CameraConfig::default();
        assert_eq!(config.resolution(), Resolution::new(1280, 720));
        assert_eq!((config.fps_num, config.fps_denom), (30, 1));
        assert!(config.last_device().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad = CameraConfig::default();
        bad.width = 0;
        assert!(bad.validate().is_err());

        let mut bad_fps = CameraConfig::default();
        bad_fps.fps_denom = 0;
        assert!(bad_fps.validate().is_err());
        assert_eq!(bad_fps.fps(), 0.0);
    }

    #[test]
    fn test_config_toml_keys() {
        let toml_string = toml::to_string_pretty(&CameraConfig::default()).unwrap();
        for key in [
            "width",
            "height",
            "device_name",
            "device_location",
            "video_path",
            "video_name",
            "photo_path",
            "photo_name",
            "fps_num",
            "fps_denom",
        ] {
            assert!(toml_string.contains(key), "missing key {}", key);
        }
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: CameraConfig = toml::from_str("width = 640\nheight = 480\n").unwrap();
        assert_eq!(config.resolution(), Resolution::new(640, 480));
        assert_eq!(config.fps_num, 30);
    }

    #[test]
    fn test_remember_device() {
        let mut config = CameraConfig::default();
        let dev = DeviceDescriptor::new("/dev/video2", "USB Cam").with_location("usb-0000:00:14.0-1");
        config.remember_device(&dev);
        assert_eq!(config.last_device(), Some("/dev/video2"));
        assert_eq!(config.device_location, "usb-0000:00:14.0-1");
    }
}
