//! Core value types shared by the registry, session and backends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Host platform the crate was compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    Unknown,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOS => "macos",
            Platform::Linux => "linux",
            Platform::Unknown => "unknown",
        }
    }
}

/// Frame size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid width '{}': {}", w, e))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid height '{}': {}", h, e))?;
        if width == 0 || height == 0 {
            return Err(format!("resolution must be non-zero, got '{}'", s));
        }
        Ok(Self { width, height })
    }
}

/// Sort descending by area and drop duplicates
pub fn normalize_resolutions(mut list: Vec<Resolution>) -> Vec<Resolution> {
    list.sort_by(|a, b| b.area().cmp(&a.area()).then(b.width.cmp(&a.width)));
    list.dedup();
    list
}

/// Identifies one physical or virtual camera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Stable identifier, e.g. `/dev/video0`
    pub id: String,
    /// Human readable name reported by the driver
    pub name: String,
    /// Bus or mount location label
    pub location: String,
}

impl DeviceDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: String::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Matches either the stable id or the display name
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.name == key
    }
}

/// One decoded RGB8 frame delivered by an open device
#[derive(Debug, Clone, Serialize)]
pub struct CameraFrame {
    pub id: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
}

impl CameraFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, device_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            data,
            width,
            height,
            format: "RGB8".to_string(),
            device_id,
            timestamp: Utc::now(),
        }
    }

    pub fn with_format(mut self, format: String) -> Self {
        self.format = format;
        self
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Whether the buffer length matches a packed RGB8 image of this size
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == (self.width as usize) * (self.height as usize) * 3
    }
}
