//! macOS backend on AVFoundation through nokhwa

use super::nokhwa_device::NokhwaDevice;
use super::{CameraBackend, CameraDevice};
use crate::errors::CameraError;
use crate::types::DeviceDescriptor;
use nokhwa::{query, utils::ApiBackend};

#[derive(Debug, Default)]
pub struct MacOSBackend;

impl MacOSBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CameraBackend for MacOSBackend {
    fn name(&self) -> &str {
        "avfoundation"
    }

    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, CameraError> {
        let cameras = query(ApiBackend::AVFoundation).map_err(|e| {
            CameraError::DeviceUnavailable(format!("Failed to query cameras: {}", e))
        })?;

        Ok(cameras
            .into_iter()
            .map(|info| {
                DeviceDescriptor::new(info.index().to_string(), info.human_name())
                    .with_location(info.misc())
            })
            .collect())
    }

    fn open(
        &self,
        device: &DeviceDescriptor,
        fps: u32,
    ) -> Result<Box<dyn CameraDevice>, CameraError> {
        let camera = NokhwaDevice::open(
            ApiBackend::AVFoundation,
            NokhwaDevice::index_for(&device.id),
            device.clone(),
            fps,
            still_listed,
            None,
        )?;
        Ok(Box::new(camera))
    }
}

fn still_listed(device: &DeviceDescriptor) -> bool {
    query(ApiBackend::AVFoundation)
        .map(|cameras| cameras.iter().any(|c| c.index().to_string() == device.id))
        .unwrap_or(false)
}
