//! Windows backend on MediaFoundation through nokhwa

use super::nokhwa_device::NokhwaDevice;
use super::{CameraBackend, CameraDevice};
use crate::errors::CameraError;
use crate::types::DeviceDescriptor;
use nokhwa::{query, utils::ApiBackend};

#[derive(Debug, Default)]
pub struct WindowsBackend;

impl WindowsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CameraBackend for WindowsBackend {
    fn name(&self) -> &str {
        "mediafoundation"
    }

    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, CameraError> {
        let cameras = query(ApiBackend::MediaFoundation).map_err(|e| {
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
        log::info!("Initializing MediaFoundation camera {}", device.id);
        let camera = NokhwaDevice::open(
            ApiBackend::MediaFoundation,
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
    query(ApiBackend::MediaFoundation)
        .map(|cameras| cameras.iter().any(|c| c.index().to_string() == device.id))
        .unwrap_or(false)
}
