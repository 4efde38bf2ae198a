//! Linux backend: V4L2 enumeration and format queries, nokhwa streaming

use super::nokhwa_device::{NokhwaDevice, COMMON_RESOLUTIONS};
use super::{CameraBackend, CameraDevice};
use crate::errors::CameraError;
use crate::types::{DeviceDescriptor, Resolution};
use nokhwa::utils::ApiBackend;
use std::path::Path;
use v4l::capability::Flags;
use v4l::framesize::FrameSizeEnum;
use v4l::prelude::*;
use v4l::video::Capture;

#[derive(Debug, Default)]
pub struct LinuxBackend;

impl LinuxBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CameraBackend for LinuxBackend {
    fn name(&self) -> &str {
        "v4l2"
    }

    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, CameraError> {
        let mut nodes = v4l::context::enum_devices();
        nodes.sort_by_key(|node| node.index());

        let mut devices = Vec::new();
        for node in nodes {
            let path = node.path().to_string_lossy().to_string();
            let dev = match Device::with_path(node.path()) {
                Ok(dev) => dev,
                Err(e) => {
                    log::debug!("Skipping {}: {}", path, e);
                    continue;
                }
            };
            let caps = match dev.query_caps() {
                Ok(caps) => caps,
                Err(e) => {
                    log::debug!("Skipping {}: QUERYCAP failed: {}", path, e);
                    continue;
                }
            };

            // Metadata nodes share the card name but cannot capture
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                continue;
            }

            let name = node.name().unwrap_or_else(|| caps.card.clone());
            devices.push(DeviceDescriptor::new(path, name).with_location(caps.bus.clone()));
        }

        Ok(devices)
    }

    fn open(
        &self,
        device: &DeviceDescriptor,
        fps: u32,
    ) -> Result<Box<dyn CameraDevice>, CameraError> {
        if !device_present(device) {
            return Err(CameraError::DeviceUnavailable(format!(
                "{} is not present",
                device.id
            )));
        }

        let camera = NokhwaDevice::open(
            ApiBackend::Video4Linux,
            NokhwaDevice::index_for(&device.id),
            device.clone(),
            fps,
            device_present,
            Some(query_resolutions),
        )?;
        Ok(Box::new(camera))
    }
}

fn device_present(device: &DeviceDescriptor) -> bool {
    Path::new(&device.id).exists()
}

/// Frame sizes across every pixel format the node advertises
pub fn query_resolutions(device: &DeviceDescriptor) -> Result<Vec<Resolution>, CameraError> {
    let dev = Device::with_path(&device.id).map_err(|e| {
        CameraError::DeviceUnavailable(format!("Failed to open {}: {}", device.id, e))
    })?;

    let formats = dev.enum_formats().map_err(|e| {
        CameraError::CaptureError(format!("Failed to list formats on {}: {}", device.id, e))
    })?;

    let mut resolutions = Vec::new();
    for fmt_desc in formats {
        let Ok(frame_sizes) = dev.enum_framesizes(fmt_desc.fourcc) else {
            continue;
        };
        for size in frame_sizes {
            match size.size {
                FrameSizeEnum::Discrete(discrete) => {
                    resolutions.push(Resolution::new(discrete.width, discrete.height));
                }
                FrameSizeEnum::Stepwise(step) => {
                    resolutions.extend(COMMON_RESOLUTIONS.iter().copied().filter(|r| {
                        r.width >= step.min_width
                            && r.width <= step.max_width
                            && r.height >= step.min_height
                            && r.height <= step.max_height
                    }));
                }
            }
        }
    }

    Ok(resolutions)
}

