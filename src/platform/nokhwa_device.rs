use super::CameraDevice;
use crate::errors::CameraError;
use crate::types::{normalize_resolutions, CameraFrame, DeviceDescriptor, Resolution};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{
        ApiBackend, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
        Resolution as NokhwaResolution,
    },
    Camera,
};

/// Resolutions probed when the driver only reports a stepwise range
pub(crate) const COMMON_RESOLUTIONS: [Resolution; 6] = [
    Resolution::new(1920, 1080),
    Resolution::new(1280, 960),
    Resolution::new(1280, 720),
    Resolution::new(800, 600),
    Resolution::new(640, 480),
    Resolution::new(320, 240),
];

/// Camera opened through nokhwa, shared by every native backend
pub struct NokhwaDevice {
    camera: Camera,
    descriptor: DeviceDescriptor,
    presence: fn(&DeviceDescriptor) -> bool,
    resolutions: Vec<Resolution>,
}

impl NokhwaDevice {
    /// Open `descriptor` on `api`, asking for the closest MJPEG mode at `fps`.
    ///
    /// `presence` reports whether the hardware is still attached and turns
    /// read failures into disconnects. `probe`, when given, replaces nokhwa's
    /// own format listing. Formats are listed once, at open.
    pub fn open(
        api: ApiBackend,
        index: CameraIndex,
        descriptor: DeviceDescriptor,
        fps: u32,
        presence: fn(&DeviceDescriptor) -> bool,
        probe: Option<fn(&DeviceDescriptor) -> Result<Vec<Resolution>, CameraError>>,
    ) -> Result<Self, CameraError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            nokhwa::utils::CameraFormat::new(
                NokhwaResolution::new(1280, 720),
                FrameFormat::MJPEG,
                fps.max(1),
            ),
        ));

        let mut camera = Camera::with_backend(index, requested, api).map_err(|e| {
            CameraError::DeviceUnavailable(format!("Failed to open {}: {}", descriptor.id, e))
        })?;

        let listed = match probe {
            Some(probe) => probe(&descriptor),
            None => camera
                .compatible_camera_formats()
                .map(|formats| {
                    formats
                        .iter()
                        .map(|f| Resolution::new(f.resolution().width_x, f.resolution().height_y))
                        .collect()
                })
                .map_err(|e| CameraError::CaptureError(e.to_string())),
        };
        let current = camera.resolution();
        let resolutions = match listed {
            Ok(list) if !list.is_empty() => normalize_resolutions(list),
            Ok(_) | Err(_) => {
                log::debug!("{}: format listing unavailable, using common sizes", descriptor.id);
                let mut list = COMMON_RESOLUTIONS.to_vec();
                list.push(Resolution::new(current.width_x, current.height_y));
                normalize_resolutions(list)
            }
        };

        log::info!(
            "Opened {} ({}) at {}",
            descriptor.id,
            descriptor.name,
            camera.resolution()
        );

        Ok(Self {
            camera,
            descriptor,
            presence,
            resolutions,
        })
    }

    /// Map a nokhwa index from a descriptor id: numeric ids become indices
    pub fn index_for(id: &str) -> CameraIndex {
        let numeric = id
            .trim_start_matches("/dev/video")
            .parse::<u32>()
            .ok();
        match numeric {
            Some(n) => CameraIndex::Index(n),
            None => CameraIndex::String(id.to_string()),
        }
    }
}

impl CameraDevice for NokhwaDevice {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn supported_resolutions(&self) -> Result<Vec<Resolution>, CameraError> {
        Ok(self.resolutions.clone())
    }

    fn resolution(&self) -> Resolution {
        let res = self.camera.resolution();
        Resolution::new(res.width_x, res.height_y)
    }

    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        self.camera
            .set_resolution(NokhwaResolution::new(resolution.width, resolution.height))
            .map_err(|e| {
                CameraError::UnsupportedResolution(format!(
                    "{} rejected {}: {}",
                    self.descriptor.id, resolution, e
                ))
            })
    }

    fn start_stream(&mut self) -> Result<(), CameraError> {
        self.camera.open_stream().map_err(|e| {
            CameraError::DeviceUnavailable(format!("Failed to start stream: {}", e))
        })
    }

    fn stop_stream(&mut self) -> Result<(), CameraError> {
        if !self.camera.is_stream_open() {
            return Ok(());
        }
        self.camera
            .stop_stream()
            .map_err(|e| CameraError::StreamError(format!("Failed to stop stream: {}", e)))
    }

    fn is_streaming(&self) -> bool {
        self.camera.is_stream_open()
    }

    fn capture_frame(&mut self) -> Result<CameraFrame, CameraError> {
        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(e) if !(self.presence)(&self.descriptor) => {
                return Err(CameraError::DeviceDisconnected(format!(
                    "{}: {}",
                    self.descriptor.id, e
                )));
            }
            Err(e) => {
                return Err(CameraError::CaptureError(format!(
                    "Failed to capture frame: {}",
                    e
                )));
            }
        };

        let format_str = buffer.source_frame_format().to_string();
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureError(format!("Failed to decode frame: {}", e)))?;

        let (width, height) = (decoded.width(), decoded.height());
        Ok(
            CameraFrame::new(decoded.into_raw(), width, height, self.descriptor.id.clone())
                .with_format(format_str),
        )
    }
}

impl Drop for NokhwaDevice {
    fn drop(&mut self) {
        if self.camera.is_stream_open() {
            let _ = self.camera.stop_stream();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_for() {
        assert_eq!(NokhwaDevice::index_for("/dev/video3"), CameraIndex::Index(3));
        assert_eq!(NokhwaDevice::index_for("0"), CameraIndex::Index(0));
        assert_eq!(
            NokhwaDevice::index_for("FaceTime HD"),
            CameraIndex::String("FaceTime HD".to_string())
        );
    }
}
