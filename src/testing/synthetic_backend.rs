//! Hardware-free backend and writer

use super::synthetic_data::synthetic_frame_for;
use crate::errors::CameraError;
use crate::platform::{CameraBackend, CameraDevice};
use crate::recording::{RecordingConfig, RecordingStats, VideoWriter, WriterFactory};
use crate::types::{normalize_resolutions, CameraFrame, DeviceDescriptor, Resolution};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Sizes every synthetic camera supports unless overridden
pub const SYNTHETIC_RESOLUTIONS: [Resolution; 3] = [
    Resolution::new(1920, 1080),
    Resolution::new(1280, 720),
    Resolution::new(640, 480),
];

#[derive(Debug, Clone)]
struct SyntheticCamera {
    descriptor: DeviceDescriptor,
    resolutions: Vec<Resolution>,
    busy: bool,
}

#[derive(Debug, Default)]
struct BackendState {
    cameras: Vec<SyntheticCamera>,
    fail_enumeration: bool,
    open_count: u32,
}

/// Camera backend backed by shared in-memory state.
///
/// Clones share state, so a test can keep one handle while the session owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct SyntheticBackend {
    state: Arc<Mutex<BackendState>>,
}

impl SyntheticBackend {
    pub fn with_devices(ids: &[&str]) -> Self {
        let backend = Self::default();
        for (i, id) in ids.iter().enumerate() {
            backend.plug(id, &format!("Synthetic Camera {}", i));
        }
        backend
    }

    /// Attach a camera at the end of the enumeration order
    pub fn plug(&self, id: &str, name: &str) {
        let mut state = self.state.lock().expect("lock poisoned");
        let location = format!("synthetic-{}", state.cameras.len());
        state.cameras.push(SyntheticCamera {
            descriptor: DeviceDescriptor::new(id, name).with_location(location),
            resolutions: SYNTHETIC_RESOLUTIONS.to_vec(),
            busy: false,
        });
    }

    pub fn unplug(&self, id: &str) {
        let mut state = self.state.lock().expect("lock poisoned");
        state.cameras.retain(|c| c.descriptor.id != id);
    }

    /// A busy camera refuses to open
    pub fn set_busy(&self, id: &str, busy: bool) {
        let mut state = self.state.lock().expect("lock poisoned");
        if let Some(camera) = state.cameras.iter_mut().find(|c| c.descriptor.id == id) {
            camera.busy = busy;
        }
    }

    pub fn set_resolutions(&self, id: &str, resolutions: Vec<Resolution>) {
        let mut state = self.state.lock().expect("lock poisoned");
        if let Some(camera) = state.cameras.iter_mut().find(|c| c.descriptor.id == id) {
            camera.resolutions = resolutions;
        }
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.state.lock().expect("lock poisoned").fail_enumeration = fail;
    }

    /// Number of successful opens so far
    pub fn open_count(&self) -> u32 {
        self.state.lock().expect("lock poisoned").open_count
    }

    fn is_attached(&self, id: &str) -> bool {
        let state = self.state.lock().expect("lock poisoned");
        state.cameras.iter().any(|c| c.descriptor.id == id)
    }
}

impl CameraBackend for SyntheticBackend {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, CameraError> {
        let state = self.state.lock().expect("lock poisoned");
        if state.fail_enumeration {
            return Err(CameraError::DeviceUnavailable(
                "synthetic enumeration failure".to_string(),
            ));
        }
        Ok(state.cameras.iter().map(|c| c.descriptor.clone()).collect())
    }

    fn open(
        &self,
        device: &DeviceDescriptor,
        _fps: u32,
    ) -> Result<Box<dyn CameraDevice>, CameraError> {
        let mut state = self.state.lock().expect("lock poisoned");
        let camera = state
            .cameras
            .iter()
            .find(|c| c.descriptor.id == device.id)
            .cloned()
            .ok_or_else(|| {
                CameraError::DeviceUnavailable(format!("{} is not attached", device.id))
            })?;

        if camera.busy {
            return Err(CameraError::DeviceUnavailable(format!(
                "{} is in use by another application",
                device.id
            )));
        }

        state.open_count += 1;
        let resolutions = normalize_resolutions(camera.resolutions);
        // Smallest size is the power-on default
        let resolution = resolutions
            .last()
            .copied()
            .unwrap_or(Resolution::new(640, 480));

        Ok(Box::new(SyntheticDevice {
            backend: self.clone(),
            descriptor: camera.descriptor,
            resolutions,
            resolution,
            streaming: false,
            frame_number: 0,
        }))
    }
}

struct SyntheticDevice {
    backend: SyntheticBackend,
    descriptor: DeviceDescriptor,
    resolutions: Vec<Resolution>,
    resolution: Resolution,
    streaming: bool,
    frame_number: u64,
}

impl CameraDevice for SyntheticDevice {
    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    fn supported_resolutions(&self) -> Result<Vec<Resolution>, CameraError> {
        Ok(self.resolutions.clone())
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        if !self.resolutions.contains(&resolution) {
            return Err(CameraError::UnsupportedResolution(resolution.to_string()));
        }
        self.resolution = resolution;
        Ok(())
    }

    fn start_stream(&mut self) -> Result<(), CameraError> {
        if !self.backend.is_attached(&self.descriptor.id) {
            return Err(CameraError::DeviceUnavailable(format!(
                "{} is not attached",
                self.descriptor.id
            )));
        }
        self.streaming = true;
        Ok(())
    }

    fn stop_stream(&mut self) -> Result<(), CameraError> {
        self.streaming = false;
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn capture_frame(&mut self) -> Result<CameraFrame, CameraError> {
        if !self.backend.is_attached(&self.descriptor.id) {
            return Err(CameraError::DeviceDisconnected(self.descriptor.id.clone()));
        }
        if !self.streaming {
            return Err(CameraError::StreamError("stream not started".to_string()));
        }

        let frame = synthetic_frame_for(
            &self.descriptor.id,
            self.frame_number,
            self.resolution.width,
            self.resolution.height,
        );
        self.frame_number += 1;
        Ok(frame)
    }
}

/// What a [`MemoryWriterFactory`] writer saw
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFile {
    pub path: PathBuf,
    pub resolution: Resolution,
    pub frames: u64,
    pub finished: bool,
}

#[derive(Debug, Default)]
struct WriterLog {
    files: Vec<RecordedFile>,
    fail_after: Option<u64>,
}

/// Writer factory that touches the output file and counts frames in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryWriterFactory {
    log: Arc<Mutex<WriterLog>>,
}

impl MemoryWriterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writers fail once they hold `frames` frames
    pub fn fail_after(&self, frames: u64) {
        self.log.lock().expect("lock poisoned").fail_after = Some(frames);
    }

    pub fn files(&self) -> Vec<RecordedFile> {
        self.log.lock().expect("lock poisoned").files.clone()
    }
}

impl WriterFactory for MemoryWriterFactory {
    fn extension(&self) -> &str {
        "mp4"
    }

    fn create(
        &self,
        path: &Path,
        config: RecordingConfig,
    ) -> Result<Box<dyn VideoWriter>, CameraError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"")?;

        let mut log = self.log.lock().expect("lock poisoned");
        log.files.push(RecordedFile {
            path: path.to_path_buf(),
            resolution: Resolution::new(config.width, config.height),
            frames: 0,
            finished: false,
        });
        let index = log.files.len() - 1;

        Ok(Box::new(MemoryWriter {
            log: self.log.clone(),
            index,
        }))
    }
}

struct MemoryWriter {
    log: Arc<Mutex<WriterLog>>,
    index: usize,
}

impl VideoWriter for MemoryWriter {
    fn write_frame(&mut self, frame: &CameraFrame) -> Result<(), CameraError> {
        let mut log = self.log.lock().expect("lock poisoned");
        let limit = log.fail_after;
        let file = &mut log.files[self.index];
        if limit.is_some_and(|n| file.frames >= n) {
            return Err(CameraError::IoError("synthetic writer failure".to_string()));
        }
        if frame.resolution() != file.resolution {
            return Err(CameraError::IoError(format!(
                "frame {} does not match recording {}",
                frame.resolution(),
                file.resolution
            )));
        }
        file.frames += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RecordingStats, CameraError> {
        let mut log = self.log.lock().expect("lock poisoned");
        let file = &mut log.files[self.index];
        file.finished = true;
        Ok(RecordingStats {
            video_frames: file.frames,
            duration_secs: 0.0,
            bytes_written: 0,
            dropped_frames: 0,
            output_path: file.path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_device_refuses_open() {
        let backend = SyntheticBackend::with_devices(&["/dev/video0"]);
        let dev = backend.enumerate().unwrap().remove(0);
        backend.set_busy("/dev/video0", true);
        assert!(matches!(
            backend.open(&dev, 30),
            Err(CameraError::DeviceUnavailable(_))
        ));
        assert_eq!(backend.open_count(), 0);
    }

    #[test]
    fn test_unplugged_device_disconnects() {
        let backend = SyntheticBackend::with_devices(&["/dev/video0"]);
        let dev = backend.enumerate().unwrap().remove(0);
        let mut camera = backend.open(&dev, 30).unwrap();
        camera.start_stream().unwrap();
        assert!(camera.capture_frame().is_ok());

        backend.unplug("/dev/video0");
        let err = camera.capture_frame().unwrap_err();
        assert!(err.is_disconnect());
    }

    #[test]
    fn test_default_resolution_is_smallest() {
        let backend = SyntheticBackend::with_devices(&["/dev/video0"]);
        let dev = backend.enumerate().unwrap().remove(0);
        let camera = backend.open(&dev, 30).unwrap();
        assert_eq!(camera.resolution(), Resolution::new(640, 480));
    }
}
