use super::events::{DropOldestQueue, EventBus, SessionEvent};
use super::state::{RecorderState, SessionState};
use crate::config::{CameraConfig, ConfigStore};
use crate::errors::CameraError;
use crate::photo::save_photo;
use crate::platform::{CameraBackend, CameraDevice, DeviceEvent};
use crate::recording::{
    timestamped_path, RecordingConfig, RecordingStats, VideoWriter, WriterFactory,
};
use crate::registry::DeviceRegistry;
use crate::timing::RecordingClock;
use crate::types::{CameraFrame, DeviceDescriptor, Resolution};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// The live connection to one camera plus its recorder.
///
/// Single-threaded: the owner drives it from its event loop and calls
/// [`CaptureSession::process_frame`] once per tick.
pub struct CaptureSession {
    backend: Arc<dyn CameraBackend>,
    writers: Box<dyn WriterFactory>,
    store: ConfigStore,
    config: CameraConfig,
    registry: DeviceRegistry,
    device: Option<Box<dyn CameraDevice>>,
    state: SessionState,
    recorder_state: RecorderState,
    writer: Option<Box<dyn VideoWriter>>,
    clock: RecordingClock,
    events: EventBus,
    preview: Arc<DropOldestQueue<Arc<CameraFrame>>>,
    last_frame: Option<Arc<CameraFrame>>,
}

impl CaptureSession {
    /// Session with the configuration read from `store` and a fresh device list
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        writers: Box<dyn WriterFactory>,
        store: ConfigStore,
    ) -> Self {
        let config = store.parse_config();
        Self::with_config(backend, writers, store, config)
    }

    pub fn with_config(
        backend: Arc<dyn CameraBackend>,
        writers: Box<dyn WriterFactory>,
        store: ConfigStore,
        config: CameraConfig,
    ) -> Self {
        let mut registry = DeviceRegistry::with_last_known(config.last_device().map(String::from));
        registry.refresh_device_list(backend.as_ref());

        Self {
            backend,
            writers,
            store,
            config,
            registry,
            device: None,
            state: SessionState::Closed,
            recorder_state: RecorderState::Idle,
            writer: None,
            clock: RecordingClock::new(),
            events: EventBus::default(),
            preview: Arc::new(DropOldestQueue::new(1)),
            last_frame: None,
        }
    }

    /// Session on the platform camera stack and this build's video writer
    pub fn native(store: ConfigStore) -> Self {
        Self::new(
            Arc::from(crate::platform::native_backend()),
            crate::recording::native_writer_factory(),
            store,
        )
    }

    /// Receive every event published from now on
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    /// Re-enumerate cameras and announce the new list
    pub fn refresh_devices(&mut self) -> Vec<DeviceDescriptor> {
        let devices = self
            .registry
            .refresh_device_list(self.backend.as_ref())
            .to_vec();
        self.events
            .publish(SessionEvent::DeviceListChanged(devices.clone()));
        devices
    }

    /// Open the last used camera, or the first one available
    pub fn start(&mut self) -> Result<(), CameraError> {
        match self.registry.current_device().cloned() {
            Some(device) => self.start_camera(&device),
            None => {
                log::warn!("No camera attached");
                self.events.publish(SessionEvent::CameraUnusable);
                Err(CameraError::DeviceUnavailable(
                    "no camera attached".to_string(),
                ))
            }
        }
    }

    /// Open `device` and start streaming.
    ///
    /// No-op if `device` is already open. Any other open device is closed
    /// first. A failed open leaves the session closed and is not retried.
    pub fn start_camera(&mut self, device: &DeviceDescriptor) -> Result<(), CameraError> {
        if self.state.is_open() && self.current_device().is_some_and(|d| d.id == device.id) {
            log::debug!("{} already open", device.id);
            return Ok(());
        }

        self.stop_camera();
        self.state = SessionState::Opening;
        log::info!("Opening camera {} ({})", device.id, device.name);

        match self.open_device(device) {
            Ok(opened) => {
                log::info!("Camera {} streaming at {}", device.id, opened.resolution());
                self.device = Some(opened);
                self.state = SessionState::Streaming;
                self.registry.set_last_known(device.id.clone());
                self.config.remember_device(device);
                self.events
                    .publish(SessionEvent::CameraSwitched(device.id.clone()));
                Ok(())
            }
            Err(e) => {
                log::warn!("Camera {} unusable: {}", device.id, e);
                self.state = SessionState::Closed;
                self.events.publish(SessionEvent::CameraUnusable);
                Err(match e {
                    CameraError::DeviceUnavailable(_) => e,
                    other => CameraError::DeviceUnavailable(other.to_string()),
                })
            }
        }
    }

    fn open_device(
        &self,
        device: &DeviceDescriptor,
    ) -> Result<Box<dyn CameraDevice>, CameraError> {
        let fps = self.config.fps().round().max(1.0) as u32;
        let mut opened = self.backend.open(device, fps)?;

        let wanted = self.config.resolution();
        let supported = opened.supported_resolutions().unwrap_or_default();
        if supported.contains(&wanted) {
            if let Err(e) = opened.set_resolution(wanted) {
                log::warn!("{}: keeping default resolution: {}", device.id, e);
            }
        } else {
            log::info!(
                "{} does not support {}, using device default {}",
                device.id,
                wanted,
                opened.resolution()
            );
        }

        opened.start_stream()?;
        Ok(opened)
    }

    /// Stop streaming and release the device, finishing any recording first.
    ///
    /// The recorder is Idle afterwards even if finalizing the file failed.
    pub fn stop_camera(&mut self) {
        if self.recorder_state.is_active() {
            if let Err(e) = self.finish_recording() {
                log::error!("Failed to finalize recording on stop: {}", e);
            }
        }

        if let Some(mut device) = self.device.take() {
            if device.is_streaming() {
                if let Err(e) = device.stop_stream() {
                    log::warn!("Error stopping stream on {}: {}", device.descriptor().id, e);
                }
            }
            log::info!("Released camera {}", device.descriptor().id);
        }

        // A failed recording does not outlive its device either
        self.set_recorder_state(RecorderState::Idle);
        self.state = SessionState::Closed;
        self.last_frame = None;
        self.preview.clear();
    }

    /// Move to the next camera in enumeration order, wrapping.
    ///
    /// No-op with fewer than two cameras.
    pub fn switch_camera(&mut self) -> Result<(), CameraError> {
        if self.registry.len() < 2 {
            log::debug!("Switch ignored: {} camera(s)", self.registry.len());
            return Ok(());
        }

        let current = self
            .current_device()
            .or_else(|| self.registry.current_device())
            .map(|d| d.id.clone())
            .unwrap_or_default();

        let next = match self.registry.next_after(&current) {
            Some(next) => next.clone(),
            None => return Ok(()),
        };

        log::info!("Switching camera {} -> {}", current, next.id);
        self.start_camera(&next)
    }

    /// Close and reopen the current camera without changing selection
    pub fn restart_camera(&mut self) -> Result<(), CameraError> {
        let target = match self
            .current_device()
            .or_else(|| self.registry.current_device())
        {
            Some(device) => device.clone(),
            None => {
                self.events.publish(SessionEvent::CameraUnusable);
                return Err(CameraError::DeviceUnavailable(
                    "no camera to restart".to_string(),
                ));
            }
        };

        self.stop_camera();
        self.start_camera(&target)?;
        self.events.publish(SessionEvent::DeviceRestarted);
        Ok(())
    }

    /// Refresh the device list and reconcile the session with it.
    ///
    /// A vanished open device is handled as a disconnect; with nothing open,
    /// the preferred camera is started.
    pub fn refresh_camera(&mut self) -> Result<(), CameraError> {
        self.refresh_devices();

        let open_id = self.current_device().map(|d| d.id.clone());
        match open_id {
            Some(id) if !self.registry.contains(&id) => {
                self.handle_disconnect();
                Ok(())
            }
            Some(_) => Ok(()),
            None if self.registry.is_empty() => Ok(()),
            None => self.start(),
        }
    }

    /// React to a hot-plug event from the device monitor
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        log::debug!("Device event: {:?}", event);
        match event {
            DeviceEvent::Disconnected(id)
                if self.current_device().is_some_and(|d| d.id == *id) =>
            {
                self.handle_disconnect();
            }
            DeviceEvent::Disconnected(_) | DeviceEvent::Connected(_) => {
                self.refresh_devices();
            }
        }
    }

    fn handle_disconnect(&mut self) {
        let id = self
            .current_device()
            .map(|d| d.id.clone())
            .unwrap_or_default();
        log::warn!("Camera {} disconnected", id);

        self.stop_camera();
        self.events.publish(SessionEvent::DeviceDisconnected(id));
        self.refresh_devices();
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Sizes the open device supports, empty when closed
    pub fn supported_resolutions(&self) -> Vec<Resolution> {
        match &self.device {
            Some(device) => device.supported_resolutions().unwrap_or_else(|e| {
                log::warn!("Failed to list resolutions: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    /// Negotiated size when open, configured size otherwise
    pub fn resolution(&self) -> Resolution {
        match &self.device {
            Some(device) => device.resolution(),
            None => self.config.resolution(),
        }
    }

    /// Apply `resolution` if the open device supports it
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError> {
        if self.recorder_state.is_active() {
            return Err(CameraError::InvalidState(
                "cannot change resolution while recording".to_string(),
            ));
        }

        if !self.supported_resolutions().contains(&resolution) {
            log::warn!("Rejected unsupported resolution {}", resolution);
            return Err(CameraError::UnsupportedResolution(format!(
                "{} is not supported by the current camera",
                resolution
            )));
        }

        if let Some(device) = self.device.as_mut() {
            device.set_resolution(resolution)?;
        }
        self.config.set_resolution(resolution);
        self.preview.clear();
        self.last_frame = None;
        log::info!("Resolution set to {}", resolution);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Device open, streaming, and no recording in progress
    pub fn is_ready_to_record(&self) -> bool {
        self.state == SessionState::Streaming
            && self.device.is_some()
            && !self.recorder_state.is_active()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder_state.is_active()
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder_state
    }

    /// Start writing frames to a new timestamped file.
    ///
    /// Returns the output path, or `None` when the session is not ready.
    pub fn start_recording(&mut self) -> Result<Option<PathBuf>, CameraError> {
        if !self.is_ready_to_record() {
            log::debug!(
                "Start recording ignored in state {} / {}",
                self.state,
                self.recorder_state
            );
            return Ok(None);
        }

        let path = timestamped_path(
            &self.config.video_path,
            &self.config.video_name,
            self.writers.extension(),
            Local::now(),
        );
        let config = RecordingConfig::for_stream(self.resolution(), &self.config);

        match self.writers.create(&path, config) {
            Ok(writer) => {
                self.writer = Some(writer);
                self.clock.start();
                self.state = SessionState::Recording;
                self.set_recorder_state(RecorderState::Recording);
                log::info!("Recording to {:?}", path);
                Ok(Some(path))
            }
            Err(e) => {
                log::error!("Failed to start recording to {:?}: {}", path, e);
                self.set_recorder_state(RecorderState::Error);
                Err(e)
            }
        }
    }

    /// Finish the recording; `None` when nothing was recording
    pub fn stop_recording(&mut self) -> Result<Option<RecordingStats>, CameraError> {
        if !self.recorder_state.is_active() {
            return Ok(None);
        }
        self.finish_recording().map(Some)
    }

    /// Returns whether the recorder was paused
    pub fn pause_recording(&mut self) -> bool {
        if self.recorder_state != RecorderState::Recording {
            return false;
        }
        self.clock.pause();
        self.set_recorder_state(RecorderState::Paused);
        true
    }

    /// Returns whether the recorder resumed
    pub fn resume_recording(&mut self) -> bool {
        if self.recorder_state != RecorderState::Paused {
            return false;
        }
        self.clock.resume();
        self.set_recorder_state(RecorderState::Recording);
        true
    }

    /// Time spent recording, zero when idle
    pub fn recording_elapsed(&self) -> Duration {
        if self.recorder_state.is_active() {
            self.clock.elapsed()
        } else {
            Duration::ZERO
        }
    }

    fn finish_recording(&mut self) -> Result<RecordingStats, CameraError> {
        let writer = self.writer.take();
        self.clock.reset();
        if self.state == SessionState::Recording {
            self.state = SessionState::Streaming;
        }

        let result = match writer {
            Some(writer) => writer.finish(),
            None => Err(CameraError::InvalidState("no active writer".to_string())),
        };

        match &result {
            Ok(stats) => {
                log::info!(
                    "Recording saved to {:?} ({} frames)",
                    stats.output_path,
                    stats.video_frames
                );
                self.set_recorder_state(RecorderState::Idle);
                self.events
                    .publish(SessionEvent::RecordingSaved(stats.output_path.clone()));
            }
            Err(e) => {
                log::error!("Failed to finish recording: {}", e);
                self.set_recorder_state(RecorderState::Error);
            }
        }
        result
    }

    fn abort_recording(&mut self, cause: CameraError) {
        log::error!("Recording aborted: {}", cause);
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finish() {
                log::warn!("Could not finalize aborted recording: {}", e);
            }
        }
        self.clock.reset();
        self.state = SessionState::Streaming;
        self.set_recorder_state(RecorderState::Error);
    }

    fn set_recorder_state(&mut self, state: RecorderState) {
        if self.recorder_state != state {
            self.recorder_state = state;
            self.events
                .publish(SessionEvent::RecorderStateChanged(state));
        }
    }

    // ------------------------------------------------------------------
    // Frames and photos
    // ------------------------------------------------------------------

    /// Pull one frame from the device, record it and publish it for preview.
    ///
    /// Returns `false` when no device is open. A disconnect closes the session
    /// and is returned as `DeviceDisconnected`.
    pub fn process_frame(&mut self) -> Result<bool, CameraError> {
        let captured = match self.device.as_mut() {
            Some(device) => device.capture_frame(),
            None => return Ok(false),
        };

        let frame = match captured {
            Ok(frame) => Arc::new(frame),
            Err(e) if e.is_disconnect() => {
                self.handle_disconnect();
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if self.recorder_state == RecorderState::Recording {
            if let Some(writer) = self.writer.as_mut() {
                if let Err(e) = writer.write_frame(&frame) {
                    self.abort_recording(e);
                }
            }
        }

        self.last_frame = Some(frame.clone());
        self.preview.push_drop_oldest(frame);
        Ok(true)
    }

    /// Latest unconsumed preview frame; older ones were dropped
    pub fn take_preview_frame(&self) -> Option<Arc<CameraFrame>> {
        self.preview.try_pop()
    }

    /// Shared handle for a consumer on another thread
    pub fn preview_queue(&self) -> Arc<DropOldestQueue<Arc<CameraFrame>>> {
        self.preview.clone()
    }

    pub fn dropped_preview_frames(&self) -> u64 {
        self.preview.dropped()
    }

    /// Save the latest frame as a JPEG in the photo directory
    pub fn take_photo(&mut self) -> Result<PathBuf, CameraError> {
        if !self.state.is_open() {
            return Err(CameraError::InvalidState(
                "no camera is streaming".to_string(),
            ));
        }

        if self.last_frame.is_none() {
            self.process_frame()?;
        }
        let frame = self
            .last_frame
            .clone()
            .ok_or_else(|| CameraError::CaptureError("no frame available".to_string()))?;

        let path = save_photo(&frame, &self.config.photo_path, &self.config.photo_name)?;
        self.events.publish(SessionEvent::PhotoSaved(path.clone()));
        Ok(path)
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Takes effect with the next recording
    pub fn set_video_output_path(&mut self, path: impl Into<PathBuf>) {
        self.config.video_path = path.into();
    }

    pub fn set_photo_output_path(&mut self, path: impl Into<PathBuf>) {
        self.config.photo_path = path.into();
    }

    /// Persist the in-memory configuration.
    ///
    /// A failure is logged and returned; the in-memory copy stays in use.
    pub fn save_config(&self) -> Result<(), CameraError> {
        self.store.save_config(&self.config).inspect_err(|e| {
            log::error!("{}", e);
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Descriptor of the open device
    pub fn current_device(&self) -> Option<&DeviceDescriptor> {
        self.device.as_ref().map(|d| d.descriptor())
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn backend(&self) -> Arc<dyn CameraBackend> {
        self.backend.clone()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop_camera();
    }
}
