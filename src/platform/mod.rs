//! Device abstraction
//!
//! The capture session only sees [`CameraBackend`] and [`CameraDevice`].
//! Each target platform provides one native implementation; the synthetic
//! backend in [`crate::testing`] implements the same traits.

use crate::errors::CameraError;
use crate::types::{CameraFrame, DeviceDescriptor, Resolution};

pub mod device_monitor;
mod nokhwa_device;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "windows")]
pub mod windows;

pub use device_monitor::{DeviceEvent, DeviceMonitor};
pub use nokhwa_device::NokhwaDevice;

/// Source of camera devices on the host
pub trait CameraBackend: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Currently attached capture devices, in enumeration order
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, CameraError>;

    /// Open a device without starting the stream
    fn open(
        &self,
        device: &DeviceDescriptor,
        fps: u32,
    ) -> Result<Box<dyn CameraDevice>, CameraError>;
}

/// One opened camera
pub trait CameraDevice {
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Frame sizes the device can deliver
    fn supported_resolutions(&self) -> Result<Vec<Resolution>, CameraError>;

    /// Frame size currently negotiated with the device
    fn resolution(&self) -> Resolution;

    /// Renegotiate the frame size; the stream may be restarted internally
    fn set_resolution(&mut self, resolution: Resolution) -> Result<(), CameraError>;

    fn start_stream(&mut self) -> Result<(), CameraError>;

    fn stop_stream(&mut self) -> Result<(), CameraError>;

    fn is_streaming(&self) -> bool;

    /// Block until the next frame; `DeviceDisconnected` once the hardware is gone
    fn capture_frame(&mut self) -> Result<CameraFrame, CameraError>;
}

/// Native backend for the current platform
#[cfg(target_os = "linux")]
pub fn native_backend() -> Box<dyn CameraBackend> {
    Box::new(linux::LinuxBackend::new())
}

#[cfg(target_os = "macos")]
pub fn native_backend() -> Box<dyn CameraBackend> {
    Box::new(macos::MacOSBackend::new())
}

#[cfg(target_os = "windows")]
pub fn native_backend() -> Box<dyn CameraBackend> {
    Box::new(windows::WindowsBackend::new())
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn native_backend() -> Box<dyn CameraBackend> {
    log::warn!("No native camera backend for this platform");
    Box::new(crate::testing::SyntheticBackend::with_devices(&[]))
}
