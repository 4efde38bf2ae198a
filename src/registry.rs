//! Device registry
//!
//! Holds the ordered list of cameras reported by the backend. The list is
//! rebuilt wholesale on every refresh; there is no incremental diffing here
//! (hot-plug diffing lives in the device monitor).

use crate::platform::CameraBackend;
use crate::types::DeviceDescriptor;

#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    devices: Vec<DeviceDescriptor>,
    last_known: Option<String>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preferring `last_known` when picking the current device
    pub fn with_last_known(last_known: Option<String>) -> Self {
        Self {
            devices: Vec::new(),
            last_known,
        }
    }

    /// Re-query the backend and replace the device list.
    ///
    /// An enumeration failure is treated like "no camera attached".
    pub fn refresh_device_list(&mut self, backend: &dyn CameraBackend) -> &[DeviceDescriptor] {
        let devices = match backend.enumerate() {
            Ok(devices) => devices,
            Err(e) => {
                log::warn!("Camera enumeration failed, treating as no devices: {}", e);
                Vec::new()
            }
        };

        log::debug!("Device list refreshed: {} camera(s)", devices.len());
        self.devices = devices;
        &self.devices
    }

    /// Descriptor for the last known device, else the first one
    pub fn current_device(&self) -> Option<&DeviceDescriptor> {
        self.last_known
            .as_deref()
            .and_then(|key| self.find(key))
            .or_else(|| self.devices.first())
    }

    pub fn set_last_known(&mut self, key: impl Into<String>) {
        self.last_known = Some(key.into());
    }

    pub fn last_known(&self) -> Option<&str> {
        self.last_known.as_deref()
    }

    pub fn find(&self, key: &str) -> Option<&DeviceDescriptor> {
        self.devices.iter().find(|d| d.matches(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Device following `id` in enumeration order, wrapping around.
    ///
    /// An unknown `id` yields the first device.
    pub fn next_after(&self, id: &str) -> Option<&DeviceDescriptor> {
        if self.devices.is_empty() {
            return None;
        }
        let next = match self.devices.iter().position(|d| d.matches(id)) {
            Some(pos) => (pos + 1) % self.devices.len(),
            None => 0,
        };
        self.devices.get(next)
    }

    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SyntheticBackend;

    fn two_cam_registry() -> DeviceRegistry {
        let backend = SyntheticBackend::with_devices(&["/dev/video0", "/dev/video1"]);
        let mut registry = DeviceRegistry::new();
        registry.refresh_device_list(&backend);
        registry
    }

    #[test]
    fn test_empty_registry() {
        let backend = SyntheticBackend::with_devices(&[]);
        let mut registry = DeviceRegistry::new();
        assert!(registry.refresh_device_list(&backend).is_empty());
        assert!(registry.current_device().is_none());
        assert!(registry.next_after("/dev/video0").is_none());
    }

    #[test]
    fn test_current_device_falls_back_to_first() {
        let mut registry = two_cam_registry();
        assert_eq!(registry.current_device().unwrap().id, "/dev/video0");

        registry.set_last_known("/dev/video1");
        assert_eq!(registry.current_device().unwrap().id, "/dev/video1");

        registry.set_last_known("/dev/video9");
        assert_eq!(registry.current_device().unwrap().id, "/dev/video0");
    }

    #[test]
    fn test_next_after_wraps() {
        let registry = two_cam_registry();
        assert_eq!(registry.next_after("/dev/video0").unwrap().id, "/dev/video1");
        assert_eq!(registry.next_after("/dev/video1").unwrap().id, "/dev/video0");
        assert_eq!(registry.next_after("missing").unwrap().id, "/dev/video0");
    }

    #[test]
    fn test_refresh_replaces_list() {
        let backend = SyntheticBackend::with_devices(&["/dev/video0", "/dev/video1"]);
        let mut registry = DeviceRegistry::new();
        registry.refresh_device_list(&backend);
        backend.unplug("/dev/video0");
        let devices = registry.refresh_device_list(&backend);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "/dev/video1");
    }

    #[test]
    fn test_enumeration_failure_is_empty() {
        let backend = SyntheticBackend::with_devices(&["/dev/video0"]);
        backend.fail_enumeration(true);
        let mut registry = DeviceRegistry::new();
        assert!(registry.refresh_device_list(&backend).is_empty());
    }
}
