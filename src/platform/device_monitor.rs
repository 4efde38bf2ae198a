//! Device monitoring and hot-plug detection
//!
//! Polls a [`CameraBackend`] and reports camera connect/disconnect events.
//! The monitor never touches the capture session; the host forwards events
//! to [`crate::session::CaptureSession::handle_device_event`].

use super::CameraBackend;
use crate::errors::CameraError;
use crate::types::DeviceDescriptor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

/// Default interval between two enumerations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Device event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Connected(String),    // Device ID
    Disconnected(String), // Device ID
}

impl DeviceEvent {
    pub fn device_id(&self) -> &str {
        match self {
            DeviceEvent::Connected(id) | DeviceEvent::Disconnected(id) => id,
        }
    }
}

/// Device monitor for detecting camera changes
pub struct DeviceMonitor {
    backend: Arc<dyn CameraBackend>,
    poll_interval: Duration,
    active_devices: Arc<RwLock<Vec<DeviceDescriptor>>>,
    event_sender: mpsc::UnboundedSender<DeviceEvent>,
    event_receiver: Arc<RwLock<mpsc::UnboundedReceiver<DeviceEvent>>>,
    is_monitoring: Arc<RwLock<bool>>,
}

impl DeviceMonitor {
    /// Create a new device monitor
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            backend,
            poll_interval: DEFAULT_POLL_INTERVAL,
            active_devices: Arc::new(RwLock::new(Vec::new())),
            event_sender: tx,
            event_receiver: Arc::new(RwLock::new(rx)),
            is_monitoring: Arc::new(RwLock::new(false)),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Start monitoring for device changes
    pub async fn start_monitoring(&self) -> Result<(), CameraError> {
        let mut is_monitoring = self.is_monitoring.write().await;
        if *is_monitoring {
            return Ok(());
        }

        log::info!(
            "Starting device monitoring on {} backend via polling",
            self.backend.name()
        );

        // Initial scan seeds the list without emitting events
        let initial_devices = self.backend.enumerate()?;
        *self.active_devices.write().await = initial_devices;

        let backend = self.backend.clone();
        let active_devices = self.active_devices.clone();
        let event_sender = self.event_sender.clone();
        let is_monitoring_flag = self.is_monitoring.clone();
        let interval = self.poll_interval;

        *is_monitoring = true;
        drop(is_monitoring);

        tokio::spawn(async move {
            while *is_monitoring_flag.read().await {
                tokio::time::sleep(interval).await;

                match backend.enumerate() {
                    Ok(devices) => {
                        let mut active = active_devices.write().await;
                        for event in diff_devices(&active, &devices) {
                            log::info!("Device event: {:?}", event);
                            let _ = event_sender.send(event);
                        }
                        *active = devices;
                    }
                    Err(e) => log::debug!("Device poll failed: {}", e),
                }
            }
            log::debug!("Device monitoring task exited");
        });

        Ok(())
    }

    /// Stop monitoring for device changes
    pub async fn stop_monitoring(&self) -> Result<(), CameraError> {
        let mut is_monitoring = self.is_monitoring.write().await;
        if !*is_monitoring {
            return Ok(());
        }

        log::info!("Stopping device monitoring");
        *is_monitoring = false;
        Ok(())
    }

    pub async fn is_monitoring(&self) -> bool {
        *self.is_monitoring.read().await
    }

    /// Get next device event (non-blocking)
    pub async fn poll_event(&self) -> Option<DeviceEvent> {
        let mut rx = self.event_receiver.write().await;
        rx.try_recv().ok()
    }

    /// Wait for next device event
    pub async fn wait_for_event(&self) -> Option<DeviceEvent> {
        let mut rx = self.event_receiver.write().await;
        rx.recv().await
    }

    /// Get list of currently active devices
    pub async fn get_active_devices(&self) -> Vec<DeviceDescriptor> {
        self.active_devices.read().await.clone()
    }
}

/// Events turning `old` into `new`: disconnections first, then connections
pub fn diff_devices(old: &[DeviceDescriptor], new: &[DeviceDescriptor]) -> Vec<DeviceEvent> {
    let mut events = Vec::new();

    for device in old {
        if !new.iter().any(|d| d.id == device.id) {
            events.push(DeviceEvent::Disconnected(device.id.clone()));
        }
    }

    for device in new {
        if !old.iter().any(|d| d.id == device.id) {
            events.push(DeviceEvent::Connected(device.id.clone()));
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SyntheticBackend;

    #[tokio::test]
    async fn test_device_monitor_creation() {
        let monitor = DeviceMonitor::new(Arc::new(SyntheticBackend::with_devices(&[])));
        assert!(!monitor.is_monitoring().await);
        assert!(monitor.poll_event().await.is_none());
    }

    #[tokio::test]
    async fn test_start_stop_monitoring() {
        let backend = SyntheticBackend::with_devices(&["/dev/video0"]);
        let monitor = DeviceMonitor::new(Arc::new(backend));

        monitor.start_monitoring().await.unwrap();
        assert!(monitor.is_monitoring().await);
        assert_eq!(monitor.get_active_devices().await.len(), 1);

        // Second start is a no-op
        monitor.start_monitoring().await.unwrap();

        monitor.stop_monitoring().await.unwrap();
        assert!(!monitor.is_monitoring().await);
    }

    #[tokio::test]
    async fn test_hotplug_events() {
        let backend = SyntheticBackend::with_devices(&["/dev/video0"]);
        let monitor = DeviceMonitor::new(Arc::new(backend.clone()))
            .with_poll_interval(Duration::from_millis(10));
        monitor.start_monitoring().await.unwrap();

        backend.plug("/dev/video1", "USB Camera");
        let event = tokio::time::timeout(Duration::from_secs(2), monitor.wait_for_event())
            .await
            .unwrap();
        assert_eq!(event, Some(DeviceEvent::Connected("/dev/video1".to_string())));

        backend.unplug("/dev/video0");
        let event = tokio::time::timeout(Duration::from_secs(2), monitor.wait_for_event())
            .await
            .unwrap();
        assert_eq!(event, Some(DeviceEvent::Disconnected("/dev/video0".to_string())));

        monitor.stop_monitoring().await.unwrap();
    }

    #[test]
    fn test_diff_devices() {
        let a = DeviceDescriptor::new("/dev/video0", "A");
        let b = DeviceDescriptor::new("/dev/video1", "B");
        let c = DeviceDescriptor::new("/dev/video2", "C");

        let events = diff_devices(&[a.clone(), b.clone()], &[b, c]);
        assert_eq!(
            events,
            vec![
                DeviceEvent::Disconnected("/dev/video0".to_string()),
                DeviceEvent::Connected("/dev/video2".to_string()),
            ]
        );
        assert!(diff_devices(&[a.clone()], &[a]).is_empty());
    }
}
