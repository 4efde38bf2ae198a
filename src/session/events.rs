use super::state::RecorderState;
use crate::types::DeviceDescriptor;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DeviceListChanged(Vec<DeviceDescriptor>),
    /// The open device went away; the session is closed
    DeviceDisconnected(String),
    CameraSwitched(String),
    /// Opening a device failed (busy, denied, removed) or none exists
    CameraUnusable,
    DeviceRestarted,
    RecorderStateChanged(RecorderState),
    PhotoSaved(PathBuf),
    RecordingSaved(PathBuf),
}

/// Fan-out of [`SessionEvent`]s to every live subscriber
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn publish(&mut self, event: SessionEvent) {
        log::debug!("Session event: {:?}", event);
        // Dropped receivers unsubscribe
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Bounded queue that discards the oldest item when full
pub struct DropOldestQueue<T> {
    inner: Mutex<QueueInner<T>>,
    cv: Condvar,
}

struct QueueInner<T> {
    items: VecDeque<T>,
    capacity: usize,
    dropped: u64,
}

impl<T> DropOldestQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::with_capacity(capacity.clamp(1, 1024)),
                capacity: capacity.max(1),
                dropped: 0,
            }),
            cv: Condvar::new(),
        }
    }

    pub fn push_drop_oldest(&self, item: T) {
        let mut g = self.inner.lock().expect("lock poisoned");
        if g.items.len() >= g.capacity {
            g.items.pop_front();
            g.dropped = g.dropped.saturating_add(1);
        }
        g.items.push_back(item);
        self.cv.notify_one();
    }

    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().expect("lock poisoned").items.pop_front()
    }

    /// Wait up to `timeout` for an item
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let mut g = self.inner.lock().expect("lock poisoned");
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = g.items.pop_front() {
                return Some(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (ng, _) = self
                .cv
                .wait_timeout(g, deadline - now)
                .expect("lock poisoned");
            g = ng;
        }
    }

    pub fn clear(&self) {
        self.inner.lock().expect("lock poisoned").items.clear();
    }

    pub fn dropped(&self) -> u64 {
        self.inner.lock().expect("lock poisoned").dropped
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("lock poisoned").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drops_oldest() {
        let q = DropOldestQueue::new(1);
        q.push_drop_oldest(1);
        q.push_drop_oldest(2);
        assert_eq!(q.dropped(), 1);
        assert_eq!(q.try_pop(), Some(2));
        assert!(q.is_empty());
    }

    #[test]
    fn test_pop_timeout_empty() {
        let q: DropOldestQueue<u8> = DropOldestQueue::new(2);
        assert_eq!(q.pop_timeout(Duration::from_millis(5)), None);
    }

    #[test]
    fn test_bus_fans_out_and_prunes() {
        let mut bus = EventBus::default();
        let mut a = bus.subscribe();
        let b = bus.subscribe();
        drop(b);

        bus.publish(SessionEvent::CameraUnusable);
        assert_eq!(a.try_recv().unwrap(), SessionEvent::CameraUnusable);
        assert_eq!(bus.subscribers.len(), 1);
    }
}
