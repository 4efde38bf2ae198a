//! Testing utilities for boothcam
//!
//! A synthetic camera backend and an in-memory video writer that let the
//! capture session run without hardware. Tests can plug and unplug devices,
//! mark them busy, and inspect what was recorded.

pub mod synthetic_backend;
pub mod synthetic_data;

pub use synthetic_backend::{MemoryWriterFactory, RecordedFile, SyntheticBackend};
pub use synthetic_data::{synthetic_frame_for, synthetic_video_frame};
