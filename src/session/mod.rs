//! Capture session
//!
//! Owns the open camera, the recorder and the preview slot, and reports
//! everything that happens to it as [`SessionEvent`]s.

pub mod capture;
pub mod events;
pub mod state;

pub use capture::CaptureSession;
pub use events::{DropOldestQueue, SessionEvent};
pub use state::{RecorderState, SessionState};
