use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the capture session.
///
/// `Closed -> Opening -> Streaming <-> Recording`, back to `Closed` on stop,
/// open failure or disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Closed,
    Opening,
    Streaming,
    Recording,
}

impl SessionState {
    /// A device handle is held and delivering frames
    pub fn is_open(&self) -> bool {
        matches!(self, SessionState::Streaming | SessionState::Recording)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Closed => "closed",
            SessionState::Opening => "opening",
            SessionState::Streaming => "streaming",
            SessionState::Recording => "recording",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
    /// Last recording failed; a new one may be started
    Error,
}

impl RecorderState {
    /// A recording is in progress, paused or not
    pub fn is_active(&self) -> bool {
        matches!(self, RecorderState::Recording | RecorderState::Paused)
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecorderState::Idle => "idle",
            RecorderState::Recording => "recording",
            RecorderState::Paused => "paused",
            RecorderState::Error => "error",
        };
        f.write_str(s)
    }
}
