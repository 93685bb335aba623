//! Recording-device contract consumed by the session.
//!
//! # Responsibility
//! - Abstract audio capture start/stop behind a trait the session drives.
//!
//! # Invariants
//! - Device-access denial is a reportable error, never a panic.
//! - A successful stop yields exactly one assembled resource reference.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Assembled result of one finished capture.
///
/// The url references a locally-produced audio resource; its lifetime and
/// validity belong to the recording subsystem, not this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCapture {
    pub url: String,
}

/// Failure from the recording device.
#[derive(Debug, PartialEq, Eq)]
pub enum RecorderError {
    /// The user or platform refused microphone access.
    DeviceDenied,
    /// Capture started but could not be assembled.
    CaptureFailed(String),
}

impl Display for RecorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceDenied => write!(f, "microphone access denied"),
            Self::CaptureFailed(message) => write!(f, "audio capture failed: {message}"),
        }
    }
}

impl Error for RecorderError {}

/// Audio input device driven by [`crate::session::Session`].
///
/// `start` requests the input stream; the device accumulates chunks until
/// `stop`, which returns the single assembled capture.
pub trait AudioRecorder {
    fn start(&mut self) -> Result<(), RecorderError>;
    fn stop(&mut self) -> Result<AudioCapture, RecorderError>;
}
