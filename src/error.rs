//! Error types for the actor controller

use core::fmt;

/// Controller fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// A transition named a state that is not registered
    UnknownState,
    /// The trigger clip is missing; the actor has nothing to perform
    MissingTriggerAudio,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::UnknownState => write!(f, "Unknown state"),
            ControllerError::MissingTriggerAudio => write!(f, "Required trigger audio not found"),
        }
    }
}

impl core::error::Error for ControllerError {}
