use std::fmt;

use serde::Serialize;

/// Where the user stands in the current session. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrivingState {
    Idle,
    OutwardActive,
    Arrived,
    ReturnReady,
    ReturnActive,
    Completed,
}

impl DrivingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrivingState::Idle => "IDLE",
            DrivingState::OutwardActive => "OUTWARD_ACTIVE",
            DrivingState::Arrived => "ARRIVED",
            DrivingState::ReturnReady => "RETURN_READY",
            DrivingState::ReturnActive => "RETURN_ACTIVE",
            DrivingState::Completed => "COMPLETED",
        }
    }

    /// A leg is currently being driven.
    pub fn is_driving(&self) -> bool {
        matches!(self, DrivingState::OutwardActive | DrivingState::ReturnActive)
    }
}

impl fmt::Display for DrivingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
