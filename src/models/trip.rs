use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Repository-assigned id; `0` until the trip has been persisted.
pub type TripId = i64;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

pub const DEFAULT_GUIDE: &str = "1";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Active,
    Completed,
    Ready,
    Skipped,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Active => "ACTIVE",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Ready => "READY",
            TripStatus::Skipped => "SKIPPED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TripStatus::Completed | TripStatus::Skipped | TripStatus::Cancelled
        )
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "ACTIVE" => Ok(TripStatus::Active),
            "COMPLETED" => Ok(TripStatus::Completed),
            "READY" => Ok(TripStatus::Ready),
            "SKIPPED" => Ok(TripStatus::Skipped),
            "CANCELLED" => Ok(TripStatus::Cancelled),
            other => Err(format!("unknown trip status {other:?}")),
        }
    }
}

/// One leg of a driving session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub start_km: i32,
    pub end_km: Option<i32>,
    pub start_place: String,
    pub end_place: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub is_return: bool,
    pub paired_trip_id: Option<TripId>,
    pub status: TripStatus,
    pub conditions: String,
    pub guide: String,
    pub date: NaiveDate,
}

impl Trip {
    /// A freshly started outward leg, not yet persisted.
    pub fn outward(
        start_km: i32,
        start_place: impl Into<String>,
        start_time: Timestamp,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: 0,
            start_km,
            end_km: None,
            start_place: start_place.into(),
            end_place: None,
            start_time,
            end_time: None,
            is_return: false,
            paired_trip_id: None,
            status: TripStatus::Active,
            conditions: String::new(),
            guide: DEFAULT_GUIDE.to_string(),
            date,
        }
    }

    pub fn distance_km(&self) -> i32 {
        match self.end_km {
            Some(end_km) if end_km >= self.start_km => end_km - self.start_km,
            _ => 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TripStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == TripStatus::Completed
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the end point (km, place and time) has been recorded.
    pub fn is_finished(&self) -> bool {
        self.end_km.is_some() && self.end_place.is_some() && self.end_time.is_some()
    }
}
