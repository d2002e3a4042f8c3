use serde::Serialize;

use super::trip::{Trip, TripStatus};

/// One numbered seance: an outward leg and its return, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripGroup {
    pub outward: Trip,
    pub return_trip: Option<Trip>,
    pub seance_number: u32,
}

impl TripGroup {
    pub fn total_kms(&self) -> i32 {
        self.outward.distance_km() + self.return_trip.as_ref().map_or(0, Trip::distance_km)
    }

    /// A skipped placeholder means the user chose "no return".
    pub fn has_return(&self) -> bool {
        self.return_trip
            .as_ref()
            .is_some_and(|trip| trip.status != TripStatus::Skipped)
    }

    pub fn is_complete(&self) -> bool {
        self.outward.status == TripStatus::Completed
            && self.return_trip.as_ref().map_or(true, |trip| {
                matches!(trip.status, TripStatus::Completed | TripStatus::Skipped)
            })
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        std::iter::once(&self.outward).chain(self.return_trip.as_ref())
    }
}
