use crate::models::{
    driving_state::DrivingState,
    trip::{Trip, TripStatus},
};

/// Maps a full snapshot of trips, in any order, to the current driving state.
///
/// Rules are checked in priority order and the first match wins:
/// an open return leg, an open outward leg, a prepared return, the latest
/// finished outward leg still waiting for a return decision. Anything left is
/// `Idle` when every trip is terminal, `Completed` otherwise.
pub fn derive_driving_state(trips: &[Trip]) -> DrivingState {
    if trips.iter().any(|t| t.is_return && t.end_km.is_none()) {
        return DrivingState::ReturnActive;
    }
    if trips.iter().any(|t| !t.is_return && t.end_km.is_none()) {
        return DrivingState::OutwardActive;
    }
    if trips
        .iter()
        .any(|t| t.is_return && t.status == TripStatus::Ready)
    {
        return DrivingState::ReturnReady;
    }

    let latest_completed_outward = trips
        .iter()
        .filter(|t| !t.is_return && t.status == TripStatus::Completed)
        .max_by_key(|t| t.id);
    if let Some(outward) = latest_completed_outward {
        let has_return = trips
            .iter()
            .any(|t| t.is_return && t.paired_trip_id == Some(outward.id));
        if !has_return {
            return DrivingState::Arrived;
        }
    }

    if trips.iter().all(Trip::is_terminal) {
        DrivingState::Idle
    } else {
        DrivingState::Completed
    }
}
