use tracing::{info, warn};

use crate::{
    domain::derive_driving_state,
    error::{Outcome, UseCaseError},
    models::{
        driving_state::DrivingState,
        trip::{Trip, TripId, TripStatus},
    },
    state::Logbook,
};

use super::{check, check_trip_end};

#[derive(Debug, Clone)]
pub struct StartOutward {
    pub start_km: i32,
    pub start_place: String,
    pub conditions: String,
    pub guide: String,
}

/// Opens a new outward leg and points the ongoing session at it.
pub async fn start_outward(logbook: &Logbook, input: StartOutward) -> Outcome<TripId> {
    check(logbook.validator.validate_outward_start(
        input.start_km,
        &input.start_place,
        &input.conditions,
        &input.guide,
    ))?;

    let trips = logbook.trips.list_all().await?;
    let state = derive_driving_state(&trips);
    if state.is_driving() || state == DrivingState::ReturnReady {
        warn!("refusing to start an outward trip while in state {state}");
        return Err(UseCaseError::ValidationFailed(format!(
            "A session is already in progress ({state})"
        )));
    }

    let mut trip = Trip::outward(
        input.start_km,
        input.start_place.trim(),
        logbook.clock.now_millis(),
        logbook.clock.today(),
    );
    trip.conditions = input.conditions.trim().to_string();
    trip.guide = input.guide.trim().to_string();

    let id = logbook.trips.insert(&trip).await?;
    logbook.preferences.set_ongoing_session_id(id).await?;
    info!("outward trip {id} started at {} km", trip.start_km);
    Ok(id)
}

/// Closes an outward leg.
///
/// Without `allow_inconsistent_km`, an end km not past the start km fails with
/// [`UseCaseError::KmInconsistency`] so the caller can confirm and retry.
pub async fn finish_outward(
    logbook: &Logbook,
    trip_id: TripId,
    end_km: i32,
    end_place: &str,
    allow_inconsistent_km: bool,
) -> Outcome<()> {
    let mut trip = logbook.load_trip(trip_id).await?;
    if trip.is_return || !trip.is_active() {
        return Err(UseCaseError::ValidationFailed(format!(
            "Trip {trip_id} is not an outward trip in progress"
        )));
    }

    let end_time = logbook.clock.now_millis();
    check_trip_end(
        logbook,
        &trip,
        end_km,
        Some(end_place),
        end_time,
        allow_inconsistent_km,
    )?;
    if allow_inconsistent_km && end_km <= trip.start_km {
        warn!(
            "outward trip {trip_id} finished with confirmed inconsistent km ({} -> {end_km})",
            trip.start_km
        );
    }

    trip.end_km = Some(end_km);
    trip.end_place = Some(end_place.trim().to_string());
    trip.end_time = Some(end_time);
    trip.status = TripStatus::Completed;
    logbook.trips.update(&trip).await?;
    logbook.preferences.clear_ongoing_session_id().await?;
    info!("outward trip {trip_id} finished at {end_km} km");
    Ok(())
}
