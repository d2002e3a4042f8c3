use tracing::{info, warn};

use crate::{
    error::{Outcome, UseCaseError},
    models::trip::{Trip, TripId, TripStatus},
    state::Logbook,
};

use super::{check, check_trip_end};

async fn load_return(logbook: &Logbook, trip_id: TripId, expected: TripStatus) -> Outcome<Trip> {
    let trip = logbook.load_trip(trip_id).await?;
    if !trip.is_return || trip.status != expected {
        return Err(UseCaseError::ValidationFailed(format!(
            "Trip {trip_id} is not a return trip in status {expected}"
        )));
    }
    Ok(trip)
}

/// Starts a prepared return leg, optionally correcting its start km.
pub async fn start_return(
    logbook: &Logbook,
    return_trip_id: TripId,
    actual_start_km: Option<i32>,
) -> Outcome<()> {
    let mut trip = load_return(logbook, return_trip_id, TripStatus::Ready).await?;
    let start_km = actual_start_km.unwrap_or(trip.start_km);
    check(logbook.validator.validate_start_km(start_km))?;
    if let Some(running) = logbook
        .trips
        .list_all()
        .await?
        .into_iter()
        .find(|t| t.id != return_trip_id && t.is_active())
    {
        warn!(
            "refusing to start return trip {return_trip_id} while trip {} is running",
            running.id
        );
        return Err(UseCaseError::ValidationFailed(format!(
            "Another trip ({}) is already in progress",
            running.id
        )));
    }

    trip.start_km = start_km;
    trip.start_time = logbook.clock.now_millis();
    trip.end_km = None;
    trip.end_time = None;
    trip.status = TripStatus::Active;
    logbook.trips.update(&trip).await?;
    logbook.preferences.set_ongoing_session_id(trip.id).await?;
    info!("return trip {return_trip_id} started at {start_km} km");
    Ok(())
}

/// Closes a running return leg. Same km override protocol as the outward leg.
pub async fn finish_return(
    logbook: &Logbook,
    trip_id: TripId,
    end_km: i32,
    allow_inconsistent_km: bool,
) -> Outcome<()> {
    let mut trip = load_return(logbook, trip_id, TripStatus::Active).await?;
    let end_time = logbook.clock.now_millis();
    check_trip_end(
        logbook,
        &trip,
        end_km,
        trip.end_place.as_deref(),
        end_time,
        allow_inconsistent_km,
    )?;
    if allow_inconsistent_km && end_km <= trip.start_km {
        warn!(
            "return trip {trip_id} finished with confirmed inconsistent km ({} -> {end_km})",
            trip.start_km
        );
    }

    trip.end_km = Some(end_km);
    trip.end_place = Some(trip.end_place.take().unwrap_or_default());
    trip.end_time = Some(end_time);
    trip.status = TripStatus::Completed;
    logbook.trips.update(&trip).await?;
    logbook.preferences.clear_ongoing_session_id().await?;
    info!("return trip {trip_id} finished at {end_km} km");
    Ok(())
}

/// Drops a prepared return leg without driving it.
pub async fn cancel_return(logbook: &Logbook, return_trip_id: TripId) -> Outcome<()> {
    let mut trip = load_return(logbook, return_trip_id, TripStatus::Ready).await?;
    trip.status = TripStatus::Cancelled;
    logbook.trips.update(&trip).await?;
    logbook.preferences.clear_ongoing_session_id().await?;
    info!("return trip {return_trip_id} cancelled");
    Ok(())
}
