use tracing::{info, warn};

use crate::{
    error::{Outcome, UseCaseError},
    models::trip::{Trip, TripId, TripStatus},
    state::Logbook,
};

/// Records what follows a finished outward leg and returns the id of the new
/// return-side row.
///
/// With `prepare_return` the row is a `Ready` return leg starting where the
/// outward leg ended, and becomes the ongoing session. Otherwise a `Skipped`
/// placeholder marks the session as a simple trip and the outward leg is
/// paired with itself.
pub async fn decide_trip_type(
    logbook: &Logbook,
    trip_id: TripId,
    prepare_return: bool,
) -> Outcome<TripId> {
    let mut outward = logbook.load_trip(trip_id).await?;
    if outward.is_return {
        return Err(UseCaseError::ValidationFailed(format!(
            "Trip {trip_id} is a return trip"
        )));
    }
    let (Some(end_km), Some(end_place), Some(end_time)) =
        (outward.end_km, outward.end_place.clone(), outward.end_time)
    else {
        return Err(UseCaseError::ValidationFailed(format!(
            "Trip {trip_id} is not finished yet"
        )));
    };
    if !outward.is_completed() {
        return Err(UseCaseError::ValidationFailed(format!(
            "Trip {trip_id} is not finished yet"
        )));
    }

    let trips = logbook.trips.list_all().await?;
    if trips
        .iter()
        .any(|t| t.is_return && t.paired_trip_id == Some(trip_id))
    {
        return Err(UseCaseError::ValidationFailed(format!(
            "Trip type of trip {trip_id} has already been decided"
        )));
    }
    // At most one return leg is prepared or running at any time.
    if prepare_return {
        if let Some(open) = trips
            .iter()
            .find(|t| matches!(t.status, TripStatus::Ready | TripStatus::Active))
        {
            warn!(
                "refusing to prepare a return for trip {trip_id} while trip {} is {}",
                open.id, open.status
            );
            return Err(UseCaseError::ValidationFailed(format!(
                "Another trip ({}) is already prepared or in progress",
                open.id
            )));
        }
    }

    let mut return_side = Trip {
        id: 0,
        start_km: end_km,
        // Placeholder rows carry an end km so only running legs have none.
        end_km: Some(end_km),
        start_place: end_place.clone(),
        end_place: None,
        start_time: end_time,
        end_time: None,
        is_return: true,
        paired_trip_id: Some(outward.id),
        status: TripStatus::Ready,
        conditions: outward.conditions.clone(),
        guide: outward.guide.clone(),
        date: outward.date,
    };

    if prepare_return {
        return_side.end_place = Some(outward.start_place.clone());
        return_side.start_time = logbook.clock.now_millis();
        return_side.date = logbook.clock.today();
        let id = logbook.trips.insert(&return_side).await?;
        logbook.preferences.set_ongoing_session_id(id).await?;
        info!("return trip {id} prepared for outward trip {trip_id}");
        return Ok(id);
    }

    return_side.end_place = Some(end_place);
    return_side.end_time = Some(end_time);
    return_side.status = TripStatus::Skipped;
    let id = logbook.trips.insert(&return_side).await?;
    outward.paired_trip_id = Some(outward.id);
    logbook.trips.update(&outward).await?;
    logbook.preferences.clear_ongoing_session_id().await?;
    info!("outward trip {trip_id} closed as a simple trip");
    Ok(id)
}
