//! Narrow field editors for recorded trips. Each touches exactly one field and
//! re-checks it against what is already stored.
//!
//! Only a `Completed` trip has a recorded end. Prepared and skipped return rows
//! carry placeholder end values, which are neither editable nor compared with.

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    error::{Outcome, UseCaseError},
    models::trip::{Timestamp, Trip, TripId},
    state::Logbook,
};

use super::check;

async fn save(logbook: &Logbook, trip: &Trip, field: &str) -> Outcome<()> {
    logbook.trips.update(trip).await?;
    debug!("trip {} {field} edited", trip.id);
    Ok(())
}

fn no_end_recorded(trip_id: TripId) -> UseCaseError {
    UseCaseError::ValidationFailed(format!("Trip {trip_id} has no end recorded yet"))
}

fn recorded_end_time(trip: &Trip) -> Option<Timestamp> {
    trip.end_time.filter(|_| trip.is_completed())
}

fn recorded_end_km(trip: &Trip) -> Option<i32> {
    trip.end_km.filter(|_| trip.is_completed())
}

pub async fn edit_date(logbook: &Logbook, trip_id: TripId, date: NaiveDate) -> Outcome<()> {
    let mut trip = logbook.load_trip(trip_id).await?;
    if date > logbook.clock.today() {
        return Err(UseCaseError::ValidationFailed(
            "Date cannot be in the future".into(),
        ));
    }
    trip.date = date;
    save(logbook, &trip, "date").await
}

pub async fn edit_conditions(logbook: &Logbook, trip_id: TripId, conditions: &str) -> Outcome<()> {
    let mut trip = logbook.load_trip(trip_id).await?;
    check(logbook.validator.validate_conditions(conditions))?;
    trip.conditions = conditions.trim().to_string();
    save(logbook, &trip, "conditions").await
}

pub async fn edit_start_time(
    logbook: &Logbook,
    trip_id: TripId,
    start_time: Timestamp,
) -> Outcome<()> {
    let mut trip = logbook.load_trip(trip_id).await?;
    check(logbook.validator.validate_timestamp(start_time))?;
    if let Some(end_time) = recorded_end_time(&trip) {
        check(logbook.validator.validate_time_range(start_time, end_time))?;
    }
    trip.start_time = start_time;
    save(logbook, &trip, "start time").await
}

pub async fn edit_end_time(
    logbook: &Logbook,
    trip_id: TripId,
    end_time: Timestamp,
) -> Outcome<()> {
    let mut trip = logbook.load_trip(trip_id).await?;
    if recorded_end_time(&trip).is_none() {
        return Err(no_end_recorded(trip_id));
    }
    check(logbook.validator.validate_timestamp(end_time))?;
    check(logbook.validator.validate_time_range(trip.start_time, end_time))?;
    trip.end_time = Some(end_time);
    save(logbook, &trip, "end time").await
}

pub async fn edit_start_km(logbook: &Logbook, trip_id: TripId, start_km: i32) -> Outcome<()> {
    let mut trip = logbook.load_trip(trip_id).await?;
    check(logbook.validator.validate_start_km(start_km))?;
    if let Some(end_km) = recorded_end_km(&trip) {
        if start_km >= end_km {
            return Err(UseCaseError::ValidationFailed(format!(
                "Start km ({start_km}) must be less than end km ({end_km})"
            )));
        }
    }
    trip.start_km = start_km;
    save(logbook, &trip, "start km").await
}

pub async fn edit_end_km(logbook: &Logbook, trip_id: TripId, end_km: i32) -> Outcome<()> {
    let mut trip = logbook.load_trip(trip_id).await?;
    if recorded_end_km(&trip).is_none() {
        return Err(no_end_recorded(trip_id));
    }
    check(logbook.validator.validate_end_km(trip.start_km, end_km))?;
    trip.end_km = Some(end_km);
    save(logbook, &trip, "end km").await
}
