//! Validated state transitions of the trip lifecycle.
//!
//! Every operation reads what it needs, validates, then writes. Nothing here
//! panics or leaks a storage error unwrapped: failures come back as
//! [`UseCaseError`](crate::error::UseCaseError) inside an
//! [`Outcome`](crate::error::Outcome).

pub mod delete;
pub mod edit;
pub mod outward;
pub mod return_trip;
pub mod session;
pub mod trip_type;

use crate::{
    domain::Validation,
    error::{KmInconsistency, Outcome, UseCaseError},
    models::trip::{Timestamp, Trip},
    state::Logbook,
};

fn check(validation: Validation) -> Outcome<()> {
    validation
        .into_result()
        .map_err(UseCaseError::ValidationFailed)
}

/// Range is always enforced; ordering against `start_km` only without override.
fn check_end_km(
    logbook: &Logbook,
    start_km: i32,
    end_km: i32,
    allow_inconsistent_km: bool,
) -> Outcome<()> {
    check(logbook.validator.validate_km(end_km))?;
    if allow_inconsistent_km {
        return Ok(());
    }
    match logbook.validator.validate_end_km(start_km, end_km) {
        Validation::Valid => Ok(()),
        Validation::Invalid(message) => Err(KmInconsistency {
            message,
            start_km,
            end_km,
        }
        .into()),
    }
}

/// Checks the end of a running leg.
///
/// The place goes first so a bad place never turns into a km prompt. The km
/// ordering failure is reported as a [`KmInconsistency`]; once that passes or is
/// overridden, the rest of the end is checked in the validator's usual order.
/// A leg without an end place (a return prepared without one) skips the place.
fn check_trip_end(
    logbook: &Logbook,
    trip: &Trip,
    end_km: i32,
    end_place: Option<&str>,
    end_time: Timestamp,
    allow_inconsistent_km: bool,
) -> Outcome<()> {
    let validator = &logbook.validator;
    if let Some(place) = end_place {
        check(validator.validate_place(place))?;
    }
    check_end_km(logbook, trip.start_km, end_km, allow_inconsistent_km)?;

    let times = || {
        validator
            .validate_timestamp(end_time)
            .and_then(|| validator.validate_time_range(trip.start_time, end_time))
    };
    match end_place {
        Some(place) if !allow_inconsistent_km => check(validator.validate_trip_end(
            trip.start_km,
            end_km,
            place,
            trip.start_time,
            end_time,
        )),
        _ => check(times()),
    }
}
