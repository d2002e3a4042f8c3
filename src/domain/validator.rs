//! Field-level and cross-field business rules for trips.
//!
//! Every check returns a [`Validation`]; the aggregate checks run their parts in
//! a fixed order and stop at the first failure.

use std::sync::Arc;

use crate::{
    clock::Clock,
    models::trip::Timestamp,
};

pub const MIN_KM: i32 = 0;
pub const MAX_KM: i32 = 999_999;
pub const MIN_PLACE_LEN: usize = 2;
pub const MAX_PLACE_LEN: usize = 100;
pub const MAX_CONDITIONS_LEN: usize = 200;
pub const MIN_GUIDE: u32 = 1;
pub const MAX_GUIDE: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Validation::Valid => None,
            Validation::Invalid(message) => Some(message),
        }
    }

    /// Runs `next` only if `self` is valid.
    pub fn and_then(self, next: impl FnOnce() -> Validation) -> Validation {
        match self {
            Validation::Valid => next(),
            invalid => invalid,
        }
    }

    pub fn into_result(self) -> Result<(), String> {
        match self {
            Validation::Valid => Ok(()),
            Validation::Invalid(message) => Err(message),
        }
    }
}

fn invalid(message: impl Into<String>) -> Validation {
    Validation::Invalid(message.into())
}

pub trait TripValidator: Send + Sync {
    /// Odometer range check shared by every km field.
    fn validate_km(&self, km: i32) -> Validation;

    fn validate_start_km(&self, km: i32) -> Validation;

    fn validate_end_km(&self, start_km: i32, end_km: i32) -> Validation;

    fn validate_place(&self, place: &str) -> Validation;

    fn validate_guide(&self, guide: &str) -> Validation;

    fn validate_conditions(&self, text: &str) -> Validation;

    fn validate_timestamp(&self, ts: Timestamp) -> Validation;

    fn validate_time_range(&self, start: Timestamp, end: Timestamp) -> Validation;

    /// Start km, place, guide, conditions.
    fn validate_outward_start(
        &self,
        start_km: i32,
        start_place: &str,
        conditions: &str,
        guide: &str,
    ) -> Validation {
        self.validate_start_km(start_km)
            .and_then(|| self.validate_place(start_place))
            .and_then(|| self.validate_guide(guide))
            .and_then(|| self.validate_conditions(conditions))
    }

    /// End km, end place, end timestamp, time range.
    fn validate_trip_end(
        &self,
        start_km: i32,
        end_km: i32,
        end_place: &str,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Validation {
        self.validate_end_km(start_km, end_km)
            .and_then(|| self.validate_place(end_place))
            .and_then(|| self.validate_timestamp(end_time))
            .and_then(|| self.validate_time_range(start_time, end_time))
    }
}

/// The stock rule set. Holds only the clock used for "not in the future".
#[derive(Clone)]
pub struct StandardValidator {
    clock: Arc<dyn Clock>,
}

impl StandardValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl TripValidator for StandardValidator {
    fn validate_km(&self, km: i32) -> Validation {
        if km < MIN_KM {
            invalid(format!(
                "Kilometers cannot go below the minimum of {MIN_KM} km"
            ))
        } else if km > MAX_KM {
            invalid(format!(
                "Kilometers cannot exceed the maximum of {MAX_KM} km"
            ))
        } else {
            Validation::Valid
        }
    }

    fn validate_start_km(&self, km: i32) -> Validation {
        self.validate_km(km)
    }

    fn validate_end_km(&self, start_km: i32, end_km: i32) -> Validation {
        self.validate_km(end_km).and_then(|| {
            if end_km < start_km {
                invalid(format!(
                    "End km ({end_km}) must be greater than start km ({start_km})"
                ))
            } else if end_km == start_km {
                invalid(format!(
                    "End km must differ from start km ({start_km}): a trip must cover some distance"
                ))
            } else {
                Validation::Valid
            }
        })
    }

    fn validate_place(&self, place: &str) -> Validation {
        let trimmed = place.trim();
        let len = trimmed.chars().count();
        if trimmed.is_empty() {
            invalid("Place is required")
        } else if len < MIN_PLACE_LEN {
            invalid(format!(
                "Place must be at least {MIN_PLACE_LEN} characters"
            ))
        } else if len > MAX_PLACE_LEN {
            invalid(format!(
                "Place cannot be longer than {MAX_PLACE_LEN} characters"
            ))
        } else {
            Validation::Valid
        }
    }

    fn validate_guide(&self, guide: &str) -> Validation {
        let trimmed = guide.trim();
        if trimmed.is_empty() {
            return invalid("Guide is required");
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return invalid("Guide must be a number");
        }
        match trimmed.parse::<u32>() {
            Ok(value) if (MIN_GUIDE..=MAX_GUIDE).contains(&value) => Validation::Valid,
            _ => invalid(format!(
                "Guide must be between {MIN_GUIDE} and {MAX_GUIDE}"
            )),
        }
    }

    fn validate_conditions(&self, text: &str) -> Validation {
        if text.chars().count() > MAX_CONDITIONS_LEN {
            invalid(format!(
                "Conditions cannot be longer than {MAX_CONDITIONS_LEN} characters"
            ))
        } else {
            Validation::Valid
        }
    }

    fn validate_timestamp(&self, ts: Timestamp) -> Validation {
        if ts < 0 {
            invalid("Timestamp cannot be negative")
        } else if ts > self.clock.now_millis() {
            invalid("Timestamp cannot be in the future")
        } else {
            Validation::Valid
        }
    }

    fn validate_time_range(&self, start: Timestamp, end: Timestamp) -> Validation {
        if end <= start {
            invalid("End time must be after start time")
        } else {
            Validation::Valid
        }
    }
}
