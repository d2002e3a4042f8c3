use tokio::sync::watch;

use crate::{
    domain::{derive_driving_state, group_trips, summarize, LogbookSummary},
    models::{driving_state::DrivingState, trip::Trip, trip_group::TripGroup},
};

/// Read side for presentation: every derivation runs on a cloned snapshot.
#[derive(Clone)]
pub struct TripFeed {
    trips: watch::Receiver<Vec<Trip>>,
}

impl TripFeed {
    pub fn new(trips: watch::Receiver<Vec<Trip>>) -> Self {
        Self { trips }
    }

    pub fn snapshot(&self) -> Vec<Trip> {
        self.trips.borrow().clone()
    }

    pub fn driving_state(&self) -> DrivingState {
        derive_driving_state(&self.snapshot())
    }

    pub fn groups(&self) -> Vec<TripGroup> {
        group_trips(&self.snapshot())
    }

    pub fn summary(&self) -> LogbookSummary {
        summarize(&self.groups())
    }

    /// Waits for the next write. Returns `false` once the repository is gone.
    pub async fn changed(&mut self) -> bool {
        self.trips.changed().await.is_ok()
    }
}
