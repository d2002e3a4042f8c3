use std::sync::Arc;

use tracing::info;

use crate::{
    clock::Clock,
    config::AppConfig,
    db::{init_pool, run_migrations},
    domain::{StandardValidator, TripValidator},
    error::{AppError, Outcome, UseCaseError},
    models::trip::{Trip, TripId},
    services::{
        feed::TripFeed,
        preferences::{JsonPreferenceStore, PreferenceStore},
        trips::{SqliteTripRepository, TripRepository},
    },
};

/// Everything a use case needs, shared by cheap clones.
#[derive(Clone)]
pub struct Logbook {
    pub trips: Arc<dyn TripRepository>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub validator: Arc<dyn TripValidator>,
    pub clock: Arc<dyn Clock>,
}

impl Logbook {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        preferences: Arc<dyn PreferenceStore>,
        validator: Arc<dyn TripValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trips,
            preferences,
            validator,
            clock,
        }
    }

    /// Opens the SQLite logbook and preference file named by `config`.
    pub async fn open(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let db = init_pool(&config.database_url, config.max_connections).await?;
        run_migrations(&db).await?;
        let trips = SqliteTripRepository::new(db).await?;
        let preferences = JsonPreferenceStore::open(config.preferences_path.clone()).await?;
        let validator = StandardValidator::new(clock.clone());
        info!("logbook opened at {}", config.database_url);
        Ok(Self::new(
            Arc::new(trips),
            Arc::new(preferences),
            Arc::new(validator),
            clock,
        ))
    }

    pub fn feed(&self) -> TripFeed {
        TripFeed::new(self.trips.observe())
    }

    pub(crate) async fn load_trip(&self, id: TripId) -> Outcome<Trip> {
        self.trips
            .get_by_id(id)
            .await?
            .ok_or(UseCaseError::NotFound(id))
    }
}
