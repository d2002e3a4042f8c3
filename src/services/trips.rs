use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::{
    db::DbPool,
    error::AppError,
    models::trip::{Trip, TripId, TripStatus},
};

/// Storage for trip rows. Ordering is not part of the contract.
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn insert(&self, trip: &Trip) -> Result<TripId, AppError>;

    async fn update(&self, trip: &Trip) -> Result<(), AppError>;

    async fn delete(&self, trip: &Trip) -> Result<(), AppError>;

    /// Deletes all given trips in order, or none of them.
    async fn delete_all(&self, trips: &[Trip]) -> Result<(), AppError>;

    async fn get_by_id(&self, id: TripId) -> Result<Option<Trip>, AppError>;

    async fn list_all(&self) -> Result<Vec<Trip>, AppError>;

    /// Latest full snapshot, republished after every write.
    fn observe(&self) -> watch::Receiver<Vec<Trip>>;
}

const SELECT_TRIPS: &str = r#"SELECT id, start_km, end_km, start_place, end_place, start_time, end_time, is_return, paired_trip_id, status, conditions, guide, date FROM trips"#;

pub struct SqliteTripRepository {
    db: DbPool,
    snapshot: watch::Sender<Vec<Trip>>,
    /// Held across each write and its publish so snapshots go out in write order.
    writes: Mutex<()>,
}

impl SqliteTripRepository {
    pub async fn new(db: DbPool) -> Result<Self, AppError> {
        let initial = fetch_all(&db).await?;
        let (snapshot, _) = watch::channel(initial);
        Ok(Self {
            db,
            snapshot,
            writes: Mutex::new(()),
        })
    }

    async fn publish(&self) -> Result<(), AppError> {
        let trips = fetch_all(&self.db).await?;
        debug!("publishing snapshot of {} trips", trips.len());
        self.snapshot.send_replace(trips);
        Ok(())
    }
}

#[async_trait]
impl TripRepository for SqliteTripRepository {
    async fn insert(&self, trip: &Trip) -> Result<TripId, AppError> {
        let _write = self.writes.lock().await;
        let id = sqlx::query(
            r#"INSERT INTO trips (start_km, end_km, start_place, end_place, start_time, end_time, is_return, paired_trip_id, status, conditions, guide, date)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
        )
        .bind(trip.start_km)
        .bind(trip.end_km)
        .bind(&trip.start_place)
        .bind(&trip.end_place)
        .bind(trip.start_time)
        .bind(trip.end_time)
        .bind(trip.is_return)
        .bind(trip.paired_trip_id)
        .bind(trip.status.as_str())
        .bind(&trip.conditions)
        .bind(&trip.guide)
        .bind(trip.date)
        .execute(&self.db)
        .await?
        .last_insert_rowid();
        self.publish().await?;
        Ok(id)
    }

    async fn update(&self, trip: &Trip) -> Result<(), AppError> {
        let _write = self.writes.lock().await;
        let result = sqlx::query(
            r#"UPDATE trips SET start_km = ?1, end_km = ?2, start_place = ?3, end_place = ?4, start_time = ?5, end_time = ?6,
               is_return = ?7, paired_trip_id = ?8, status = ?9, conditions = ?10, guide = ?11, date = ?12
               WHERE id = ?13"#,
        )
        .bind(trip.start_km)
        .bind(trip.end_km)
        .bind(&trip.start_place)
        .bind(&trip.end_place)
        .bind(trip.start_time)
        .bind(trip.end_time)
        .bind(trip.is_return)
        .bind(trip.paired_trip_id)
        .bind(trip.status.as_str())
        .bind(&trip.conditions)
        .bind(&trip.guide)
        .bind(trip.date)
        .bind(trip.id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        self.publish().await
    }

    async fn delete(&self, trip: &Trip) -> Result<(), AppError> {
        let _write = self.writes.lock().await;
        let result = sqlx::query("DELETE FROM trips WHERE id = ?1")
            .bind(trip.id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        self.publish().await
    }

    async fn delete_all(&self, trips: &[Trip]) -> Result<(), AppError> {
        let _write = self.writes.lock().await;
        let mut tx = self.db.begin().await?;
        for trip in trips {
            let result = sqlx::query("DELETE FROM trips WHERE id = ?1")
                .bind(trip.id)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back earlier deletes.
                return Err(AppError::NotFound);
            }
        }
        tx.commit().await?;
        self.publish().await
    }

    async fn get_by_id(&self, id: TripId) -> Result<Option<Trip>, AppError> {
        let row = sqlx::query(&format!("{SELECT_TRIPS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.as_ref().map(trip_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Trip>, AppError> {
        fetch_all(&self.db).await
    }

    fn observe(&self) -> watch::Receiver<Vec<Trip>> {
        self.snapshot.subscribe()
    }
}

async fn fetch_all(db: &DbPool) -> Result<Vec<Trip>, AppError> {
    let rows = sqlx::query(&format!("{SELECT_TRIPS} ORDER BY id"))
        .fetch_all(db)
        .await?;
    rows.iter().map(trip_from_row).collect()
}

fn trip_from_row(row: &SqliteRow) -> Result<Trip, AppError> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<TripStatus>()
        .map_err(AppError::Corrupt)?;
    Ok(Trip {
        id: row.try_get("id")?,
        start_km: row.try_get("start_km")?,
        end_km: row.try_get("end_km")?,
        start_place: row.try_get("start_place")?,
        end_place: row.try_get("end_place")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        is_return: row.try_get("is_return")?,
        paired_trip_id: row.try_get("paired_trip_id")?,
        status,
        conditions: row.try_get("conditions")?,
        guide: row.try_get("guide")?,
        date: row.try_get("date")?,
    })
}
