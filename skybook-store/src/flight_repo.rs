use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use skybook_core::repository::{FlightRepository, StoreResult};
use skybook_core::Flight;

use crate::map_sqlx_err;

pub struct SqliteFlightRepository {
    pool: Pool<Sqlite>,
}

impl SqliteFlightRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Flights are read-only to the reservation service; this exists for
    /// schedule loaders and the test suites.
    pub async fn seed(&self, flight: &Flight) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO flights (id, flight_number, origin, destination, scheduled_departure, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(flight.id)
        .bind(&flight.flight_number)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.scheduled_departure)
        .bind(flight.price)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    flight_number: String,
    origin: String,
    destination: String,
    scheduled_departure: DateTime<Utc>,
    price: f64,
}

impl FlightRow {
    fn into_domain(self) -> Flight {
        Flight {
            id: self.id,
            flight_number: self.flight_number,
            origin: self.origin,
            destination: self.destination,
            scheduled_departure: self.scheduled_departure,
            price: self.price,
        }
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, flight_number, origin, destination, scheduled_departure, price FROM flights";

#[async_trait]
impl FlightRepository for SqliteFlightRepository {
    async fn find_by_number(&self, flight_number: &str) -> StoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "{SELECT_COLUMNS} WHERE flight_number = $1"
        ))
        .bind(flight_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.map(FlightRow::into_domain))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(row.map(FlightRow::into_domain))
    }
}
