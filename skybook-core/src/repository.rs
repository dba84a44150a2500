use async_trait::async_trait;
use uuid::Uuid;

use crate::flight::Flight;
use crate::reservation::Reservation;
use crate::user::{Role, User};

/// Storage failures surfaced to handlers. Unique violations are their own
/// variant: the seat and email uniqueness constraints are the last line of
/// defense against races, and handlers remap them to conflict responses.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Flight schedule lookups. Flights are read-only to this service.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn find_by_number(&self, flight_number: &str) -> StoreResult<Option<Flight>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Flight>>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn insert(&self, reservation: &Reservation) -> StoreResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Reservation>>;

    /// True iff an active reservation other than `exclude` holds the seat.
    async fn seat_taken(
        &self,
        flight_id: Uuid,
        seat_code: &str,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool>;

    /// Seat codes of active reservations on the flight, minus `exclude`.
    async fn occupied_seats(
        &self,
        flight_id: Uuid,
        exclude: Option<Uuid>,
    ) -> StoreResult<Vec<String>>;

    async fn update(&self, reservation: &Reservation) -> StoreResult<()>;

    /// Marks the reservation cancelled. No-op on an unknown id.
    async fn cancel(&self, id: Uuid) -> StoreResult<()>;

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>>;

    async fn list_all(&self) -> StoreResult<Vec<Reservation>>;

    async fn pnr_exists(&self, pnr: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> StoreResult<()>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list(&self, role: Option<Role>) -> StoreResult<Vec<User>>;
    async fn update(&self, user: &User) -> StoreResult<()>;
    /// Returns false when the id was unknown.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<()>;
}
