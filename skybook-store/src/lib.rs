pub mod app_config;
pub mod database;
pub mod flight_repo;
pub mod reservation_repo;
pub mod user_repo;

pub use database::DbClient;
pub use flight_repo::SqliteFlightRepository;
pub use reservation_repo::SqliteReservationRepository;
pub use user_repo::SqliteUserRepository;

use skybook_core::repository::StoreError;

/// Unique violations become their own variant so the API layer can remap
/// them to conflict responses; everything else is an opaque backend error.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation(db_err.message().to_string());
        }
    }
    StoreError::Backend(Box::new(err))
}
