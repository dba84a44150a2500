pub mod billing;
pub mod flight;
pub mod pnr;
pub mod repository;
pub mod reservation;
pub mod user;

pub use billing::FareRules;
pub use flight::Flight;
pub use repository::{FlightRepository, ReservationRepository, StoreError, UserRepository};
pub use reservation::{Reservation, ReservationStatus};
pub use user::{Role, User};
