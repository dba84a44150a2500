use std::sync::Arc;

use skybook_core::pnr::PnrGenerator;
use skybook_core::repository::{FlightRepository, ReservationRepository, UserRepository};
use skybook_core::FareRules;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<dyn FlightRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub pnr: Arc<dyn PnrGenerator>,
    pub fare_rules: FareRules,
    pub auth: AuthConfig,
}
