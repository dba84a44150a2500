use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled flight. Read-only from the reservation core's perspective;
/// rows are seeded by operations tooling, not by any handler here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub scheduled_departure: DateTime<Utc>,
    pub price: f64,
}

impl Flight {
    /// A flight is closed for booking once its departure time has passed.
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_departure < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn flight_at(departure: DateTime<Utc>) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            flight_number: "SB101".to_string(),
            origin: "LIS".to_string(),
            destination: "AMS".to_string(),
            scheduled_departure: departure,
            price: 100.0,
        }
    }

    #[test]
    fn departed_when_schedule_in_past() {
        let now = Utc::now();
        assert!(flight_at(now - Duration::hours(1)).has_departed(now));
        assert!(!flight_at(now + Duration::hours(1)).has_departed(now));
    }
}
