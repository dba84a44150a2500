use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A booked (or cancelled) seat on a flight. This is the core's primary
/// mutable record; it is never physically deleted, only cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    /// Human-readable booking reference, unique across all reservations
    /// including cancelled ones.
    pub pnr: String,
    pub flight_id: Uuid,
    /// Owning user; None for guest bookings.
    pub user_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub passport: String,
    pub seat: Seat,
    pub meal: Meal,
    pub baggage: Baggage,
    pub bill: Bill,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub code: String,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub label: String,
    pub price: f64,
}

impl Default for Meal {
    fn default() -> Self {
        Meal {
            label: "None".to_string(),
            price: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Baggage {
    pub kg: u32,
}

/// Billing snapshot. `base_fare` is copied from the flight at creation
/// time; `total` is recomputed from the bill inputs on every persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub base_fare: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealInput {
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
}

impl MealInput {
    pub fn into_meal(self) -> Meal {
        Meal {
            label: self.label.unwrap_or_else(|| "None".to_string()),
            price: self.price.max(0.0),
        }
    }
}

/// Absent fields deserialize to their empty defaults so the handler can
/// answer "missing required fields" instead of a serde rejection.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub passport: String,
    #[serde(default)]
    pub seat: String,
    #[serde(default)]
    pub flight_id: Option<Uuid>,
    pub meal_option: Option<MealInput>,
    #[serde(default, deserialize_with = "lenient_kg")]
    pub baggage: u32,
}

impl CreateReservationRequest {
    /// Presence check for the required fields. Identifiers are validated by
    /// deserialization; the string fields just need to be non-blank.
    pub fn missing_required_fields(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.passport,
            &self.seat,
        ]
        .iter()
        .any(|f| f.trim().is_empty())
    }
}

/// Partial update: omitted fields keep their prior values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReservationRequest {
    pub seat: Option<String>,
    pub meal_option: Option<MealInput>,
    #[serde(default, deserialize_with = "lenient_kg_opt")]
    pub baggage: Option<u32>,
}

/// Baggage weights arrive from forms as numbers, numeric strings, or junk.
/// Junk and negatives coerce to 0 rather than rejecting the request.
fn coerce_kg(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.max(0) as u32
            } else {
                n.as_f64().map(|f| f.max(0.0) as u32).unwrap_or(0)
            }
        }
        serde_json::Value::String(s) => leading_int(s),
        _ => 0,
    }
}

/// parseInt-style prefix parse: "23kg" -> 23, "abc" -> 0.
fn leading_int(s: &str) -> u32 {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn lenient_kg<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_kg(&value))
}

fn lenient_kg_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(coerce_kg(&value)))
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let price = match &value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(price)
}
