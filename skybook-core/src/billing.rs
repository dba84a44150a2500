use serde::Deserialize;
use std::collections::BTreeSet;

/// Fare rules are deployment configuration, injected wherever seat or
/// billing decisions are made. Defaults reproduce the production tariff:
/// rows 1-4 premium, 20 kg free baggage, no excess fee.
#[derive(Debug, Clone, Deserialize)]
pub struct FareRules {
    #[serde(default = "default_premium_rows")]
    pub premium_rows: BTreeSet<u32>,
    #[serde(default = "default_free_baggage_kg")]
    pub free_baggage_kg: u32,
    #[serde(default)]
    pub excess_baggage_fee_per_kg: f64,
}

fn default_premium_rows() -> BTreeSet<u32> {
    [1, 2, 3, 4].into_iter().collect()
}

fn default_free_baggage_kg() -> u32 {
    20
}

impl Default for FareRules {
    fn default() -> Self {
        FareRules {
            premium_rows: default_premium_rows(),
            free_baggage_kg: default_free_baggage_kg(),
            excess_baggage_fee_per_kg: 0.0,
        }
    }
}

impl FareRules {
    pub fn is_premium(&self, seat_code: &str) -> bool {
        self.premium_rows.contains(&seat_row(seat_code))
    }

    /// Monotonic non-decreasing in declared kilograms.
    pub fn baggage_surcharge(&self, kg: u32) -> f64 {
        f64::from(kg.saturating_sub(self.free_baggage_kg)) * self.excess_baggage_fee_per_kg
    }

    pub fn total(&self, base_fare: f64, meal_price: f64, baggage_kg: u32) -> f64 {
        base_fare + meal_price + self.baggage_surcharge(baggage_kg)
    }
}

/// Row number from a seat code like "12C". Codes without leading digits
/// parse to row 0, which is never premium.
pub fn seat_row(code: &str) -> u32 {
    let digits: String = code
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Non-negative billing delta after an update. Decreases never signal a
/// refund through this path.
pub fn amount_due(old_total: f64, new_total: f64) -> f64 {
    (new_total - old_total).max(0.0)
}
