#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use skybook_api::state::{AppState, AuthConfig};
use skybook_api::{app, auth};
use skybook_core::pnr::RandomPnr;
use skybook_core::user::{Role, User};
use skybook_core::{FareRules, Flight};
use skybook_store::{
    DbClient, SqliteFlightRepository, SqliteReservationRepository, SqliteUserRepository,
};

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub db: DbClient,
}

pub async fn spawn() -> TestApp {
    spawn_with_rules(FareRules::default()).await
}

pub async fn spawn_with_rules(fare_rules: FareRules) -> TestApp {
    let db = DbClient::in_memory().await.expect("in-memory db");
    db.migrate().await.expect("migrations");

    let state = AppState {
        flights: Arc::new(SqliteFlightRepository::new(db.pool.clone())),
        reservations: Arc::new(SqliteReservationRepository::new(db.pool.clone())),
        users: Arc::new(SqliteUserRepository::new(db.pool.clone())),
        pnr: Arc::new(RandomPnr),
        fare_rules,
        auth: AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        },
    };

    TestApp {
        app: app(state.clone()),
        state,
        db,
    }
}

impl TestApp {
    /// Seeds a flight departing `hours_from_now` hours from now.
    pub async fn seed_flight(&self, number: &str, hours_from_now: i64, price: f64) -> Uuid {
        let flight = Flight {
            id: Uuid::new_v4(),
            flight_number: number.to_string(),
            origin: "LIS".to_string(),
            destination: "AMS".to_string(),
            scheduled_departure: Utc::now() + Duration::hours(hours_from_now),
            price,
        };
        SqliteFlightRepository::new(self.db.pool.clone())
            .seed(&flight)
            .await
            .expect("seed flight");
        flight.id
    }

    /// Inserts a user directly and returns (id, bearer token).
    pub async fn create_user(&self, email: &str, password: &str, role: Role) -> (Uuid, String) {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: auth::hash_password(password).expect("hash"),
            role,
            created_at: Utc::now(),
        };
        self.state.users.insert(&user).await.expect("insert user");
        let token = auth::issue_token(&self.state, &user).expect("token");
        (user.id, token)
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.expect("request");
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", path, None, token).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        self.request("POST", path, Some(body), token).await
    }

    pub async fn put(&self, path: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request("PUT", path, Some(body), token).await
    }
}

/// Reservation record for direct repository insertion, bypassing the
/// handler-level checks.
pub fn reservation_on(
    flight_id: Uuid,
    seat: &str,
    pnr: &str,
) -> skybook_core::reservation::Reservation {
    use skybook_core::reservation::{Baggage, Bill, Meal, Reservation, ReservationStatus, Seat};

    let now = Utc::now();
    Reservation {
        id: Uuid::new_v4(),
        pnr: pnr.to_string(),
        flight_id,
        user_id: None,
        first_name: "Ada".to_string(),
        last_name: "Byron".to_string(),
        email: "ada@example.com".to_string(),
        passport: "P1234567".to_string(),
        seat: Seat {
            code: seat.to_string(),
            is_premium: false,
        },
        meal: Meal::default(),
        baggage: Baggage::default(),
        bill: Bill {
            base_fare: 100.0,
            total: 100.0,
        },
        status: ReservationStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

/// Minimal valid booking body for the given flight.
pub fn booking_body(flight_id: Uuid, seat: &str) -> Value {
    serde_json::json!({
        "first_name": "Ada",
        "last_name": "Byron",
        "email": "ada@example.com",
        "passport": "P1234567",
        "seat": seat,
        "flight_id": flight_id,
    })
}
