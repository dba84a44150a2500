use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthContext;
use crate::state::AppState;
use skybook_core::repository::StoreError;
use skybook_core::reservation::{
    Bill, CreateReservationRequest, Reservation, ReservationStatus, Seat,
    UpdateReservationRequest,
};
use skybook_core::Flight;

#[derive(Debug, Serialize)]
struct BookingFormContext {
    flight: Flight,
    occupied_seats: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EditContext {
    reservation: Reservation,
    flight: Flight,
    occupied_seats: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReservationDetail {
    reservation: Reservation,
    flight: Flight,
}

#[derive(Debug, Serialize)]
struct UpdateResponse {
    success: bool,
    updated_reservation: Reservation,
    amount_due: f64,
}

#[derive(Debug, Serialize)]
struct UserReservationsResponse {
    user_id: Uuid,
    full_name: String,
    reservations: Vec<ReservationDetail>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            post(create_reservation).get(list_reservations),
        )
        .route("/reservations/book/{flight_number}", get(booking_form))
        .route(
            "/reservations/{id}",
            get(reservation_details).put(update_reservation),
        )
        .route("/reservations/{id}/edit", get(edit_context))
        .route("/reservations/{id}/cancel", post(cancel_reservation))
        .route(
            "/reservations/users/{user_id}/reservations",
            get(user_reservations_admin),
        )
}

fn seat_conflict(seat: &str) -> ApiError {
    ApiError::Validation(format!("Seat {} is already booked.", seat))
}

// --- Booking form context ---

async fn booking_form(
    State(state): State<AppState>,
    Path(flight_number): Path<String>,
) -> Result<Json<BookingFormContext>, ApiError> {
    let flight = state
        .flights
        .find_by_number(&flight_number)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flight not found".to_string()))?;

    if flight.has_departed(Utc::now()) {
        return Err(ApiError::Validation(
            "Booking is closed: This flight has already departed or is scheduled for a past date."
                .to_string(),
        ));
    }

    let occupied_seats = state.reservations.occupied_seats(flight.id, None).await?;

    Ok(Json(BookingFormContext {
        flight,
        occupied_seats,
    }))
}

// --- Create ---

async fn create_reservation(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    // 1. Required fields
    if req.missing_required_fields() {
        return Err(ApiError::Validation("Missing required fields.".to_string()));
    }
    let flight_id = req
        .flight_id
        .ok_or_else(|| ApiError::Validation("Missing required fields.".to_string()))?;

    // 2. Flight must exist and still be bookable
    let flight = state
        .flights
        .find_by_id(flight_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flight not found.".to_string()))?;

    if flight.has_departed(Utc::now()) {
        return Err(ApiError::Validation(
            "Booking failed: This flight has already departed.".to_string(),
        ));
    }

    // 3. Fast-path seat check; the partial unique index is the backstop
    if state
        .reservations
        .seat_taken(flight.id, &req.seat, None)
        .await?
    {
        return Err(seat_conflict(&req.seat));
    }

    // 4. Fresh booking reference, retried against the store
    let pnr = unique_pnr(&state).await?;

    let now = Utc::now();
    let meal = req.meal_option.map(|m| m.into_meal()).unwrap_or_default();
    let total = state
        .fare_rules
        .total(flight.price, meal.price, req.baggage);

    let reservation = Reservation {
        id: Uuid::new_v4(),
        pnr,
        flight_id: flight.id,
        user_id: ctx.0.as_ref().map(|u| u.id),
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        passport: req.passport,
        seat: Seat {
            is_premium: state.fare_rules.is_premium(&req.seat),
            code: req.seat,
        },
        meal,
        baggage: skybook_core::reservation::Baggage { kg: req.baggage },
        bill: Bill {
            base_fare: flight.price,
            total,
        },
        status: ReservationStatus::Active,
        created_at: now,
        updated_at: now,
    };

    // 5. Persist; a losing race surfaces here as a unique violation
    match state.reservations.insert(&reservation).await {
        Ok(()) => {}
        Err(StoreError::UniqueViolation(_)) => {
            return Err(ApiError::Validation(format!(
                "Seat {} is already booked. Please choose another seat.",
                reservation.seat.code
            )));
        }
        Err(e) => return Err(e.into()),
    }

    info!(
        "Reservation created: {} seat {} flight {}",
        reservation.pnr, reservation.seat.code, flight.flight_number
    );

    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn unique_pnr(state: &AppState) -> Result<String, ApiError> {
    for _ in 0..5 {
        let candidate = state.pnr.generate();
        if !state.reservations.pnr_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(ApiError::Internal(
        "Could not allocate a unique booking reference".to_string(),
    ))
}

// --- Edit context ---

async fn edit_context(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EditContext>, ApiError> {
    let reservation = state
        .reservations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;

    let flight = lookup_flight(&state, &reservation).await?;

    let occupied_seats = state
        .reservations
        .occupied_seats(reservation.flight_id, Some(reservation.id))
        .await?;

    Ok(Json(EditContext {
        reservation,
        flight,
        occupied_seats,
    }))
}

// --- Update ---

async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReservationRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    // 1. Load
    let mut reservation = state
        .reservations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;

    // 2. Same temporal rule as creation: no edits once the flight has left
    let flight = lookup_flight(&state, &reservation).await?;
    if flight.has_departed(Utc::now()) {
        return Err(ApiError::Validation(
            "Update failed: This flight has already departed.".to_string(),
        ));
    }

    // 3. Seat move needs a conflict check excluding this reservation
    if let Some(seat) = &req.seat {
        if *seat != reservation.seat.code
            && state
                .reservations
                .seat_taken(reservation.flight_id, seat, Some(reservation.id))
                .await?
        {
            return Err(seat_conflict(seat));
        }
    }

    let old_total = reservation.bill.total;

    // 4. Apply only what was supplied
    if let Some(seat) = req.seat {
        reservation.seat.is_premium = state.fare_rules.is_premium(&seat);
        reservation.seat.code = seat;
    }
    if let Some(meal) = req.meal_option {
        reservation.meal = meal.into_meal();
    }
    if let Some(kg) = req.baggage {
        reservation.baggage.kg = kg;
    }

    reservation.bill.total = state.fare_rules.total(
        reservation.bill.base_fare,
        reservation.meal.price,
        reservation.baggage.kg,
    );
    reservation.updated_at = Utc::now();

    // 5. Persist; seat races on the index surface as unique violations
    match state.reservations.update(&reservation).await {
        Ok(()) => {}
        Err(StoreError::UniqueViolation(_)) => {
            return Err(seat_conflict(&reservation.seat.code));
        }
        Err(e) => return Err(e.into()),
    }

    let amount_due = skybook_core::billing::amount_due(old_total, reservation.bill.total);
    info!(
        "Reservation updated: {} amount due {:.2}",
        reservation.pnr, amount_due
    );

    Ok(Json(UpdateResponse {
        success: true,
        updated_reservation: reservation,
        amount_due,
    }))
}

// --- Listing ---

async fn list_reservations(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<ReservationDetail>>, ApiError> {
    let user = ctx.require_user()?;

    let reservations = if user.role == skybook_core::Role::Admin {
        state.reservations.list_all().await?
    } else {
        state.reservations.list_for_user(user.id).await?
    };

    Ok(Json(join_flights(&state, reservations).await?))
}

async fn reservation_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationDetail>, ApiError> {
    let reservation = state
        .reservations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;

    let flight = lookup_flight(&state, &reservation).await?;

    Ok(Json(ReservationDetail {
        reservation,
        flight,
    }))
}

async fn user_reservations_admin(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserReservationsResponse>, ApiError> {
    ctx.require_admin()?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let reservations = state.reservations.list_for_user(user.id).await?;

    Ok(Json(UserReservationsResponse {
        user_id: user.id,
        full_name: user.full_name(),
        reservations: join_flights(&state, reservations).await?,
    }))
}

// --- Cancel ---

async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    ctx.require_user()?;

    // Idempotent: cancelling an unknown or already-cancelled id is a no-op
    state.reservations.cancel(id).await?;
    info!("Reservation cancelled: {}", id);

    Ok(Redirect::to("/reservations"))
}

// --- Helpers ---

async fn lookup_flight(
    state: &AppState,
    reservation: &Reservation,
) -> Result<Flight, ApiError> {
    state
        .flights
        .find_by_id(reservation.flight_id)
        .await?
        .ok_or_else(|| {
            ApiError::Internal(format!(
                "Reservation {} references missing flight {}",
                reservation.id, reservation.flight_id
            ))
        })
}

async fn join_flights(
    state: &AppState,
    reservations: Vec<Reservation>,
) -> Result<Vec<ReservationDetail>, ApiError> {
    let mut out = Vec::with_capacity(reservations.len());
    for reservation in reservations {
        let flight = lookup_flight(state, &reservation).await?;
        out.push(ReservationDetail {
            reservation,
            flight,
        });
    }
    Ok(out)
}
