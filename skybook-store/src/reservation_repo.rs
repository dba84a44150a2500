use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use skybook_core::repository::{ReservationRepository, StoreError, StoreResult};
use skybook_core::reservation::{Baggage, Bill, Meal, Reservation, ReservationStatus, Seat};

use crate::map_sqlx_err;

pub struct SqliteReservationRepository {
    pool: Pool<Sqlite>,
}

impl SqliteReservationRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

// Flat row shape for the nested reservation document.
#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    pnr: String,
    flight_id: Uuid,
    user_id: Option<Uuid>,
    first_name: String,
    last_name: String,
    email: String,
    passport: String,
    seat_code: String,
    seat_is_premium: bool,
    meal_label: String,
    meal_price: f64,
    baggage_kg: i64,
    base_fare: f64,
    bill_total: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReservationRow {
    fn into_domain(self) -> Reservation {
        let status = if self.status == "cancelled" {
            ReservationStatus::Cancelled
        } else {
            ReservationStatus::Active
        };

        Reservation {
            id: self.id,
            pnr: self.pnr,
            flight_id: self.flight_id,
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            passport: self.passport,
            seat: Seat {
                code: self.seat_code,
                is_premium: self.seat_is_premium,
            },
            meal: Meal {
                label: self.meal_label,
                price: self.meal_price,
            },
            baggage: Baggage {
                kg: self.baggage_kg.max(0) as u32,
            },
            bill: Bill {
                base_fare: self.base_fare,
                total: self.bill_total,
            },
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, pnr, flight_id, user_id, first_name, last_name, email, \
     passport, seat_code, seat_is_premium, meal_label, meal_price, baggage_kg, \
     base_fare, bill_total, status, created_at, updated_at FROM reservations";

#[async_trait]
impl ReservationRepository for SqliteReservationRepository {
    async fn insert(&self, r: &Reservation) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, pnr, flight_id, user_id, first_name, last_name, email, passport,
                 seat_code, seat_is_premium, meal_label, meal_price, baggage_kg,
                 base_fare, bill_total, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(r.id)
        .bind(&r.pnr)
        .bind(r.flight_id)
        .bind(r.user_id)
        .bind(&r.first_name)
        .bind(&r.last_name)
        .bind(&r.email)
        .bind(&r.passport)
        .bind(&r.seat.code)
        .bind(r.seat.is_premium)
        .bind(&r.meal.label)
        .bind(r.meal.price)
        .bind(i64::from(r.baggage.kg))
        .bind(r.bill.base_fare)
        .bind(r.bill.total)
        .bind(r.status.as_str())
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(row.map(ReservationRow::into_domain))
    }

    async fn seat_taken(
        &self,
        flight_id: Uuid,
        seat_code: &str,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM reservations
            WHERE flight_id = $1
              AND seat_code = $2
              AND status <> 'cancelled'
              AND ($3 IS NULL OR id <> $3)
            "#,
        )
        .bind(flight_id)
        .bind(seat_code)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(count > 0)
    }

    async fn occupied_seats(
        &self,
        flight_id: Uuid,
        exclude: Option<Uuid>,
    ) -> StoreResult<Vec<String>> {
        let seats: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT seat_code FROM reservations
            WHERE flight_id = $1
              AND status <> 'cancelled'
              AND ($2 IS NULL OR id <> $2)
            ORDER BY seat_code
            "#,
        )
        .bind(flight_id)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(seats)
    }

    async fn update(&self, r: &Reservation) -> StoreResult<()> {
        // Only the mutable fields; passenger identity, flight, pnr and
        // status never change through this path.
        sqlx::query(
            r#"
            UPDATE reservations SET
                seat_code = $1,
                seat_is_premium = $2,
                meal_label = $3,
                meal_price = $4,
                baggage_kg = $5,
                bill_total = $6,
                updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&r.seat.code)
        .bind(r.seat.is_premium)
        .bind(&r.meal.label)
        .bind(r.meal.price)
        .bind(i64::from(r.baggage.kg))
        .bind(r.bill.total)
        .bind(r.updated_at)
        .bind(r.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn cancel(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "UPDATE reservations SET status = 'cancelled', updated_at = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(rows.into_iter().map(ReservationRow::into_domain).collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<Reservation>> {
        let rows =
            sqlx::query_as::<_, ReservationRow>(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        Ok(rows.into_iter().map(ReservationRow::into_domain).collect())
    }

    async fn pnr_exists(&self, pnr: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE pnr = $1")
            .bind(pnr)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(count > 0)
    }
}
