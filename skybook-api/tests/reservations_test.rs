mod common;

use axum::http::StatusCode;
use common::{booking_body, spawn, spawn_with_rules};
use skybook_core::user::Role;
use skybook_core::FareRules;
use uuid::Uuid;

#[tokio::test]
async fn booking_a_premium_seat_snapshots_the_fare() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (status, body) = app
        .post("/reservations", booking_body(flight_id, "3A"), None)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["seat"]["code"], "3A");
    assert_eq!(body["seat"]["is_premium"], true);
    assert_eq!(body["bill"]["base_fare"], 100.0);
    assert_eq!(body["bill"]["total"], 100.0);
    assert_eq!(body["status"], "active");
    assert!(body["user_id"].is_null(), "guest booking has no owner");
    assert_eq!(body["pnr"].as_str().unwrap().len(), 6);
}

#[tokio::test]
async fn non_premium_rows_and_rowless_codes() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (_, body) = app
        .post("/reservations", booking_body(flight_id, "12C"), None)
        .await;
    assert_eq!(body["seat"]["is_premium"], false);

    let (status, body) = app
        .post("/reservations", booking_body(flight_id, "XX"), None)
        .await;
    // Rowless codes are row 0: accepted, never premium
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["seat"]["is_premium"], false);
}

#[tokio::test]
async fn double_booking_a_seat_is_rejected_with_the_seat_named() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (status, _) = app
        .post("/reservations", booking_body(flight_id, "3A"), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post("/reservations", booking_body(flight_id, "3A"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("3A"), "message names the seat: {message}");
    assert!(message.contains("already booked"));
}

#[tokio::test]
async fn cancelling_frees_the_seat_for_rebooking() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;
    let (_, token) = app.create_user("ada@example.com", "hunter22", Role::User).await;

    let (_, body) = app
        .post("/reservations", booking_body(flight_id, "3A"), None)
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &format!("/reservations/{id}/cancel"),
            serde_json::json!({}),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (status, _) = app
        .post("/reservations", booking_body(flight_id, "3A"), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn cancel_requires_auth_and_tolerates_unknown_ids() {
    let app = spawn().await;
    let (_, token) = app.create_user("ada@example.com", "hunter22", Role::User).await;

    let unknown = Uuid::new_v4();
    let (status, _) = app
        .post(
            &format!("/reservations/{unknown}/cancel"),
            serde_json::json!({}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Idempotent no-op on a missing id
    let (status, _) = app
        .post(
            &format!("/reservations/{unknown}/cancel"),
            serde_json::json!({}),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn meal_update_charges_the_increase_and_clamps_the_decrease() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (_, body) = app
        .post("/reservations", booking_body(flight_id, "5D"), None)
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    // {None, 0} -> {Premium Meal, 20}: due 20
    let (status, body) = app
        .put(
            &format!("/reservations/{id}"),
            serde_json::json!({ "meal_option": { "label": "Premium Meal", "price": 20 } }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount_due"], 20.0);
    assert_eq!(body["updated_reservation"]["bill"]["total"], 120.0);

    // back to {None, 0}: total drops but nothing is due
    let (status, body) = app
        .put(
            &format!("/reservations/{id}"),
            serde_json::json!({ "meal_option": { "label": "None", "price": 0 } }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount_due"], 0.0);
    assert_eq!(body["updated_reservation"]["bill"]["total"], 100.0);
}

#[tokio::test]
async fn partial_update_keeps_omitted_fields() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let mut body = booking_body(flight_id, "5D");
    body["meal_option"] = serde_json::json!({ "label": "Vegan", "price": 15 });
    body["baggage"] = serde_json::json!(18);
    let (_, created) = app.post("/reservations", body, None).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(
            &format!("/reservations/{id}"),
            serde_json::json!({ "seat": "7F" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["updated_reservation"];
    assert_eq!(updated["seat"]["code"], "7F");
    assert_eq!(updated["meal"]["label"], "Vegan");
    assert_eq!(updated["baggage"]["kg"], 18);
    assert_eq!(updated["bill"]["total"], 115.0);
}

#[tokio::test]
async fn seat_change_onto_an_occupied_seat_is_rejected() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (_, first) = app
        .post("/reservations", booking_body(flight_id, "3A"), None)
        .await;
    let (_, second) = app
        .post("/reservations", booking_body(flight_id, "5D"), None)
        .await;
    let second_id = second["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(
            &format!("/reservations/{second_id}"),
            serde_json::json!({ "seat": "3A" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("3A"));

    // Keeping your own seat is not a conflict
    let first_id = first["id"].as_str().unwrap().to_string();
    let (status, body) = app
        .put(
            &format!("/reservations/{first_id}"),
            serde_json::json!({ "seat": "3A" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_reservation"]["seat"]["code"], "3A");
}

#[tokio::test]
async fn seat_change_updates_the_premium_flag() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (_, created) = app
        .post("/reservations", booking_body(flight_id, "12C"), None)
        .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["seat"]["is_premium"], false);

    let (_, body) = app
        .put(
            &format!("/reservations/{id}"),
            serde_json::json!({ "seat": "2B" }),
            None,
        )
        .await;
    assert_eq!(body["updated_reservation"]["seat"]["is_premium"], true);
}

#[tokio::test]
async fn departed_flight_rejects_create_and_update_alike() {
    let app = spawn().await;
    let departed_id = app.seed_flight("SB102", -1, 100.0).await;

    let (status, body) = app
        .post("/reservations", booking_body(departed_id, "3A"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already departed"));

    // Booking form for a departed flight is closed too
    let (status, _) = app.get("/reservations/book/SB102", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A reservation booked before departure cannot be edited after it:
    // insert one through the repository and update over HTTP.
    let existing = common::reservation_on(departed_id, "5D", "ZZZ999");
    app.state.reservations.insert(&existing).await.unwrap();

    let (status, body) = app
        .put(
            &format!("/reservations/{}", existing.id),
            serde_json::json!({ "baggage": 10 }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already departed"));
}

#[tokio::test]
async fn missing_fields_and_unknown_flight() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let mut body = booking_body(flight_id, "3A");
    body["first_name"] = serde_json::json!("  ");
    let (status, body) = app.post("/reservations", body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Missing required"));

    // Fields absent from the body entirely are the same failure
    let (status, _) = app
        .post(
            "/reservations",
            serde_json::json!({ "first_name": "Ada" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/reservations", booking_body(Uuid::new_v4(), "3A"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_form_lists_occupied_seats() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    app.post("/reservations", booking_body(flight_id, "3A"), None)
        .await;
    app.post("/reservations", booking_body(flight_id, "5D"), None)
        .await;

    let (status, body) = app.get("/reservations/book/SB101", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flight"]["flight_number"], "SB101");
    let seats: Vec<&str> = body["occupied_seats"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert_eq!(seats, vec!["3A", "5D"]);

    let (status, _) = app.get("/reservations/book/SB999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_context_excludes_own_seat() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (_, mine) = app
        .post("/reservations", booking_body(flight_id, "3A"), None)
        .await;
    app.post("/reservations", booking_body(flight_id, "5D"), None)
        .await;
    let id = mine["id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/reservations/{id}/edit"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reservation"]["seat"]["code"], "3A");
    assert_eq!(body["flight"]["flight_number"], "SB101");
    let seats: Vec<&str> = body["occupied_seats"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();
    assert_eq!(seats, vec!["5D"]);
}

#[tokio::test]
async fn listing_is_scoped_to_the_caller() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (_, ada) = app.create_user("ada@example.com", "hunter22", Role::User).await;
    let (_, grace) = app
        .create_user("grace@example.com", "hunter22", Role::User)
        .await;
    let (_, admin) = app
        .create_user("admin@example.com", "hunter22", Role::Admin)
        .await;

    app.post("/reservations", booking_body(flight_id, "3A"), Some(&ada))
        .await;
    app.post("/reservations", booking_body(flight_id, "5D"), None)
        .await;

    let (status, body) = app.get("/reservations", Some(&ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["reservation"]["seat"]["code"], "3A");
    assert_eq!(body[0]["flight"]["flight_number"], "SB101");

    let (_, body) = app.get("/reservations", Some(&grace)).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Admin sees everything, guest bookings included
    let (_, body) = app.get("/reservations", Some(&admin)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = app.get("/reservations", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn detail_and_admin_user_listing() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let (ada_id, ada) = app.create_user("ada@example.com", "hunter22", Role::User).await;
    let (_, admin) = app
        .create_user("admin@example.com", "hunter22", Role::Admin)
        .await;

    let (_, created) = app
        .post("/reservations", booking_body(flight_id, "3A"), Some(&ada))
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/reservations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reservation"]["pnr"], created["pnr"]);
    assert_eq!(body["flight"]["flight_number"], "SB101");

    let (status, _) = app
        .get(&format!("/reservations/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let path = format!("/reservations/users/{ada_id}/reservations");
    let (status, body) = app.get(&path, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reservations"].as_array().unwrap().len(), 1);

    // Ordinary callers are shut out of the admin view
    let (status, _) = app.get(&path, Some(&ada)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .get(
            &format!("/reservations/users/{}/reservations", Uuid::new_v4()),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lenient_baggage_parsing_reaches_the_stored_record() {
    let app = spawn().await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let mut body = booking_body(flight_id, "5D");
    body["baggage"] = serde_json::json!("not-a-number");
    let (status, created) = app.post("/reservations", body, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["baggage"]["kg"], 0);
}

#[tokio::test]
async fn excess_baggage_fee_applies_when_configured() {
    let rules = FareRules {
        excess_baggage_fee_per_kg: 5.0,
        ..FareRules::default()
    };
    let app = spawn_with_rules(rules).await;
    let flight_id = app.seed_flight("SB101", 48, 100.0).await;

    let mut body = booking_body(flight_id, "5D");
    body["baggage"] = serde_json::json!(25); // 5 kg over the allowance
    let (_, created) = app.post("/reservations", body, None).await;
    assert_eq!(created["bill"]["total"], 125.0);

    let id = created["id"].as_str().unwrap().to_string();
    let (_, body) = app
        .put(
            &format!("/reservations/{id}"),
            serde_json::json!({ "baggage": 30 }),
            None,
        )
        .await;
    assert_eq!(body["amount_due"], 25.0);
    assert_eq!(body["updated_reservation"]["bill"]["total"], 150.0);
}
