use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::middleware::AuthContext;
use crate::state::AppState;
use skybook_core::repository::StoreError;
use skybook_core::user::{Role, User};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterRequest {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    confirm_password: String,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    user_id: Uuid,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateUserRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
    confirm_new_password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register).get(list_users))
        .route("/users/change-password", post(change_password))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if [
        &req.first_name,
        &req.last_name,
        &req.email,
        &req.password,
        &req.confirm_password,
    ]
    .iter()
    .any(|f| f.trim().is_empty())
    {
        return Err(ApiError::Validation(
            "Please fill in all fields".to_string(),
        ));
    }

    if req.password != req.confirm_password {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let user = User {
        id: Uuid::new_v4(),
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password_hash: hash_password(&req.password)?,
        role: Role::User,
        created_at: Utc::now(),
    };

    match state.users.insert(&user).await {
        Ok(()) => {}
        // Concurrent signup with the same email
        Err(StoreError::UniqueViolation(_)) => {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    info!("Account created: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            message: "Account created successfully!".to_string(),
        }),
    ))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    ctx.require_admin()?;

    let role = match query.role.as_deref() {
        None => None,
        Some("Admin") => Some(Role::Admin),
        Some("User") => Some(Role::User),
        Some(other) => {
            return Err(ApiError::Validation(format!("Unknown role: {}", other)));
        }
    };

    let users = state.users.list(role).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    ctx.require_admin()?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found with ID: {}", id)))?;

    Ok(Json(user))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    ctx.require_admin()?;

    let mut user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found with ID: {}", id)))?;

    if let Some(first_name) = req.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name;
    }
    if let Some(email) = req.email {
        user.email = email;
    }
    if let Some(role) = req.role {
        user.role = Role::parse(&role);
    }

    match state.users.update(&user).await {
        Ok(()) => {}
        Err(StoreError::UniqueViolation(_)) => {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.require_admin()?;

    if !state.users.delete(id).await? {
        return Err(ApiError::NotFound(format!(
            "User not found with ID: {}",
            id
        )));
    }

    info!("User deleted: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn change_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let current = ctx.require_user()?;

    if [
        &req.current_password,
        &req.new_password,
        &req.confirm_new_password,
    ]
    .iter()
    .any(|f| f.is_empty())
    {
        return Err(ApiError::Validation(
            "All password fields are required.".to_string(),
        ));
    }

    if req.new_password != req.confirm_new_password {
        return Err(ApiError::Validation(
            "New passwords do not match.".to_string(),
        ));
    }

    if req.new_password.len() < 6 {
        return Err(ApiError::Validation(
            "New password must be at least 6 characters long.".to_string(),
        ));
    }

    let user = state
        .users
        .find_by_id(current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(ApiError::Authentication(
            "Invalid current password.".to_string(),
        ));
    }

    let new_hash = hash_password(&req.new_password)?;
    state.users.set_password_hash(user.id, &new_hash).await?;
    info!("Password changed for user: {}", user.email);

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password successfully changed."
    })))
}
