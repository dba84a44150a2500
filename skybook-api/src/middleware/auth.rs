use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use skybook_core::user::Role;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// The verified caller, when a token was supplied.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Request-scoped caller identity. None means an anonymous caller; guest
/// bookings are allowed, so most routes accept that and decide per handler.
#[derive(Debug, Clone)]
pub struct AuthContext(pub Option<CurrentUser>);

/// Decodes the bearer token when present and injects an `AuthContext` into
/// request extensions. A missing header is an anonymous caller; a present
/// but invalid token is rejected.
pub async fn auth_context_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let context = match auth_header {
        None => AuthContext(None),
        Some(header) => {
            let token = header
                .strip_prefix("Bearer ")
                .ok_or(StatusCode::UNAUTHORIZED)?;

            let token_data = decode::<Claims>(
                token,
                &DecodingKey::from_secret(state.auth.secret.as_bytes()),
                &Validation::default(),
            )
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

            let claims = token_data.claims;
            let id = Uuid::parse_str(&claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)?;

            AuthContext(Some(CurrentUser {
                id,
                email: claims.email,
                role: Role::parse(&claims.role),
            }))
        }
    };

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

impl AuthContext {
    pub fn require_user(&self) -> Result<&CurrentUser, ApiError> {
        self.0
            .as_ref()
            .ok_or_else(|| ApiError::Authentication("Authentication required".to_string()))
    }

    pub fn require_admin(&self) -> Result<&CurrentUser, ApiError> {
        let user = self.require_user()?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(user)
    }
}
