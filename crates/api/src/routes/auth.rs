//! Authentication route handlers.
//!
//! Both endpoints return a signed bearer token with the user's roles baked
//! in as claims; clients present it on every authenticated request.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use clementine_core::Role;

use crate::error::Result;
use crate::models::user::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication payload.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPayload,
}

/// User shape returned by auth endpoints.
#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
}

impl AuthResponse {
    fn new(token: String, user: &User, roles: &[Role]) -> Self {
        Self {
            token,
            user: UserPayload {
                id: user.id.as_i32(),
                email: user.email.as_str().to_owned(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                roles: roles.iter().map(|r| r.as_str().to_owned()).collect(),
            },
        }
    }
}

/// POST /api/auth/register
///
/// Creates the user with the default role and immediately issues a token.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let (user, roles) = auth
        .register(&req.email, &req.password, &req.first_name, &req.last_name)
        .await?;

    let token = state.token_issuer().issue(&user, &roles)?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(token, &user, &roles)),
    ))
}

/// POST /api/auth/login
///
/// Issues a token carrying all roles assigned at this moment; a later role
/// change takes effect only on re-login.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let (user, roles) = auth.login(&req.email, &req.password).await?;

    let token = state.token_issuer().issue(&user, &roles)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse::new(token, &user, &roles)))
}
