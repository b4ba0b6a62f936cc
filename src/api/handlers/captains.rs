use crate::api::models::{AuthResponse, LoginRequest, MessageResponse, ProfileResponse, RegisterRequest};
use crate::auth::cookies::{clear_session_cookie, session_cookie};
use crate::auth::jwt::generate_token;
use crate::auth::middleware::AuthCaptain;
use crate::auth::password::hash_password;
use crate::core::error::{BackendError, Result};
use crate::db::repository::DUPLICATE_EMAIL_MESSAGE;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;
use super::AppState;

fn json_body(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| BackendError::InvalidRequest(rejection.body_text()))
}

/// Handler for POST /captains/register - Captain registration
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let req = RegisterRequest::from_body(&json_body(body)?)?;

    if state.captain_service.email_taken(&req.captain.email).await? {
        tracing::info!("Registration rejected: email already registered");
        return Err(BackendError::DuplicateResource(DUPLICATE_EMAIL_MESSAGE.to_string()));
    }

    let password_hash = hash_password(&req.password, state.auth.bcrypt_cost).await?;
    let captain = state
        .captain_service
        .create_captain(req.captain, password_hash)
        .await?;
    let token = generate_token(&captain.id, &state.auth.jwt_secret, state.auth.token_ttl)?;

    tracing::info!(captain_id = %captain.id, "Captain registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, captain })))
}

/// Handler for POST /captains/login - Captain login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let req = LoginRequest::from_body(&json_body(body)?)?;

    let captain = state
        .captain_service
        .authenticate(&req.email, &req.password)
        .await?;
    let token = generate_token(&captain.id, &state.auth.jwt_secret, state.auth.token_ttl)?;

    tracing::info!(captain_id = %captain.id, "Login successful");

    let jar = jar.add(session_cookie(&token, state.auth.token_ttl, state.auth.cookie_secure));
    Ok((jar, Json(AuthResponse { token, captain })))
}

/// Handler for GET /captains/profile - Authenticated captain's record
pub async fn get_profile(auth: AuthCaptain) -> Result<Json<ProfileResponse>> {
    tracing::debug!(captain_id = %auth.captain.id, "Fetching captain profile");

    Ok(Json(ProfileResponse {
        captain: auth.captain,
    }))
}

/// Handler for GET /captains/logout - Revoke the presented token
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthCaptain,
    jar: CookieJar,
) -> Result<impl IntoResponse> {
    let expires_at = i64::try_from(auth.claims.exp).unwrap_or(i64::MAX);
    state.blacklist.add(&auth.token, expires_at).await?;

    tracing::info!(captain_id = %auth.captain.id, "Captain logged out");

    Ok((
        jar.add(clear_session_cookie(state.auth.cookie_secure)),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}
