//! Authentication middleware

use crate::api::handlers::AppState;
use crate::auth::cookies::TOKEN_COOKIE;
use crate::auth::jwt::{validate_token, Claims};
use crate::core::error::{BackendError, Result};
use crate::db::models::Captain;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

/// Authenticated captain attached to the request by [`authenticate`]
#[derive(Clone, Debug)]
pub struct AuthCaptain {
    pub captain: Captain,
    /// The raw token the request was authenticated with
    pub token: String,
    pub claims: Claims,
}

/// Extract the bearer token from a request
///
/// The `token` cookie is checked first; an empty cookie counts as absent.
/// Falls back to `Authorization: Bearer <token>`, with the scheme matched
/// case-insensitively.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    let from_cookie = jar
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.trim().split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, t)| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Resolve the captain a request is acting as
///
/// Each failure is terminal and maps to 401; infrastructure failures keep their own status.
pub async fn resolve_captain(state: &AppState, headers: &HeaderMap) -> Result<AuthCaptain> {
    let token = extract_token(headers)
        .ok_or_else(|| BackendError::AuthenticationError("Missing authentication token".to_string()))?;

    let claims = validate_token(&token, &state.auth.jwt_secret)?;

    if state.blacklist.contains(&token).await? {
        return Err(BackendError::AuthenticationError("Token has been revoked".to_string()));
    }

    let captain = state
        .captain_service
        .find_by_id(&claims.captain_id)
        .await?
        .ok_or_else(|| BackendError::AuthenticationError("Captain not found".to_string()))?;

    Ok(AuthCaptain {
        captain,
        token,
        claims,
    })
}

/// Authentication middleware for captain routes
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = resolve_captain(&state, request.headers()).await;
    match resolved {
        Ok(auth) => {
            tracing::debug!(captain_id = %auth.captain.id, "Request authenticated");
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthCaptain
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthCaptain>()
            .cloned()
            .ok_or_else(|| BackendError::AuthenticationError("Captain not authenticated".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::generate_token;
    use crate::core::blacklist_pruner::prune_once;
    use crate::core::config::test_config;
    use crate::db::manager::DatabaseManager;
    use crate::db::models::{Fullname, NewCaptain, Vehicle, VehicleType};
    use axum::http::{HeaderValue, StatusCode};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::sync::Arc;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_extract_from_bearer_header() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&map).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_from_cookie() {
        let map = headers(&[(header::COOKIE, "theme=dark; token=from-cookie")]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_cookie_takes_precedence_over_header() {
        let map = headers(&[
            (header::COOKIE, "token=from-cookie"),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_empty_cookie_falls_back_to_header() {
        let map = headers(&[
            (header::COOKIE, "token="),
            (header::AUTHORIZATION, "Bearer from-header"),
        ]);
        assert_eq!(extract_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_bearer_scheme_case_insensitive() {
        let lower = headers(&[(header::AUTHORIZATION, "bearer abc.def.ghi")]);
        assert_eq!(extract_token(&lower).as_deref(), Some("abc.def.ghi"));

        let spaced = headers(&[(header::AUTHORIZATION, "BEARER   abc.def.ghi")]);
        assert_eq!(extract_token(&spaced).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_or_malformed() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let basic = headers(&[(header::AUTHORIZATION, "Basic dGVzdDp0ZXN0")]);
        assert_eq!(extract_token(&basic), None);

        let empty = headers(&[(header::AUTHORIZATION, "Bearer ")]);
        assert_eq!(extract_token(&empty), None);
    }

    fn test_state() -> AppState {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        AppState::new(&test_config().auth, db)
    }

    async fn registered_captain(state: &AppState) -> Captain {
        let new = NewCaptain {
            fullname: Fullname {
                firstname: "A".to_string(),
                lastname: None,
            },
            email: "a@b.com".to_string(),
            vehicle: Vehicle {
                color: "red".to_string(),
                plate: "XY1".to_string(),
                capacity: 4,
                vehicle_type: VehicleType::Car,
            },
        };
        state
            .captain_service
            .create_captain(new, "hash".to_string())
            .await
            .unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let value = format!("Bearer {}", token);
        headers(&[(header::AUTHORIZATION, value.as_str())])
    }

    #[tokio::test]
    async fn test_resolves_live_token() {
        let state = test_state();
        let captain = registered_captain(&state).await;
        let token = generate_token(&captain.id, &state.auth.jwt_secret, 60).unwrap();

        let auth = resolve_captain(&state, &bearer(&token)).await.unwrap();
        assert_eq!(auth.captain.id, captain.id);
        assert_eq!(auth.token, token);
    }

    #[tokio::test]
    async fn test_unknown_captain_rejected() {
        let state = test_state();
        let token = generate_token("no-such-captain", &state.auth.jwt_secret, 60).unwrap();

        let err = resolve_captain(&state, &bearer(&token)).await.unwrap_err();
        assert!(matches!(err, BackendError::AuthenticationError(_)));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_revoked_token_stays_rejected_after_pruning() {
        let state = test_state();
        let captain = registered_captain(&state).await;

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            captain_id: captain.id.clone(),
            jti: "revoked".to_string(),
            iat: (now - 3600) as usize,
            exp: (now - 10) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(state.auth.jwt_secret.as_bytes()),
        )
        .unwrap();

        state.blacklist.add(&token, now - 10).await.unwrap();
        assert!(resolve_captain(&state, &bearer(&token)).await.is_err());

        assert_eq!(prune_once(state.blacklist.as_ref()).await.unwrap(), 1);
        let err = resolve_captain(&state, &bearer(&token)).await.unwrap_err();
        assert!(matches!(err, BackendError::AuthenticationError(_)));
    }
}
