/**
 * Authentication Routes
 * Registration, login, token refresh, logout and session lookup
 */
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::session::{
    normalize_username, validate_username, LoginRequest, RegisterRequest, Session, TokenPair,
};
use crate::state::SharedState;
use crate::store::ProfileStore;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub user: Session,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Session,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AvailabilityResponse {
    pub username: String,
    pub available: bool,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let (user, tokens) = state
        .sessions
        .register(state.store.as_ref(), payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user,
            tokens,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, tokens) = state.sessions.login(state.store.as_ref(), payload).await?;
    Ok(Json(AuthResponse {
        success: true,
        user,
        tokens,
    }))
}

/// POST /api/auth/refresh
/// Rotates the refresh token and mints a new access token.
pub async fn refresh(
    State(state): State<SharedState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, tokens) = state.sessions.refresh(&payload.refresh_token).await?;
    Ok(Json(AuthResponse {
        success: true,
        user,
        tokens,
    }))
}

/// POST /api/auth/logout
/// Always succeeds. A valid access token revokes every refresh token of its owner.
pub async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Option<Json<LogoutRequest>>,
) -> Json<LogoutResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    if let Some(refresh_token) = payload.refresh_token {
        state.sessions.revoke(&refresh_token).await;
    }

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    if let Some(access_token) = payload.access_token.or(bearer) {
        if let Ok(session) = state.sessions.verify_access_token(&access_token) {
            state.sessions.revoke_all(&session.uid).await;
            tracing::info!(uid = %session.uid, "signed out");
        }
    }

    Json(LogoutResponse { success: true })
}

/// GET /api/auth/session
pub async fn current_session(session: Session) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: true,
        user: session,
    })
}

/// GET /api/users/available/{username}
pub async fn username_available(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> AppResult<Json<AvailabilityResponse>> {
    let username = normalize_username(&username);
    validate_username(&username)?;
    let available = state.store.is_username_available(&username).await?;
    Ok(Json(AvailabilityResponse {
        username,
        available,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{get_request, json_request, register, send, test_app};
    use serde_json::json;

    #[tokio::test]
    async fn test_register_returns_tokens_and_takes_username() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;
        assert!(!tokens.access_token.is_empty());
        assert_eq!(tokens.refresh_token.len(), 64);

        let (status, bytes) = send(&t.app, get_request("/api/users/available/ADA", None)).await;
        assert_eq!(status, StatusCode::OK);
        let body: AvailabilityResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.username, "ada");
        assert!(!body.available);

        let (_, bytes) = send(&t.app, get_request("/api/users/available/grace", None)).await;
        let body: AvailabilityResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.available);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let t = test_app();
        register(&t.app, "ada").await;
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/auth/register",
                None,
                &json!({ "email": "other@example.com", "password": "correct horse", "username": "Ada" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_short_password_returns_bad_request() {
        let t = test_app();
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/auth/register",
                None,
                &json!({ "email": "ada@example.com", "password": "short", "username": "ada" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_empty_email_returns_bad_request() {
        let t = test_app();
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                &json!({ "email": "", "password": "whatever" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_returns_unauthorized() {
        let t = test_app();
        register(&t.app, "ada").await;
        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                &json!({ "email": "ada@example.com", "password": "wrong password" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, bytes) = send(
            &t.app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                &json!({ "email": "ADA@example.com", "password": "correct horse" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: AuthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.user.username, "ada");
    }

    #[tokio::test]
    async fn test_session_requires_bearer_token() {
        let t = test_app();
        let (status, _) = send(&t.app, get_request("/api/auth/session", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&t.app, get_request("/api/auth/session", Some("garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let tokens = register(&t.app, "ada").await;
        let (status, bytes) = send(
            &t.app,
            get_request("/api/auth/session", Some(&tokens.access_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: SessionResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.authenticated);
        assert_eq!(body.user.username, "ada");
    }

    #[tokio::test]
    async fn test_refresh_then_logout_revokes() {
        let t = test_app();
        let tokens = register(&t.app, "ada").await;

        let (status, bytes) = send(
            &t.app,
            json_request(
                "POST",
                "/api/auth/refresh",
                None,
                &json!({ "refreshToken": tokens.refresh_token }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rotated: AuthResponse = serde_json::from_slice(&bytes).unwrap();

        let (status, bytes) = send(
            &t.app,
            json_request(
                "POST",
                "/api/auth/logout",
                Some(&rotated.tokens.access_token),
                &json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: LogoutResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.success);

        let (status, _) = send(
            &t.app,
            json_request(
                "POST",
                "/api/auth/refresh",
                None,
                &json!({ "refreshToken": rotated.tokens.refresh_token }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_username_check_is_bad_request() {
        let t = test_app();
        let (status, _) = send(
            &t.app,
            get_request("/api/users/available/not_valid", None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
