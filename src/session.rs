/**
 * Session Management
 * Registration, login, JWT access tokens, rotating refresh tokens and the
 * `Session` extractor used by every authenticated handler.
 */
use std::collections::HashMap;

use axum::{extract::FromRequestParts, http::request::Parts};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distr::{Alphanumeric, SampleString};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::state::SharedState;
use crate::store::{CredentialStore, Credentials, ProfileStore, Store};

/// Access token expiry in minutes
const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiry in days
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

const MIN_PASSWORD_LEN: usize = 8;

lazy_static::lazy_static! {
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-z0-9-]+$").unwrap();
}

/// JWT claims. `sub` is the principal uid.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub uid: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
struct RefreshTokenData {
    session: Session,
    expires_at: i64,
    revoked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Lowercases and trims a requested username.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if USERNAME_REGEX.is_match(username) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Username may only contain lowercase letters, numbers and hyphens",
        ))
    }
}

fn generate_refresh_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 64)
}

/// Refresh tokens are kept as SHA-256 digests, never in the clear.
fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issues and checks tokens. Refresh tokens live in memory only, so a
/// restart signs everyone out once their access token lapses.
pub struct SessionManager {
    secret: String,
    bcrypt_cost: u32,
    refresh_tokens: RwLock<HashMap<String, RefreshTokenData>>,
}

impl SessionManager {
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_cost(secret, DEFAULT_COST)
    }

    pub fn with_cost(secret: impl Into<String>, bcrypt_cost: u32) -> Self {
        Self {
            secret: secret.into(),
            bcrypt_cost,
            refresh_tokens: RwLock::new(HashMap::new()),
        }
    }

    pub fn create_access_token(&self, session: &Session) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

        let claims = Claims {
            sub: session.uid.clone(),
            username: session.username.clone(),
            email: session.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Session, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(Session {
            uid: data.claims.sub,
            username: data.claims.username,
            email: data.claims.email,
        })
    }

    /// Mints an access token and a fresh refresh token for `session`.
    pub async fn issue(&self, session: &Session) -> AppResult<TokenPair> {
        let access_token = self
            .create_access_token(session)
            .map_err(|e| AppError::Backend(format!("failed to create token: {}", e)))?;

        let refresh_token = generate_refresh_token();
        let now = Utc::now();
        let expires_at = now + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);

        let mut tokens = self.refresh_tokens.write().await;
        // Revoked and expired entries can never be exchanged again.
        tokens.retain(|_, data| !data.revoked && data.expires_at > now.timestamp());
        tokens.insert(
            hash_refresh_token(&refresh_token),
            RefreshTokenData {
                session: session.clone(),
                expires_at: expires_at.timestamp(),
                revoked: false,
            },
        );
        drop(tokens);

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a live refresh token for a new pair; the old one is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(Session, TokenPair)> {
        if refresh_token.is_empty() {
            return Err(AppError::validation("Refresh token is required"));
        }

        let token_hash = hash_refresh_token(refresh_token);
        let now = Utc::now().timestamp();

        let session = {
            let mut tokens = self.refresh_tokens.write().await;
            // Drop anything already expired while we hold the lock.
            tokens.retain(|_, data| data.expires_at > now);
            match tokens.get_mut(&token_hash) {
                Some(data) if !data.revoked => {
                    data.revoked = true;
                    data.session.clone()
                }
                _ => {
                    return Err(AppError::Unauthorized(
                        "Invalid or expired refresh token".to_string(),
                    ))
                }
            }
        };

        let pair = self.issue(&session).await?;
        Ok((session, pair))
    }

    pub async fn revoke(&self, refresh_token: &str) {
        let token_hash = hash_refresh_token(refresh_token);
        if let Some(data) = self.refresh_tokens.write().await.get_mut(&token_hash) {
            data.revoked = true;
        }
    }

    /// Revokes every refresh token held by `uid`.
    pub async fn revoke_all(&self, uid: &str) {
        let mut tokens = self.refresh_tokens.write().await;
        for data in tokens.values_mut() {
            if data.session.uid == uid {
                data.revoked = true;
            }
        }
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.bcrypt_cost;
        // bcrypt is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| AppError::Backend(format!("hash task failed: {}", e)))?
            .map_err(|e| AppError::Backend(format!("failed to hash password: {}", e)))
    }

    async fn verify_password(&self, password: String, password_hash: String) -> bool {
        tokio::task::spawn_blocking(move || verify(&password, &password_hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }

    /// Creates a principal with credentials and signs it in.
    ///
    /// The email is checked first, then the principal record is written, then
    /// the credentials. A failure between the last two steps leaves a record
    /// nobody can log into; the username stays taken.
    pub async fn register(
        &self,
        store: &dyn Store,
        request: RegisterRequest,
    ) -> AppResult<(Session, TokenPair)> {
        let email = request.email.trim().to_string();
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }
        if !email.contains('@') {
            return Err(AppError::validation("Invalid email format"));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(
                "Password must be at least 8 characters long",
            ));
        }

        let username = normalize_username(&request.username);
        validate_username(&username)?;

        if store.find_credentials(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if !store.is_username_available(&username).await? {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let password_hash = self.hash_password(request.password).await?;
        let uid = uuid::Uuid::new_v4().to_string();

        let record = store.create_principal(&uid, &username, &email).await?;
        store
            .create_credentials(Credentials {
                uid: uid.clone(),
                email: email.clone(),
                password_hash,
            })
            .await
            .map_err(|e| {
                // The principal row stays behind without credentials.
                tracing::error!(uid = %uid, error = %e, "credential write failed after principal creation");
                e
            })?;

        tracing::info!(uid = %uid, username = %record.username, "principal registered");

        let session = Session {
            uid,
            username: record.username,
            email,
        };
        let pair = self.issue(&session).await?;
        Ok((session, pair))
    }

    pub async fn login(
        &self,
        store: &dyn Store,
        request: LoginRequest,
    ) -> AppResult<(Session, TokenPair)> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }
        if !request.email.contains('@') {
            return Err(AppError::validation("Invalid email format"));
        }

        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let credentials = match store.find_credentials(request.email.trim()).await? {
            Some(c) => c,
            None => {
                tracing::warn!(email = %request.email, "login attempt for unknown user");
                return Err(invalid());
            }
        };

        if !self
            .verify_password(request.password, credentials.password_hash.clone())
            .await
        {
            tracing::warn!(uid = %credentials.uid, "failed login attempt");
            return Err(invalid());
        }

        let record = store
            .get_by_uid(&credentials.uid)
            .await?
            .ok_or_else(invalid)?;

        let session = Session {
            uid: record.uid,
            username: record.username,
            email: credentials.email,
        };
        let pair = self.issue(&session).await?;
        tracing::info!(uid = %session.uid, "successful login");
        Ok((session, pair))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

impl FromRequestParts<SharedState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Authorization required".to_string()))?;

        state.sessions.verify_access_token(token).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}
