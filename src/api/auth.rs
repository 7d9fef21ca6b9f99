use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::db::{self, LoginRequest};
use crate::token::{Identity, TOKEN_TTL_SECS};
use crate::AppState;

/// Cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .secure(state.config.server.production)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(TOKEN_TTL_SECS))
        .path("/")
        .build()
}

/// Login endpoint. Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let admin = db::find_admin_by_email(&state.db, &request.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&request.password, &admin.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.tokens.issue(admin.id, &admin.email).map_err(|e| {
        tracing::error!("Failed to issue session token: {}", e);
        ApiError::internal()
    })?;

    tracing::info!(email = %admin.email, "admin logged in");

    Ok((
        jar.add(session_cookie(&state, token)),
        Json(LoginResponse { email: admin.email }),
    ))
}

/// Logout endpoint. Only resets the cookie: the token itself stays valid
/// server-side until its one-hour expiry (see `token` module docs).
pub async fn logout(jar: CookieJar, identity: Identity) -> (CookieJar, Json<LogoutResponse>) {
    tracing::info!(email = %identity.email, "admin logged out");

    let removal = Cookie::build((AUTH_COOKIE, "")).path("/").build();
    (
        jar.remove(removal),
        Json(LogoutResponse {
            message: "Logged out",
        }),
    )
}

/// Middleware guarding the product and dashboard routes. Every token
/// failure funnels into the same 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let identity = state
        .tokens
        .verify(&token)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extractor for the admin identity placed in extensions by
/// `auth_middleware`.
#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
