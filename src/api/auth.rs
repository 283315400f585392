//! Credential verification and access tokens.
//!
//! Login verifies an argon2 password hash and mints a signed, time-limited
//! JWT; the auth middleware verifies the token on every protected route and
//! attaches the decoded claims to the request, so no database round-trip is
//! needed downstream.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::{DbPool, LoginRequest, LoginResponse, Usuario, UsuarioResumen};
use crate::AppState;

use super::error::ApiError;

/// Claims embedded in an access token. Self-contained: handlers trust
/// them once the signature is verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub nombre: String,
    /// Expiry as a unix timestamp
    pub exp: i64,
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

/// Sign a token for the given user
pub fn issue_token(
    secret: &str,
    usuario: &Usuario,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = chrono::Utc::now() + chrono::Duration::hours(ttl_hours);
    let claims = Claims {
        sub: usuario.id.clone(),
        email: usuario.email.clone(),
        nombre: usuario.nombre.clone(),
        exp: exp.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the decoded claims
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Login endpoint
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || request.password.trim().is_empty() {
        return Err(ApiError::bad_request("Email y password requeridos"));
    }

    let usuario: Option<Usuario> =
        sqlx::query_as("SELECT * FROM usuarios WHERE LOWER(email) = LOWER(?) LIMIT 1")
            .bind(&email)
            .fetch_optional(&state.db)
            .await?;

    // Same response for unknown email and wrong password
    let usuario = usuario.ok_or_else(|| ApiError::unauthorized("Credenciales inválidas"))?;

    if !verify_password(&request.password, &usuario.password_hash) {
        return Err(ApiError::unauthorized("Credenciales inválidas"));
    }

    let token = issue_token(
        &state.config.auth.jwt_secret,
        &usuario,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        ApiError::internal("Error del servidor")
    })?;

    Ok(Json(LoginResponse {
        token,
        usuario: UsuarioResumen::from(usuario),
    }))
}

/// Current-user endpoint
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UsuarioResumen>, ApiError> {
    let usuario: Option<UsuarioResumen> =
        sqlx::query_as("SELECT id, nombre, email FROM usuarios WHERE id = ?")
            .bind(&claims.sub)
            .fetch_optional(&state.db)
            .await?;

    usuario
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Usuario no encontrado"))
}

/// Auth middleware that validates bearer tokens on protected routes
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return Err(ApiError::unauthorized("Acceso denegado, token faltante")),
    };

    let claims = decode_token(&state.config.auth.jwt_secret, token)
        .map_err(|_| ApiError::unauthorized("Token inválido"))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Seed the configured admin account if its email is not present yet.
/// Runs at startup, before the server starts accepting requests.
pub async fn ensure_admin_user(pool: &DbPool, auth: &AuthConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&auth.admin_email, &auth.admin_password) else {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuarios")
            .fetch_one(pool)
            .await?;
        if count.0 == 0 {
            tracing::warn!(
                "No users exist and no admin credentials configured; login is impossible"
            );
        }
        return Ok(());
    };

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM usuarios WHERE LOWER(email) = LOWER(?)")
            .bind(email)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(());
    }

    let id = uuid::Uuid::new_v4().to_string();
    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO usuarios (id, nombre, email, password_hash, creado_en) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&auth.admin_nombre)
    .bind(email)
    .bind(&password_hash)
    .bind(&now)
    .execute(pool)
    .await?;

    tracing::info!("Created admin user {}", email);
    Ok(())
}
