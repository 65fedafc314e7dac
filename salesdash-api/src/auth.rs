//! Bearer-token authentication
//!
//! Opaque session tokens issued against the single configured user and
//! held in memory with their expiry. The middleware gates every data
//! endpoint; token state is process-local and vanishes on restart.

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use salesdash_core::{SalesdashError, SalesdashResult};

use crate::handlers::error_response;
use crate::AppState;

/// Successful login response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Form fields accepted by the token endpoint
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Issues and verifies bearer tokens for the configured user
#[derive(Debug)]
pub struct AuthService {
    username: String,
    password: String,
    ttl: Duration,
    tokens: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl AuthService {
    /// Create a service for one user with the given token lifetime
    pub fn new(username: String, password: String, ttl_minutes: i64) -> AuthService {
        AuthService {
            username,
            password,
            ttl: Duration::minutes(ttl_minutes),
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Verify credentials and issue a fresh token
    pub fn login(&self, username: &str, password: &str) -> SalesdashResult<TokenResponse> {
        if username != self.username || password != self.password {
            return Err(SalesdashError::unauthorized(
                "Incorrect username or password",
            ));
        }
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.ttl;
        self.tokens.write().insert(token.clone(), expires_at);
        Ok(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        })
    }

    /// True when the token exists and has not expired; expired entries are
    /// dropped on sight
    pub fn verify(&self, token: &str) -> bool {
        let now = Utc::now();
        let mut tokens = self.tokens.write();
        match tokens.get(token) {
            Some(expires_at) if *expires_at > now => true,
            Some(_) => {
                tokens.remove(token);
                false
            }
            None => false,
        }
    }

    /// Number of live tokens (expired ones may still be counted until seen)
    #[cfg(test)]
    pub fn token_count(&self) -> usize {
        self.tokens.read().len()
    }
}

/// Require a valid bearer token on the request
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if state.auth.verify(token) => Ok(next.run(request).await),
        Some(_) => {
            debug!("rejected request carrying an invalid or expired token");
            Err(error_response(&SalesdashError::unauthorized(
                "Could not validate credentials",
            )))
        }
        None => {
            warn!("rejected unauthenticated request to a protected endpoint");
            Err(error_response(&SalesdashError::unauthorized(
                "Not authenticated",
            )))
        }
    }
}
