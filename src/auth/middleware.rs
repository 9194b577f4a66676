//! Authentication and access-control middleware for Axum
//!
//! `auth_middleware` establishes identity (JWT or API token).
//! `access_guard` enforces per-admin tab/modify restrictions on the
//! service-scoped routes, with the tab parsed from the URL.
//! `superior_guard` protects the permission panels themselves.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::prelude::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::json;

use super::api_token::{hash_api_token, is_api_token_format};
use super::jwt::{verify_token, AuthError, Claims, JwtConfig};
use crate::application::services::{AccessControlService, AdminDirectory};
use crate::infrastructure::database::entities::api_token;

/// Authentication state containing JWT config and database handle
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub db: DatabaseConnection,
}

/// Authenticated user information (either from JWT or API token)
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub auth_method: AuthMethod,
}

/// How the user was authenticated
#[derive(Clone, Debug)]
pub enum AuthMethod {
    /// JWT token
    Jwt,
    /// API token
    ApiToken { token_id: String },
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
            auth_method: AuthMethod::Jwt,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Extract token from Authorization header
fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// JWT / API token authentication middleware - requires valid token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // Get Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    // Try API token first (the bot sends it raw)
    if is_api_token_format(&auth_header) {
        return handle_api_token_auth(&auth_header, &auth_state, request, next).await;
    }

    // Try Bearer token
    let Some(token) = extract_bearer(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    if is_api_token_format(token) {
        return handle_api_token_auth(token, &auth_state, request, next).await;
    }

    // Verify JWT token
    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            if claims.is_expired() {
                return auth_error_response(AuthError::ExpiredToken);
            }

            // Add authenticated user to request extensions
            let user = AuthenticatedUser::from_claims(claims);
            request.extensions_mut().insert(user);

            next.run(request).await
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

/// Handle API token authentication
async fn handle_api_token_auth(
    token: &str,
    auth_state: &AuthState,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match try_api_token_auth(token, auth_state).await {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => auth_error_response(AuthError::InvalidApiToken),
    }
}

/// Try to authenticate with an API token
async fn try_api_token_auth(token_str: &str, auth_state: &AuthState) -> Option<AuthenticatedUser> {
    // Hash the token for lookup
    let token_hash = hash_api_token(token_str);

    // Look up in database
    let token = api_token::Entity::find()
        .filter(api_token::Column::TokenHash.eq(&token_hash))
        .filter(api_token::Column::IsActive.eq(true))
        .one(&auth_state.db)
        .await
        .ok()??;

    // Check expiration
    if let Some(expires_at) = token.expires_at {
        if chrono::Utc::now() > expires_at {
            return None;
        }
    }

    // Update last used timestamp (fire and forget)
    let token_id = token.id.clone();
    let db = auth_state.db.clone();
    tokio::spawn(async move {
        let _ = api_token::Entity::update_many()
            .filter(api_token::Column::Id.eq(&token_id))
            .col_expr(
                api_token::Column::LastUsedAt,
                Expr::value(chrono::Utc::now()),
            )
            .exec(&db)
            .await;
    });

    Some(AuthenticatedUser {
        user_id: token.user_id.unwrap_or_else(|| "api-token-user".to_string()),
        username: token.name,
        role: "operator".to_string(),
        auth_method: AuthMethod::ApiToken { token_id: token.id },
    })
}

/// Create an authentication error response
fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
        AuthError::InvalidApiToken => (StatusCode::UNAUTHORIZED, "Invalid API token"),
    };

    let body = Json(json!({
        "success": false,
        "error": message
    }));

    (status, body).into_response()
}

fn forbidden_response(message: impl Into<String>) -> Response {
    let body = Json(json!({
        "success": false,
        "error": message.into()
    }));
    (StatusCode::FORBIDDEN, body).into_response()
}

/// State for the access-control guards
#[derive(Clone)]
pub struct AccessGuardState {
    pub access: Arc<AccessControlService>,
    pub admins: Arc<AdminDirectory>,
}

/// Tab name parsed from a service-scoped URL:
/// `/api/v1/{service}/{tab}/...` → `{tab}`
fn tab_from_path(path: &str) -> Option<&str> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    if segments.next() != Some("api") || segments.next() != Some("v1") {
        return None;
    }
    let _service = segments.next()?;
    segments.next()
}

/// Per-admin restriction guard for the service-scoped routes.
/// Must be layered after `auth_middleware`.
pub async fn access_guard(
    State(state): State<AccessGuardState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthenticatedUser>().cloned() else {
        return auth_error_response(AuthError::MissingToken);
    };

    // Superior admins bypass every restriction
    if state.admins.is_superior(&user.user_id).await {
        return next.run(request).await;
    }

    let policy = state.access.policy_for(&user.user_id).await;

    if let Some(tab) = tab_from_path(request.uri().path()) {
        if policy.is_tab_restricted(tab) {
            return forbidden_response(format!("Tab '{}' is restricted for this account", tab));
        }
    }

    let mutating = !matches!(request.method().as_str(), "GET" | "HEAD" | "OPTIONS");
    if mutating && !policy.can_modify {
        return forbidden_response("This account has read-only access");
    }

    next.run(request).await
}

/// Guard for the permission panels (admin config, access settings,
/// UI restrictions, API tokens): superior admins and `admin`-role
/// accounts only. Must be layered after `auth_middleware`.
pub async fn superior_guard(
    State(state): State<AccessGuardState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthenticatedUser>().cloned() else {
        return auth_error_response(AuthError::MissingToken);
    };

    // The admin role bypass keeps a freshly bootstrapped install
    // manageable before any superior ids are configured.
    if user.is_admin() || state.admins.is_superior(&user.user_id).await {
        return next.run(request).await;
    }

    auth_error_response(AuthError::InsufficientPermissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_from_path() {
        assert_eq!(tab_from_path("/api/v1/netflix/slots"), Some("slots"));
        assert_eq!(
            tab_from_path("/api/v1/netflix/transactions/t1/approve"),
            Some("transactions")
        );
        assert_eq!(tab_from_path("/api/v1/netflix"), None);
        assert_eq!(tab_from_path("/health"), None);
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer("Basic abc"), None);
    }
}
