//! REST API handlers, one module per console panel

pub mod access_settings;
pub mod admin_config;
pub mod api_tokens;
pub mod auth;
pub mod copy;
pub mod credentials;
pub mod devices;
pub mod health;
pub mod metrics;
pub mod referrals;
pub mod slots;
pub mod status;
pub mod transactions;
pub mod ui_restrictions;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::application::services::{
    CopyService, CredentialService, ExpiryMonitor, ReferralService, SlotService,
    TransactionService,
};
use crate::domain::DomainError;

/// Shared state for every service-scoped panel route
#[derive(Clone)]
pub struct PanelState {
    pub slots: Arc<SlotService>,
    pub credentials: Arc<CredentialService>,
    pub transactions: Arc<TransactionService>,
    pub monitor: Arc<ExpiryMonitor>,
    pub copy: Arc<CopyService>,
    pub referrals: Arc<ReferralService>,
}

/// HTTP status for a domain error
pub(crate) fn domain_error_status(e: &DomainError) -> StatusCode {
    match e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::UnknownService(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::CredentialExhausted(_) => StatusCode::CONFLICT,
    }
}

/// Uniform error reply: status + wrapped message
pub(crate) fn error_reply(
    context: &str,
    e: DomainError,
) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        domain_error_status(&e),
        Json(ApiResponse::error(format!("{}: {}", context, e))),
    )
}
