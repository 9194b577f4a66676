//! Health check handler

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Состояние сервера
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Всегда "ok" когда сервер отвечает
    pub status: String,
    /// Версия сборки
    pub version: String,
    /// Текущее серверное время (UTC)
    pub timestamp: DateTime<Utc>,
}

/// Проверка состояния сервера
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Сервер работает", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
