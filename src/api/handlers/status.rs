//! Status panel handler

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::api::handlers::transactions::TransactionDto;
use crate::api::handlers::{error_reply, PanelState};

/// Сводка по транзакциям сервиса
///
/// Классификация пересчитывается на момент запроса; в `expired`
/// попадают только окна, закрывшиеся за последние 24 часа.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusDto {
    /// Активные подписки
    pub active: Vec<TransactionDto>,
    /// Недавно истёкшие подписки (скользящее окно)
    pub expired: Vec<TransactionDto>,
    /// Оплачено, но не одобрено
    pub pending: usize,
    /// Скрытых транзакций в хранилище
    pub hidden: usize,
    /// Сколько истечений уже объявлено уведомлениями
    pub notified: usize,
}

/// Статус-панель сервиса
#[utoipa::path(
    get,
    path = "/api/v1/{service}/status",
    tag = "Status",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    responses(
        (status = 200, description = "Сводка по транзакциям", body = ApiResponse<StatusDto>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_status(
    State(state): State<PanelState>,
    Path(service): Path<String>,
) -> Result<Json<ApiResponse<StatusDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.monitor.status_snapshot(&service).await {
        Ok(snapshot) => {
            let now = Utc::now();
            Ok(Json(ApiResponse::success(StatusDto {
                active: snapshot
                    .active
                    .into_iter()
                    .map(|tx| TransactionDto::from_transaction(tx, now))
                    .collect(),
                expired: snapshot
                    .expired
                    .into_iter()
                    .map(|tx| TransactionDto::from_transaction(tx, now))
                    .collect(),
                pending: snapshot.pending,
                hidden: snapshot.hidden,
                notified: snapshot.notified,
            })))
        }
        Err(e) => Err(error_reply("Failed to load status", e)),
    }
}
