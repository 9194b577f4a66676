//! Bot UI copy panel handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::api::handlers::{error_reply, PanelState};
use crate::domain::BotCopy;

/// Тексты бота
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BotCopyDto {
    /// Приветствие
    pub welcome: String,
    /// Справка
    pub help: String,
    /// Инструкция по оплате
    pub payment_instructions: String,
    /// Контакт поддержки
    pub support_contact: String,
}

impl From<BotCopy> for BotCopyDto {
    fn from(c: BotCopy) -> Self {
        Self {
            welcome: c.welcome,
            help: c.help,
            payment_instructions: c.payment_instructions,
            support_contact: c.support_contact,
        }
    }
}

impl From<BotCopyDto> for BotCopy {
    fn from(dto: BotCopyDto) -> Self {
        Self {
            welcome: dto.welcome,
            help: dto.help,
            payment_instructions: dto.payment_instructions,
            support_contact: dto.support_contact,
        }
    }
}

/// Тексты бота для сервиса
///
/// Пока панель ни разу не сохранялась — возвращаются тексты по
/// умолчанию.
#[utoipa::path(
    get,
    path = "/api/v1/{service}/copy",
    tag = "Copy",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    responses(
        (status = 200, description = "Тексты бота", body = ApiResponse<BotCopyDto>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_copy(
    State(state): State<PanelState>,
    Path(service): Path<String>,
) -> Result<Json<ApiResponse<BotCopyDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.copy.get(&service).await {
        Ok(copy) => Ok(Json(ApiResponse::success(copy.into()))),
        Err(e) => Err(error_reply("Failed to load copy", e)),
    }
}

/// Сохранение текстов бота
#[utoipa::path(
    put,
    path = "/api/v1/{service}/copy",
    tag = "Copy",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    request_body = BotCopyDto,
    responses(
        (status = 200, description = "Тексты сохранены", body = ApiResponse<BotCopyDto>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_copy(
    State(state): State<PanelState>,
    Path(service): Path<String>,
    Json(request): Json<BotCopyDto>,
) -> Result<Json<ApiResponse<BotCopyDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.copy.update(&service, request.into()).await {
        Ok(saved) => Ok(Json(ApiResponse::success(saved.into()))),
        Err(e) => Err(error_reply("Failed to save copy", e)),
    }
}
