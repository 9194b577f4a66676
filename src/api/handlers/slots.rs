//! Slot panel handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::api::handlers::{error_reply, PanelState};
use crate::domain::Slot;

/// Слот (тарифный план подписки)
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotDto {
    /// ID слота (произвольная строка)
    pub id: String,
    /// Название, которое видит покупатель
    pub name: String,
    /// Длительность подписки в часах
    pub duration_hours: i64,
    /// Цена
    pub required_amount: Decimal,
    /// Продаётся ли слот
    pub enabled: bool,
    /// Дата создания
    pub created_at: DateTime<Utc>,
    /// Дата последнего обновления
    pub updated_at: DateTime<Utc>,
}

impl From<Slot> for SlotDto {
    fn from(s: Slot) -> Self {
        Self {
            id: s.id,
            name: s.name,
            duration_hours: s.duration_hours,
            required_amount: s.required_amount,
            enabled: s.enabled,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Запрос на создание слота
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSlotRequest {
    /// ID слота. Если не указан — генерируется UUID
    #[validate(length(max = 64))]
    pub id: Option<String>,
    /// Название
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Длительность подписки в часах
    #[validate(range(min = 1))]
    pub duration_hours: i64,
    /// Цена
    pub required_amount: Decimal,
    /// Продаётся ли слот (по умолчанию true)
    pub enabled: Option<bool>,
}

/// Запрос на обновление слота (partial update)
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateSlotRequest {
    /// Новое название
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Новая длительность в часах
    #[validate(range(min = 1))]
    pub duration_hours: Option<i64>,
    /// Новая цена
    pub required_amount: Option<Decimal>,
    /// Продаётся ли слот
    pub enabled: Option<bool>,
}

fn validation_reply(e: validator::ValidationErrors) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(format!("Validation failed: {}", e))),
    )
}

/// Список слотов сервиса
#[utoipa::path(
    get,
    path = "/api/v1/{service}/slots",
    tag = "Slots",
    params(
        ("service" = String, Path, description = "Тег сервиса (партиция)")
    ),
    responses(
        (status = 200, description = "Список слотов", body = ApiResponse<Vec<SlotDto>>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_slots(
    State(state): State<PanelState>,
    Path(service): Path<String>,
) -> Result<Json<ApiResponse<Vec<SlotDto>>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.slots.list(&service).await {
        Ok(slots) => Ok(Json(ApiResponse::success(
            slots.into_iter().map(Into::into).collect(),
        ))),
        Err(e) => Err(error_reply("Failed to list slots", e)),
    }
}

/// Получение слота по ID
#[utoipa::path(
    get,
    path = "/api/v1/{service}/slots/{id}",
    tag = "Slots",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID слота")
    ),
    responses(
        (status = 200, description = "Слот", body = ApiResponse<SlotDto>),
        (status = 404, description = "Слот не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_slot(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<SlotDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.slots.get(&service, &id).await {
        Ok(Some(slot)) => Ok(Json(ApiResponse::success(slot.into()))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Slot {} not found", id))),
        )),
        Err(e) => Err(error_reply("Failed to get slot", e)),
    }
}

/// Создание слота
#[utoipa::path(
    post,
    path = "/api/v1/{service}/slots",
    tag = "Slots",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    request_body = CreateSlotRequest,
    responses(
        (status = 201, description = "Слот создан", body = ApiResponse<SlotDto>),
        (status = 400, description = "Некорректные данные"),
        (status = 409, description = "Слот с таким ID уже существует")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_slot(
    State(state): State<PanelState>,
    Path(service): Path<String>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SlotDto>>), (StatusCode, Json<ApiResponse<()>>)> {
    request.validate().map_err(validation_reply)?;

    let now = Utc::now();
    let slot = Slot {
        id: request
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        name: request.name,
        duration_hours: request.duration_hours,
        required_amount: request.required_amount,
        enabled: request.enabled.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    match state.slots.create(&service, slot).await {
        Ok(saved) => Ok((StatusCode::CREATED, Json(ApiResponse::success(saved.into())))),
        Err(e) => Err(error_reply("Failed to create slot", e)),
    }
}

/// Обновление слота
///
/// Partial update — передайте только изменяемые поля.
#[utoipa::path(
    put,
    path = "/api/v1/{service}/slots/{id}",
    tag = "Slots",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID слота")
    ),
    request_body = UpdateSlotRequest,
    responses(
        (status = 200, description = "Слот обновлён", body = ApiResponse<SlotDto>),
        (status = 404, description = "Слот не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_slot(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
    Json(request): Json<UpdateSlotRequest>,
) -> Result<Json<ApiResponse<SlotDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    request.validate().map_err(validation_reply)?;

    let existing = match state.slots.get(&service, &id).await {
        Ok(Some(slot)) => slot,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(format!("Slot {} not found", id))),
            ));
        }
        Err(e) => return Err(error_reply("Failed to get slot", e)),
    };

    let updated = Slot {
        id: existing.id.clone(),
        name: request.name.unwrap_or(existing.name),
        duration_hours: request.duration_hours.unwrap_or(existing.duration_hours),
        required_amount: request.required_amount.unwrap_or(existing.required_amount),
        enabled: request.enabled.unwrap_or(existing.enabled),
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    match state.slots.update(&service, updated).await {
        Ok(saved) => Ok(Json(ApiResponse::success(saved.into()))),
        Err(e) => Err(error_reply("Failed to update slot", e)),
    }
}

/// Включение слота в продажу
#[utoipa::path(
    post,
    path = "/api/v1/{service}/slots/{id}/enable",
    tag = "Slots",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID слота")
    ),
    responses(
        (status = 200, description = "Слот включён", body = ApiResponse<SlotDto>),
        (status = 404, description = "Слот не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn enable_slot(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<SlotDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.slots.set_enabled(&service, &id, true).await {
        Ok(slot) => Ok(Json(ApiResponse::success(slot.into()))),
        Err(e) => Err(error_reply("Failed to enable slot", e)),
    }
}

/// Снятие слота с продажи
#[utoipa::path(
    post,
    path = "/api/v1/{service}/slots/{id}/disable",
    tag = "Slots",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID слота")
    ),
    responses(
        (status = 200, description = "Слот выключен", body = ApiResponse<SlotDto>),
        (status = 404, description = "Слот не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn disable_slot(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<SlotDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.slots.set_enabled(&service, &id, false).await {
        Ok(slot) => Ok(Json(ApiResponse::success(slot.into()))),
        Err(e) => Err(error_reply("Failed to disable slot", e)),
    }
}

/// Удаление слота
#[utoipa::path(
    delete,
    path = "/api/v1/{service}/slots/{id}",
    tag = "Slots",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID слота")
    ),
    responses(
        (status = 200, description = "Слот удалён"),
        (status = 404, description = "Слот не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_slot(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.slots.delete(&service, &id).await {
        Ok(()) => Ok(Json(ApiResponse::success("Slot deleted".to_string()))),
        Err(e) => Err(error_reply("Failed to delete slot", e)),
    }
}
