//! Push device registry handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::auth::middleware::AuthenticatedUser;
use crate::infrastructure::database::entities::device_token;

/// State for device handlers
#[derive(Clone)]
pub struct DeviceHandlerState {
    pub db: sea_orm::DatabaseConnection,
}

/// Зарегистрированное устройство
#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceDto {
    /// ID записи (UUID)
    pub id: String,
    /// Аккаунт консоли
    pub user_id: String,
    /// Платформа: `web`, `android`, `ios`
    pub platform: String,
    /// Активно ли устройство
    pub is_active: bool,
    /// Дата регистрации
    pub registered_at: DateTime<Utc>,
}

impl From<device_token::Model> for DeviceDto {
    fn from(d: device_token::Model) -> Self {
        Self {
            id: d.id,
            user_id: d.user_id,
            platform: d.platform,
            is_active: d.is_active,
            registered_at: d.registered_at,
        }
    }
}

/// Запрос на регистрацию устройства
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterDeviceRequest {
    /// Токен, выданный провайдером пуш-уведомлений
    pub token: String,
    /// Платформа (по умолчанию `web`)
    pub platform: Option<String>,
}

/// Регистрация устройства текущего пользователя
///
/// Повторная регистрация того же токена обновляет существующую запись.
#[utoipa::path(
    post,
    path = "/api/v1/devices",
    tag = "Devices",
    request_body = RegisterDeviceRequest,
    responses(
        (status = 201, description = "Устройство зарегистрировано", body = ApiResponse<DeviceDto>),
        (status = 400, description = "Пустой токен")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_device(
    State(state): State<DeviceHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<RegisterDeviceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DeviceDto>>), (StatusCode, Json<ApiResponse<()>>)> {
    if request.token.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Device token must not be empty")),
        ));
    }

    // Re-registering the same token reactivates it for this user
    let existing = device_token::Entity::find()
        .filter(device_token::Column::Token.eq(request.token.trim()))
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to register device: {}", e))),
            )
        })?;

    if let Some(existing) = existing {
        let mut model: device_token::ActiveModel = existing.into();
        model.user_id = Set(user.user_id.clone());
        model.is_active = Set(true);
        model.last_seen_at = Set(Some(Utc::now()));
        let saved = model.update(&state.db).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to register device: {}", e))),
            )
        })?;
        return Ok((StatusCode::CREATED, Json(ApiResponse::success(saved.into()))));
    }

    let model = device_token::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        user_id: Set(user.user_id.clone()),
        token: Set(request.token.trim().to_string()),
        platform: Set(request.platform.unwrap_or_else(|| "web".to_string())),
        is_active: Set(true),
        registered_at: Set(Utc::now()),
        last_seen_at: Set(None),
    };

    match model.insert(&state.db).await {
        Ok(saved) => Ok((StatusCode::CREATED, Json(ApiResponse::success(saved.into())))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!("Failed to register device: {}", e))),
        )),
    }
}

/// Список устройств
#[utoipa::path(
    get,
    path = "/api/v1/devices",
    tag = "Devices",
    responses(
        (status = 200, description = "Зарегистрированные устройства", body = ApiResponse<Vec<DeviceDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_devices(
    State(state): State<DeviceHandlerState>,
) -> Result<Json<ApiResponse<Vec<DeviceDto>>>, (StatusCode, Json<ApiResponse<()>>)> {
    match device_token::Entity::find()
        .order_by_desc(device_token::Column::RegisteredAt)
        .all(&state.db)
        .await
    {
        Ok(devices) => Ok(Json(ApiResponse::success(
            devices.into_iter().map(Into::into).collect(),
        ))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!("Failed to list devices: {}", e))),
        )),
    }
}

/// Деактивация устройства
#[utoipa::path(
    delete,
    path = "/api/v1/devices/{id}",
    tag = "Devices",
    params(
        ("id" = String, Path, description = "ID устройства")
    ),
    responses(
        (status = 200, description = "Устройство деактивировано"),
        (status = 404, description = "Устройство не найдено")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_device(
    State(state): State<DeviceHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ApiResponse<()>>)> {
    let updated = device_token::Entity::update_many()
        .filter(device_token::Column::Id.eq(&id))
        .col_expr(
            device_token::Column::IsActive,
            sea_orm::prelude::Expr::value(false),
        )
        .exec(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!(
                    "Failed to deactivate device: {}",
                    e
                ))),
            )
        })?;

    if updated.rows_affected == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Device {} not found", id))),
        ));
    }

    Ok(Json(ApiResponse::success("Device deactivated".to_string())))
}
