//! Admin tier panel handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::api::handlers::error_reply;
use crate::application::services::AdminDirectory;
use crate::domain::AdminConfig;

/// State for admin config handlers
#[derive(Clone)]
pub struct AdminConfigState {
    pub admins: Arc<AdminDirectory>,
}

/// Списки админов по уровням
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminConfigDto {
    /// Старшие админы: без ограничений, управляют правами
    pub superior_admins: Vec<String>,
    /// Младшие админы: обычные пользователи консоли
    pub inferior_admins: Vec<String>,
}

impl From<AdminConfig> for AdminConfigDto {
    fn from(c: AdminConfig) -> Self {
        Self {
            superior_admins: c.superior_admins,
            inferior_admins: c.inferior_admins,
        }
    }
}

impl From<AdminConfigDto> for AdminConfig {
    fn from(dto: AdminConfigDto) -> Self {
        Self {
            superior_admins: dto.superior_admins,
            inferior_admins: dto.inferior_admins,
        }
    }
}

/// Текущие списки админов
#[utoipa::path(
    get,
    path = "/api/v1/admin-config",
    tag = "Admin Config",
    responses(
        (status = 200, description = "Списки админов", body = ApiResponse<AdminConfigDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_admin_config(
    State(state): State<AdminConfigState>,
) -> Json<ApiResponse<AdminConfigDto>> {
    Json(ApiResponse::success(state.admins.get().await.into()))
}

/// Сохранение списков админов
///
/// Доступно только старшим админам (и бутстрап-аккаунту с ролью
/// `admin`).
#[utoipa::path(
    put,
    path = "/api/v1/admin-config",
    tag = "Admin Config",
    request_body = AdminConfigDto,
    responses(
        (status = 200, description = "Списки сохранены", body = ApiResponse<AdminConfigDto>),
        (status = 403, description = "Недостаточно прав")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_admin_config(
    State(state): State<AdminConfigState>,
    Json(request): Json<AdminConfigDto>,
) -> Result<Json<ApiResponse<AdminConfigDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.admins.update(request.into()).await {
        Ok(saved) => Ok(Json(ApiResponse::success(saved.into()))),
        Err(e) => Err(error_reply("Failed to save admin config", e)),
    }
}
