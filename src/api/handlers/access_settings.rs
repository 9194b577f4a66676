//! Access-settings panel handlers
//!
//! Rows live in the relational store; every write publishes a change
//! event so the in-memory access index follows.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::application::services::{AccessControlService, AdminDirectory};
use crate::auth::middleware::AuthenticatedUser;
use crate::domain::{AccessPolicy, AdminTier};
use crate::infrastructure::database::entities::access_setting;
use crate::notifications::events::{AccessSettingsEvent, Event};
use crate::notifications::SharedEventBus;

/// State for access-settings handlers
#[derive(Clone)]
pub struct AccessHandlerState {
    pub db: sea_orm::DatabaseConnection,
    pub access: Arc<AccessControlService>,
    pub admins: Arc<AdminDirectory>,
    pub event_bus: SharedEventBus,
}

/// Права одного админа
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessSettingDto {
    /// ID админа
    pub user_id: String,
    /// Имя для отображения
    pub username: String,
    /// Сервис, к которому относится запись (пусто = все)
    pub service: String,
    /// Разрешено ли редактирование
    pub can_modify: bool,
    /// Запрещённые вкладки
    pub restricted_tabs: Vec<String>,
}

impl From<access_setting::Model> for AccessSettingDto {
    fn from(row: access_setting::Model) -> Self {
        let domain = row.to_domain();
        Self {
            user_id: domain.user_id,
            username: domain.username,
            service: domain.service,
            can_modify: domain.can_modify,
            restricted_tabs: domain.restricted_tabs,
        }
    }
}

/// Запрос на создание/обновление прав
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertAccessSettingRequest {
    /// Имя для отображения
    pub username: String,
    /// Сервис (пусто = все)
    #[serde(default)]
    pub service: String,
    /// Разрешено ли редактирование
    pub can_modify: bool,
    /// Запрещённые вкладки
    #[serde(default)]
    pub restricted_tabs: Vec<String>,
}

/// Политика доступа после резолва
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessPolicyDto {
    /// Уровень: `superior`, `inferior`, `unknown`
    pub tier: String,
    /// Разрешено ли редактирование
    pub can_modify: bool,
    /// Запрещённые вкладки
    pub restricted_tabs: Vec<String>,
    /// element_id → вид ограничения (`blur`/`hide`/`disable`)
    pub elements: std::collections::HashMap<String, String>,
}

impl AccessPolicyDto {
    fn new(tier: AdminTier, policy: AccessPolicy) -> Self {
        let tier = match tier {
            AdminTier::Superior => "superior",
            AdminTier::Inferior => "inferior",
            AdminTier::Unknown => "unknown",
        };
        Self {
            tier: tier.to_string(),
            can_modify: policy.can_modify,
            restricted_tabs: policy.restricted_tabs,
            elements: policy
                .elements
                .into_iter()
                .map(|(k, v)| (k, v.as_str().to_string()))
                .collect(),
        }
    }
}

fn publish_changed(event_bus: &SharedEventBus, user_id: &str) {
    event_bus.publish(Event::AccessSettingsChanged(AccessSettingsEvent {
        user_id: user_id.to_string(),
        timestamp: Utc::now(),
    }));
}

/// Список записей прав
#[utoipa::path(
    get,
    path = "/api/v1/access-settings",
    tag = "Access Control",
    responses(
        (status = 200, description = "Все записи прав", body = ApiResponse<Vec<AccessSettingDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_access_settings(
    State(state): State<AccessHandlerState>,
) -> Result<Json<ApiResponse<Vec<AccessSettingDto>>>, (StatusCode, Json<ApiResponse<()>>)> {
    match access_setting::Entity::find()
        .order_by_asc(access_setting::Column::UserId)
        .all(&state.db)
        .await
    {
        Ok(rows) => Ok(Json(ApiResponse::success(
            rows.into_iter().map(Into::into).collect(),
        ))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!(
                "Failed to list access settings: {}",
                e
            ))),
        )),
    }
}

/// Запись прав одного админа
#[utoipa::path(
    get,
    path = "/api/v1/access-settings/{user_id}",
    tag = "Access Control",
    params(
        ("user_id" = String, Path, description = "ID админа")
    ),
    responses(
        (status = 200, description = "Запись прав", body = ApiResponse<AccessSettingDto>),
        (status = 404, description = "Записи нет (админ без ограничений)")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_access_setting(
    State(state): State<AccessHandlerState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<AccessSettingDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match access_setting::Entity::find_by_id(&user_id).one(&state.db).await {
        Ok(Some(row)) => Ok(Json(ApiResponse::success(row.into()))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!(
                "No access settings for user {}",
                user_id
            ))),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!(
                "Failed to get access settings: {}",
                e
            ))),
        )),
    }
}

/// Создание или обновление записи прав
#[utoipa::path(
    put,
    path = "/api/v1/access-settings/{user_id}",
    tag = "Access Control",
    params(
        ("user_id" = String, Path, description = "ID админа")
    ),
    request_body = UpsertAccessSettingRequest,
    responses(
        (status = 200, description = "Запись сохранена", body = ApiResponse<AccessSettingDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert_access_setting(
    State(state): State<AccessHandlerState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpsertAccessSettingRequest>,
) -> Result<Json<ApiResponse<AccessSettingDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    let tabs_json = serde_json::to_string(&request.restricted_tabs).unwrap_or_else(|_| "[]".into());

    let model = access_setting::ActiveModel {
        user_id: Set(user_id.clone()),
        username: Set(request.username),
        service: Set(request.service),
        can_modify: Set(request.can_modify),
        restricted_tabs: Set(tabs_json),
        updated_at: Set(Utc::now()),
    };

    let result = access_setting::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(access_setting::Column::UserId)
                .update_columns([
                    access_setting::Column::Username,
                    access_setting::Column::Service,
                    access_setting::Column::CanModify,
                    access_setting::Column::RestrictedTabs,
                    access_setting::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(&state.db)
        .await;

    match result {
        Ok(saved) => {
            publish_changed(&state.event_bus, &user_id);
            Ok(Json(ApiResponse::success(saved.into())))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!(
                "Failed to save access settings: {}",
                e
            ))),
        )),
    }
}

/// Удаление записи прав
///
/// После удаления админ снова без ограничений.
#[utoipa::path(
    delete,
    path = "/api/v1/access-settings/{user_id}",
    tag = "Access Control",
    params(
        ("user_id" = String, Path, description = "ID админа")
    ),
    responses(
        (status = 200, description = "Запись удалена"),
        (status = 404, description = "Записи нет")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_access_setting(
    State(state): State<AccessHandlerState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ApiResponse<()>>)> {
    let deleted = access_setting::Entity::delete_many()
        .filter(access_setting::Column::UserId.eq(&user_id))
        .exec(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!(
                    "Failed to delete access settings: {}",
                    e
                ))),
            )
        })?;

    if deleted.rows_affected == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!(
                "No access settings for user {}",
                user_id
            ))),
        ));
    }

    publish_changed(&state.event_bus, &user_id);
    Ok(Json(ApiResponse::success("Access settings deleted".to_string())))
}

/// Политика текущего пользователя
///
/// Резолв ограничений для залогиненного админа: вкладки, право
/// редактирования и элементы консоли. Консоль запрашивает это после
/// логина и при каждом событии `access_settings_changed`.
#[utoipa::path(
    get,
    path = "/api/v1/me/policy",
    tag = "Access Control",
    responses(
        (status = 200, description = "Политика текущего пользователя", body = ApiResponse<AccessPolicyDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_policy(
    State(state): State<AccessHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<AccessPolicyDto>> {
    let tier = state.admins.tier_for(&user.user_id).await;
    // superior admins bypass every restriction
    let policy = if tier == AdminTier::Superior {
        AccessPolicy::unrestricted()
    } else {
        state.access.policy_for(&user.user_id).await
    };
    Json(ApiResponse::success(AccessPolicyDto::new(tier, policy)))
}
