//! UI restriction panel handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::domain::RestrictionType;
use crate::infrastructure::database::entities::ui_restriction;
use crate::notifications::events::{Event, UiRestrictionEvent};
use crate::notifications::SharedEventBus;

/// State for UI restriction handlers
#[derive(Clone)]
pub struct RestrictionHandlerState {
    pub db: sea_orm::DatabaseConnection,
    pub event_bus: SharedEventBus,
}

/// Правило ограничения элемента консоли
#[derive(Debug, Serialize, ToSchema)]
pub struct UiRestrictionDto {
    /// ID правила
    pub id: i64,
    /// ID элемента консоли (DOM id)
    pub element_id: String,
    /// Вид ограничения: `blur`, `hide`, `disable`
    pub restriction_type: String,
    /// Админы, к которым правило применяется
    pub user_ids: Vec<String>,
}

impl From<ui_restriction::Model> for UiRestrictionDto {
    fn from(row: ui_restriction::Model) -> Self {
        let domain = row.to_domain();
        Self {
            id: domain.id,
            element_id: domain.element_id,
            restriction_type: domain.restriction_type.as_str().to_string(),
            user_ids: domain.user_ids,
        }
    }
}

/// Запрос на создание/обновление правила
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertRestrictionRequest {
    /// ID элемента консоли
    pub element_id: String,
    /// Вид ограничения: `blur`, `hide`, `disable`
    pub restriction_type: String,
    /// Админы, к которым правило применяется
    #[serde(default)]
    pub user_ids: Vec<String>,
}

fn publish_changed(event_bus: &SharedEventBus, element_id: &str) {
    event_bus.publish(Event::UiRestrictionChanged(UiRestrictionEvent {
        element_id: element_id.to_string(),
        timestamp: Utc::now(),
    }));
}

fn parse_restriction_type(
    raw: &str,
) -> Result<RestrictionType, (StatusCode, Json<ApiResponse<()>>)> {
    RestrictionType::parse(raw).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "Unknown restriction type: {} (expected blur, hide or disable)",
                raw
            ))),
        )
    })
}

/// Список правил
#[utoipa::path(
    get,
    path = "/api/v1/ui-restrictions",
    tag = "Access Control",
    responses(
        (status = 200, description = "Все правила", body = ApiResponse<Vec<UiRestrictionDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_restrictions(
    State(state): State<RestrictionHandlerState>,
) -> Result<Json<ApiResponse<Vec<UiRestrictionDto>>>, (StatusCode, Json<ApiResponse<()>>)> {
    match ui_restriction::Entity::find()
        .order_by_asc(ui_restriction::Column::ElementId)
        .all(&state.db)
        .await
    {
        Ok(rows) => Ok(Json(ApiResponse::success(
            rows.into_iter().map(Into::into).collect(),
        ))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!(
                "Failed to list restrictions: {}",
                e
            ))),
        )),
    }
}

/// Создание правила
#[utoipa::path(
    post,
    path = "/api/v1/ui-restrictions",
    tag = "Access Control",
    request_body = UpsertRestrictionRequest,
    responses(
        (status = 201, description = "Правило создано", body = ApiResponse<UiRestrictionDto>),
        (status = 400, description = "Неизвестный вид ограничения")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_restriction(
    State(state): State<RestrictionHandlerState>,
    Json(request): Json<UpsertRestrictionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UiRestrictionDto>>), (StatusCode, Json<ApiResponse<()>>)>
{
    let restriction_type = parse_restriction_type(&request.restriction_type)?;
    let now = Utc::now();

    let model = ui_restriction::ActiveModel {
        element_id: Set(request.element_id.clone()),
        restriction_type: Set(restriction_type.as_str().to_string()),
        user_ids: Set(serde_json::to_string(&request.user_ids).unwrap_or_else(|_| "[]".into())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match model.insert(&state.db).await {
        Ok(saved) => {
            publish_changed(&state.event_bus, &saved.element_id);
            Ok((StatusCode::CREATED, Json(ApiResponse::success(saved.into()))))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!(
                "Failed to create restriction: {}",
                e
            ))),
        )),
    }
}

/// Обновление правила
#[utoipa::path(
    put,
    path = "/api/v1/ui-restrictions/{id}",
    tag = "Access Control",
    params(
        ("id" = i64, Path, description = "ID правила")
    ),
    request_body = UpsertRestrictionRequest,
    responses(
        (status = 200, description = "Правило обновлено", body = ApiResponse<UiRestrictionDto>),
        (status = 404, description = "Правило не найдено")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_restriction(
    State(state): State<RestrictionHandlerState>,
    Path(id): Path<i64>,
    Json(request): Json<UpsertRestrictionRequest>,
) -> Result<Json<ApiResponse<UiRestrictionDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    let restriction_type = parse_restriction_type(&request.restriction_type)?;

    let existing = ui_restriction::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!(
                    "Failed to get restriction: {}",
                    e
                ))),
            )
        })?;

    let Some(existing) = existing else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Restriction {} not found", id))),
        ));
    };

    let mut model: ui_restriction::ActiveModel = existing.into();
    model.element_id = Set(request.element_id.clone());
    model.restriction_type = Set(restriction_type.as_str().to_string());
    model.user_ids = Set(serde_json::to_string(&request.user_ids).unwrap_or_else(|_| "[]".into()));
    model.updated_at = Set(Utc::now());

    match model.update(&state.db).await {
        Ok(saved) => {
            publish_changed(&state.event_bus, &saved.element_id);
            Ok(Json(ApiResponse::success(saved.into())))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!(
                "Failed to update restriction: {}",
                e
            ))),
        )),
    }
}

/// Удаление правила
#[utoipa::path(
    delete,
    path = "/api/v1/ui-restrictions/{id}",
    tag = "Access Control",
    params(
        ("id" = i64, Path, description = "ID правила")
    ),
    responses(
        (status = 200, description = "Правило удалено"),
        (status = 404, description = "Правило не найдено")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_restriction(
    State(state): State<RestrictionHandlerState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ApiResponse<()>>)> {
    let found = ui_restriction::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!(
                    "Failed to get restriction: {}",
                    e
                ))),
            )
        })?;

    let Some(found) = found else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Restriction {} not found", id))),
        ));
    };

    let element_id = found.element_id.clone();
    ui_restriction::Entity::delete_many()
        .filter(ui_restriction::Column::Id.eq(id))
        .exec(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!(
                    "Failed to delete restriction: {}",
                    e
                ))),
            )
        })?;

    publish_changed(&state.event_bus, &element_id);
    Ok(Json(ApiResponse::success("Restriction deleted".to_string())))
}
