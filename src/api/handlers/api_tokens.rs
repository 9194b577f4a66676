//! API token handlers
//!
//! Tokens for the bot process. The full token is returned once at
//! creation and never again.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::auth::generate_api_token;
use crate::infrastructure::database::entities::api_token;

/// State for API token handlers
#[derive(Clone)]
pub struct TokenHandlerState {
    pub db: sea_orm::DatabaseConnection,
}

/// Запрос на создание API-токена
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTokenRequest {
    /// Название токена ("production bot")
    pub name: String,
    /// Срок действия (ISO 8601), опционально
    pub expires_at: Option<DateTime<Utc>>,
}

/// API-токен (без секретной части)
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// ID токена (UUID)
    pub id: String,
    /// Название
    pub name: String,
    /// Отображаемый префикс ("ssa_1a2b3c4d...")
    pub prefix: String,
    /// Активен ли токен
    pub is_active: bool,
    /// Дата создания
    pub created_at: DateTime<Utc>,
    /// Срок действия
    pub expires_at: Option<DateTime<Utc>>,
    /// Последнее использование
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<api_token::Model> for TokenResponse {
    fn from(t: api_token::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            prefix: t.prefix,
            is_active: t.is_active,
            created_at: t.created_at,
            expires_at: t.expires_at,
            last_used_at: t.last_used_at,
        }
    }
}

/// Ответ при создании токена
///
/// Поле `token` показывается **один раз**.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedTokenResponse {
    /// Полный токен — сохраните его сразу
    pub token: String,
    /// Метаданные токена
    #[serde(flatten)]
    pub info: TokenResponse,
}

/// Список API-токенов
#[utoipa::path(
    get,
    path = "/api/v1/api-tokens",
    tag = "API Tokens",
    responses(
        (status = 200, description = "Список токенов (без секретной части)", body = ApiResponse<Vec<TokenResponse>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tokens(
    State(state): State<TokenHandlerState>,
) -> Result<Json<ApiResponse<Vec<TokenResponse>>>, (StatusCode, Json<ApiResponse<()>>)> {
    match api_token::Entity::find()
        .order_by_desc(api_token::Column::CreatedAt)
        .all(&state.db)
        .await
    {
        Ok(tokens) => Ok(Json(ApiResponse::success(
            tokens.into_iter().map(Into::into).collect(),
        ))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!("Failed to list tokens: {}", e))),
        )),
    }
}

/// Создание API-токена
#[utoipa::path(
    post,
    path = "/api/v1/api-tokens",
    tag = "API Tokens",
    request_body = CreateTokenRequest,
    responses(
        (status = 201, description = "Токен создан, полный токен показан один раз", body = ApiResponse<CreatedTokenResponse>),
        (status = 400, description = "Пустое название")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_token(
    State(state): State<TokenHandlerState>,
    Json(request): Json<CreateTokenRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedTokenResponse>>), (StatusCode, Json<ApiResponse<()>>)>
{
    if request.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Token name must not be empty")),
        ));
    }

    let generated = generate_api_token();
    let model = api_token::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(request.name.trim().to_string()),
        prefix: Set(generated.prefix.clone()),
        token_hash: Set(generated.token_hash.clone()),
        user_id: Set(None),
        is_active: Set(true),
        created_at: Set(generated.created_at),
        expires_at: Set(request.expires_at),
        last_used_at: Set(None),
    };

    match model.insert(&state.db).await {
        Ok(saved) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(CreatedTokenResponse {
                token: generated.token,
                info: saved.into(),
            })),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(format!("Failed to create token: {}", e))),
        )),
    }
}

/// Отзыв API-токена
#[utoipa::path(
    delete,
    path = "/api/v1/api-tokens/{id}",
    tag = "API Tokens",
    params(
        ("id" = String, Path, description = "ID токена")
    ),
    responses(
        (status = 200, description = "Токен отозван"),
        (status = 404, description = "Токен не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn revoke_token(
    State(state): State<TokenHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ApiResponse<()>>)> {
    let updated = api_token::Entity::update_many()
        .filter(api_token::Column::Id.eq(&id))
        .col_expr(api_token::Column::IsActive, sea_orm::prelude::Expr::value(false))
        .exec(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Failed to revoke token: {}", e))),
            )
        })?;

    if updated.rows_affected == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Token {} not found", id))),
        ));
    }

    Ok(Json(ApiResponse::success("Token revoked".to_string())))
}
