//! Credential panel handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::api::handlers::{error_reply, PanelState};
use crate::domain::Credential;

/// Общий логин, привязанный к слоту
#[derive(Debug, Serialize, ToSchema)]
pub struct CredentialDto {
    /// ID записи
    pub id: String,
    /// Email аккаунта
    pub email: String,
    /// Пароль аккаунта
    pub password: String,
    /// Доп. секрет (PIN профиля, 2FA), опционально
    pub secret: Option<String>,
    /// Когда истекает сам аккаунт
    pub expiry_date: Option<DateTime<Utc>>,
    /// Заблокирована ли запись
    pub locked: bool,
    /// Максимум одновременных покупателей
    pub max_usage: u32,
    /// Текущее количество покупателей
    pub usage_count: u32,
    /// Слот, под которым продаётся логин
    pub belongs_to_slot: String,
    /// Дата создания
    pub created_at: DateTime<Utc>,
    /// Дата последнего обновления
    pub updated_at: DateTime<Utc>,
}

impl From<Credential> for CredentialDto {
    fn from(c: Credential) -> Self {
        Self {
            id: c.id,
            email: c.email,
            password: c.password,
            secret: c.secret,
            expiry_date: c.expiry_date,
            locked: c.locked,
            max_usage: c.max_usage,
            usage_count: c.usage_count,
            belongs_to_slot: c.belongs_to_slot,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Запрос на создание логина
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCredentialRequest {
    /// ID записи. Если не указан — генерируется UUID
    #[validate(length(max = 64))]
    pub id: Option<String>,
    /// Email аккаунта
    #[validate(email)]
    pub email: String,
    /// Пароль аккаунта
    #[validate(length(min = 1))]
    pub password: String,
    /// Доп. секрет
    pub secret: Option<String>,
    /// Когда истекает аккаунт
    pub expiry_date: Option<DateTime<Utc>>,
    /// Максимум одновременных покупателей
    #[validate(range(min = 1))]
    pub max_usage: u32,
    /// Слот, под которым продаётся логин
    #[validate(length(min = 1))]
    pub belongs_to_slot: String,
}

/// Запрос на обновление логина (partial update)
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCredentialRequest {
    /// Новый email
    #[validate(email)]
    pub email: Option<String>,
    /// Новый пароль
    #[validate(length(min = 1))]
    pub password: Option<String>,
    /// Новый секрет
    pub secret: Option<String>,
    /// Новый срок действия аккаунта
    pub expiry_date: Option<DateTime<Utc>>,
    /// Новый лимит покупателей
    #[validate(range(min = 1))]
    pub max_usage: Option<u32>,
    /// Перенос под другой слот
    pub belongs_to_slot: Option<String>,
}

/// Фильтры списка логинов
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CredentialListQuery {
    /// Только логины этого слота
    pub slot_id: Option<String>,
    /// Только заблокированные / незаблокированные
    pub locked: Option<bool>,
    /// Только логины со свободными местами, незаблокированные и
    /// неистёкшие
    pub assignable: Option<bool>,
}

fn validation_reply(e: validator::ValidationErrors) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(format!("Validation failed: {}", e))),
    )
}

/// Список логинов сервиса
#[utoipa::path(
    get,
    path = "/api/v1/{service}/credentials",
    tag = "Credentials",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        CredentialListQuery
    ),
    responses(
        (status = 200, description = "Список логинов", body = ApiResponse<Vec<CredentialDto>>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_credentials(
    State(state): State<PanelState>,
    Path(service): Path<String>,
    Query(query): Query<CredentialListQuery>,
) -> Result<Json<ApiResponse<Vec<CredentialDto>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let credentials = match query.slot_id.as_deref() {
        Some(slot_id) => state.credentials.list_for_slot(&service, slot_id).await,
        None => state.credentials.list(&service).await,
    };

    match credentials {
        Ok(credentials) => {
            let now = Utc::now();
            let filtered: Vec<CredentialDto> = credentials
                .into_iter()
                .filter(|c| query.locked.map_or(true, |locked| c.locked == locked))
                .filter(|c| {
                    query
                        .assignable
                        .map_or(true, |wanted| c.is_assignable_at(now) == wanted)
                })
                .map(Into::into)
                .collect();
            Ok(Json(ApiResponse::success(filtered)))
        }
        Err(e) => Err(error_reply("Failed to list credentials", e)),
    }
}

/// Получение логина по ID
#[utoipa::path(
    get,
    path = "/api/v1/{service}/credentials/{id}",
    tag = "Credentials",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID логина")
    ),
    responses(
        (status = 200, description = "Логин", body = ApiResponse<CredentialDto>),
        (status = 404, description = "Логин не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_credential(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CredentialDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.credentials.get(&service, &id).await {
        Ok(Some(credential)) => Ok(Json(ApiResponse::success(credential.into()))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Credential {} not found", id))),
        )),
        Err(e) => Err(error_reply("Failed to get credential", e)),
    }
}

/// Создание логина
#[utoipa::path(
    post,
    path = "/api/v1/{service}/credentials",
    tag = "Credentials",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    request_body = CreateCredentialRequest,
    responses(
        (status = 201, description = "Логин создан", body = ApiResponse<CredentialDto>),
        (status = 400, description = "Некорректные данные"),
        (status = 409, description = "Логин с таким ID уже существует")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_credential(
    State(state): State<PanelState>,
    Path(service): Path<String>,
    Json(request): Json<CreateCredentialRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CredentialDto>>), (StatusCode, Json<ApiResponse<()>>)> {
    request.validate().map_err(validation_reply)?;

    let now = Utc::now();
    let credential = Credential {
        id: request
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        email: request.email,
        password: request.password,
        secret: request.secret,
        expiry_date: request.expiry_date,
        locked: false,
        max_usage: request.max_usage,
        usage_count: 0,
        belongs_to_slot: request.belongs_to_slot,
        created_at: now,
        updated_at: now,
    };

    match state.credentials.create(&service, credential).await {
        Ok(saved) => Ok((StatusCode::CREATED, Json(ApiResponse::success(saved.into())))),
        Err(e) => Err(error_reply("Failed to create credential", e)),
    }
}

/// Обновление логина
///
/// Partial update — передайте только изменяемые поля.
#[utoipa::path(
    put,
    path = "/api/v1/{service}/credentials/{id}",
    tag = "Credentials",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID логина")
    ),
    request_body = UpdateCredentialRequest,
    responses(
        (status = 200, description = "Логин обновлён", body = ApiResponse<CredentialDto>),
        (status = 404, description = "Логин не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_credential(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
    Json(request): Json<UpdateCredentialRequest>,
) -> Result<Json<ApiResponse<CredentialDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    request.validate().map_err(validation_reply)?;

    let existing = match state.credentials.get(&service, &id).await {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(format!("Credential {} not found", id))),
            ));
        }
        Err(e) => return Err(error_reply("Failed to get credential", e)),
    };

    let updated = Credential {
        id: existing.id.clone(),
        email: request.email.unwrap_or(existing.email),
        password: request.password.unwrap_or(existing.password),
        secret: request.secret.or(existing.secret),
        expiry_date: request.expiry_date.or(existing.expiry_date),
        locked: existing.locked,
        max_usage: request.max_usage.unwrap_or(existing.max_usage),
        usage_count: existing.usage_count,
        belongs_to_slot: request.belongs_to_slot.unwrap_or(existing.belongs_to_slot),
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    match state.credentials.update(&service, updated).await {
        Ok(saved) => Ok(Json(ApiResponse::success(saved.into()))),
        Err(e) => Err(error_reply("Failed to update credential", e)),
    }
}

/// Блокировка логина
///
/// Заблокированный логин не выдаётся покупателям.
#[utoipa::path(
    post,
    path = "/api/v1/{service}/credentials/{id}/lock",
    tag = "Credentials",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID логина")
    ),
    responses(
        (status = 200, description = "Логин заблокирован", body = ApiResponse<CredentialDto>),
        (status = 404, description = "Логин не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn lock_credential(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CredentialDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.credentials.set_locked(&service, &id, true).await {
        Ok(credential) => Ok(Json(ApiResponse::success(credential.into()))),
        Err(e) => Err(error_reply("Failed to lock credential", e)),
    }
}

/// Разблокировка логина
#[utoipa::path(
    post,
    path = "/api/v1/{service}/credentials/{id}/unlock",
    tag = "Credentials",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID логина")
    ),
    responses(
        (status = 200, description = "Логин разблокирован", body = ApiResponse<CredentialDto>),
        (status = 404, description = "Логин не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unlock_credential(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CredentialDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.credentials.set_locked(&service, &id, false).await {
        Ok(credential) => Ok(Json(ApiResponse::success(credential.into()))),
        Err(e) => Err(error_reply("Failed to unlock credential", e)),
    }
}

/// Сброс счётчика использования
///
/// Используется после смены пароля на самом аккаунте.
#[utoipa::path(
    post,
    path = "/api/v1/{service}/credentials/{id}/reset-usage",
    tag = "Credentials",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID логина")
    ),
    responses(
        (status = 200, description = "Счётчик сброшен", body = ApiResponse<CredentialDto>),
        (status = 404, description = "Логин не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reset_credential_usage(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CredentialDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.credentials.reset_usage(&service, &id).await {
        Ok(credential) => Ok(Json(ApiResponse::success(credential.into()))),
        Err(e) => Err(error_reply("Failed to reset usage", e)),
    }
}

/// Удаление логина
#[utoipa::path(
    delete,
    path = "/api/v1/{service}/credentials/{id}",
    tag = "Credentials",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID логина")
    ),
    responses(
        (status = 200, description = "Логин удалён"),
        (status = 404, description = "Логин не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_credential(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.credentials.delete(&service, &id).await {
        Ok(()) => Ok(Json(ApiResponse::success("Credential deleted".to_string()))),
        Err(e) => Err(error_reply("Failed to delete credential", e)),
    }
}
