//! Transaction panel handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::api::handlers::{error_reply, PanelState};
use crate::application::services::TransactionFilter;
use crate::domain::{Transaction, TransactionState};

/// Транзакция (покупка слота)
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDto {
    /// ID транзакции
    pub id: String,
    /// Купленный слот
    pub slot_id: String,
    /// Покупатель (ID пользователя бота)
    pub user_id: String,
    /// Начало подписки
    pub start_time: Option<DateTime<Utc>>,
    /// Конец подписки
    pub end_time: Option<DateTime<Utc>>,
    /// Когда одобрена админом
    pub approved_at: Option<DateTime<Utc>>,
    /// Выданный логин
    pub assign_to: Option<String>,
    /// Скрыта ли из панелей
    pub hidden: bool,
    /// Состояние на момент ответа: `pending`, `active`, `expired`
    pub state: String,
    /// Дата создания
    pub created_at: DateTime<Utc>,
}

impl TransactionDto {
    pub(crate) fn from_transaction(tx: Transaction, now: DateTime<Utc>) -> Self {
        let state = match tx.state_at(now) {
            TransactionState::Pending => "pending",
            TransactionState::Active => "active",
            TransactionState::Expired => "expired",
        };
        Self {
            state: state.to_string(),
            id: tx.id,
            slot_id: tx.slot_id,
            user_id: tx.user_id,
            start_time: tx.start_time,
            end_time: tx.end_time,
            approved_at: tx.approved_at,
            assign_to: tx.assign_to,
            hidden: tx.hidden,
            created_at: tx.created_at,
        }
    }
}

/// Запрос на ручное создание транзакции
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    /// ID транзакции. Если не указан — генерируется UUID
    pub id: Option<String>,
    /// Покупаемый слот
    pub slot_id: String,
    /// Покупатель
    pub user_id: String,
}

/// Запрос на одобрение
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveRequest {
    /// Конкретный логин. Если не указан — выбирается автоматически
    pub credential_id: Option<String>,
}

/// Итог массовой очистки
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkOutcomeDto {
    /// Сколько истёкших транзакций обработано
    pub total: usize,
    /// Успешно скрыто
    pub hidden: usize,
    /// С ошибками (частичный сбой)
    pub failed: usize,
}

/// Фильтры списка транзакций
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TransactionListQuery {
    /// Фильтр по состоянию: `pending`, `active`, `expired`
    pub state: Option<String>,
    /// Показывать скрытые (по умолчанию false)
    #[serde(default)]
    pub include_hidden: bool,
    /// Номер страницы (с 1)
    #[serde(default = "crate::api::dto::default_page")]
    pub page: u32,
    /// Размер страницы (1–100)
    #[serde(default = "crate::api::dto::default_limit")]
    pub limit: u32,
}

fn parse_state(s: &str) -> Option<TransactionState> {
    match s {
        "pending" => Some(TransactionState::Pending),
        "active" => Some(TransactionState::Active),
        "expired" => Some(TransactionState::Expired),
        _ => None,
    }
}

/// Список транзакций сервиса
///
/// Состояние пересчитывается на момент запроса, фильтр `state`
/// применяется после пересчёта.
#[utoipa::path(
    get,
    path = "/api/v1/{service}/transactions",
    tag = "Transactions",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        TransactionListQuery
    ),
    responses(
        (status = 200, description = "Страница транзакций", body = ApiResponse<PaginatedResponse<TransactionDto>>),
        (status = 400, description = "Неизвестное состояние в фильтре"),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_transactions(
    State(state): State<PanelState>,
    Path(service): Path<String>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<TransactionDto>>>, (StatusCode, Json<ApiResponse<()>>)>
{
    let state_filter = match query.state.as_deref() {
        Some(raw) => match parse_state(raw) {
            Some(parsed) => Some(parsed),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error(format!("Unknown state filter: {}", raw))),
                ));
            }
        },
        None => None,
    };

    let filter = TransactionFilter {
        state: state_filter,
        include_hidden: query.include_hidden,
    };

    match state.transactions.list(&service, &filter).await {
        Ok(transactions) => {
            let now = Utc::now();
            let dtos: Vec<TransactionDto> = transactions
                .into_iter()
                .map(|tx| TransactionDto::from_transaction(tx, now))
                .collect();
            let page = PaginatedResponse::paginate(
                dtos,
                &PaginationParams {
                    page: query.page,
                    limit: query.limit,
                },
            );
            Ok(Json(ApiResponse::success(page)))
        }
        Err(e) => Err(error_reply("Failed to list transactions", e)),
    }
}

/// Получение транзакции по ID
#[utoipa::path(
    get,
    path = "/api/v1/{service}/transactions/{id}",
    tag = "Transactions",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID транзакции")
    ),
    responses(
        (status = 200, description = "Транзакция", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Транзакция не найдена")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_transaction(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<TransactionDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.transactions.get(&service, &id).await {
        Ok(Some(tx)) => Ok(Json(ApiResponse::success(TransactionDto::from_transaction(
            tx,
            Utc::now(),
        )))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Transaction {} not found", id))),
        )),
        Err(e) => Err(error_reply("Failed to get transaction", e)),
    }
}

/// Ручное создание транзакции
#[utoipa::path(
    post,
    path = "/api/v1/{service}/transactions",
    tag = "Transactions",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Транзакция создана", body = ApiResponse<TransactionDto>),
        (status = 409, description = "Транзакция с таким ID уже существует")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_transaction(
    State(state): State<PanelState>,
    Path(service): Path<String>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionDto>>), (StatusCode, Json<ApiResponse<()>>)> {
    let id = request
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let tx = Transaction::new(id, request.slot_id, request.user_id);

    match state.transactions.create(&service, tx).await {
        Ok(saved) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(TransactionDto::from_transaction(
                saved,
                Utc::now(),
            ))),
        )),
        Err(e) => Err(error_reply("Failed to create transaction", e)),
    }
}

/// Одобрение оплаты
///
/// Выдаёт логин (указанный или первый свободный), увеличивает его
/// счётчик использования и открывает окно подписки по длительности
/// слота.
#[utoipa::path(
    post,
    path = "/api/v1/{service}/transactions/{id}/approve",
    tag = "Transactions",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID транзакции")
    ),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Транзакция одобрена", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Транзакция, слот или логин не найдены"),
        (status = 409, description = "Уже одобрена или у логина нет свободных мест")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_transaction(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<ApiResponse<TransactionDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state
        .transactions
        .approve(&service, &id, request.credential_id.as_deref())
        .await
    {
        Ok(tx) => Ok(Json(ApiResponse::success(TransactionDto::from_transaction(
            tx,
            Utc::now(),
        )))),
        Err(e) => Err(error_reply("Failed to approve transaction", e)),
    }
}

/// Скрытие транзакции
#[utoipa::path(
    post,
    path = "/api/v1/{service}/transactions/{id}/hide",
    tag = "Transactions",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID транзакции")
    ),
    responses(
        (status = 200, description = "Транзакция скрыта", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Транзакция не найдена")
    ),
    security(("bearer_auth" = []))
)]
pub async fn hide_transaction(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<TransactionDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.transactions.set_hidden(&service, &id, true).await {
        Ok(tx) => Ok(Json(ApiResponse::success(TransactionDto::from_transaction(
            tx,
            Utc::now(),
        )))),
        Err(e) => Err(error_reply("Failed to hide transaction", e)),
    }
}

/// Возврат транзакции в панели
#[utoipa::path(
    post,
    path = "/api/v1/{service}/transactions/{id}/unhide",
    tag = "Transactions",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("id" = String, Path, description = "ID транзакции")
    ),
    responses(
        (status = 200, description = "Транзакция снова видна", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Транзакция не найдена")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unhide_transaction(
    State(state): State<PanelState>,
    Path((service, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<TransactionDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.transactions.set_hidden(&service, &id, false).await {
        Ok(tx) => Ok(Json(ApiResponse::success(TransactionDto::from_transaction(
            tx,
            Utc::now(),
        )))),
        Err(e) => Err(error_reply("Failed to unhide transaction", e)),
    }
}

/// Массовая очистка истёкших транзакций
///
/// Скрывает каждую истёкшую транзакцию и освобождает место на её
/// логине. Ошибки по отдельным элементам суммируются в итог —
/// частичный сбой возможен.
#[utoipa::path(
    post,
    path = "/api/v1/{service}/transactions/clear-expired",
    tag = "Transactions",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    responses(
        (status = 200, description = "Итог очистки", body = ApiResponse<BulkOutcomeDto>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_expired_transactions(
    State(state): State<PanelState>,
    Path(service): Path<String>,
) -> Result<Json<ApiResponse<BulkOutcomeDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.transactions.clear_expired(&service).await {
        Ok(outcome) => Ok(Json(ApiResponse::success(BulkOutcomeDto {
            total: outcome.total,
            hidden: outcome.hidden,
            failed: outcome.failed,
        }))),
        Err(e) => Err(error_reply("Failed to clear expired transactions", e)),
    }
}
