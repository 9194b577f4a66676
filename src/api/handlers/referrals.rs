//! Referral panel handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::{ApiResponse, PaginatedResponse, PaginationParams};
use crate::api::handlers::{error_reply, PanelState};
use crate::domain::{ReferralSettings, ReferralStat};

/// Настройки реферальной программы
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferralSettingsDto {
    /// Включена ли программа
    pub enabled: bool,
    /// Бонус рефереру за одобренную покупку
    pub bonus_amount: Decimal,
    /// Минимальный баланс для вывода
    pub min_withdrawal: Decimal,
}

impl From<ReferralSettings> for ReferralSettingsDto {
    fn from(s: ReferralSettings) -> Self {
        Self {
            enabled: s.enabled,
            bonus_amount: s.bonus_amount,
            min_withdrawal: s.min_withdrawal,
        }
    }
}

impl From<ReferralSettingsDto> for ReferralSettings {
    fn from(dto: ReferralSettingsDto) -> Self {
        Self {
            enabled: dto.enabled,
            bonus_amount: dto.bonus_amount,
            min_withdrawal: dto.min_withdrawal,
        }
    }
}

/// Реферальная статистика пользователя
#[derive(Debug, Serialize, ToSchema)]
pub struct ReferralStatDto {
    /// ID пользователя бота
    pub user_id: String,
    /// Кто его пригласил
    pub referred_by: Option<String>,
    /// Сколько пользователей он пригласил
    pub invited_count: u32,
    /// Накопленный бонусный баланс
    pub bonus_balance: Decimal,
    /// Достаточен ли баланс для вывода при текущих настройках
    pub can_withdraw: bool,
}

impl ReferralStatDto {
    fn new(stat: ReferralStat, settings: &ReferralSettings) -> Self {
        Self {
            can_withdraw: stat.can_withdraw(settings),
            user_id: stat.user_id,
            referred_by: stat.referred_by,
            invited_count: stat.invited_count,
            bonus_balance: stat.bonus_balance,
        }
    }
}

/// Настройки реферальной программы сервиса
#[utoipa::path(
    get,
    path = "/api/v1/{service}/referrals/settings",
    tag = "Referrals",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    responses(
        (status = 200, description = "Настройки программы", body = ApiResponse<ReferralSettingsDto>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_referral_settings(
    State(state): State<PanelState>,
    Path(service): Path<String>,
) -> Result<Json<ApiResponse<ReferralSettingsDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.referrals.settings(&service).await {
        Ok(settings) => Ok(Json(ApiResponse::success(settings.into()))),
        Err(e) => Err(error_reply("Failed to load referral settings", e)),
    }
}

/// Сохранение настроек реферальной программы
#[utoipa::path(
    put,
    path = "/api/v1/{service}/referrals/settings",
    tag = "Referrals",
    params(
        ("service" = String, Path, description = "Тег сервиса")
    ),
    request_body = ReferralSettingsDto,
    responses(
        (status = 200, description = "Настройки сохранены", body = ApiResponse<ReferralSettingsDto>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_referral_settings(
    State(state): State<PanelState>,
    Path(service): Path<String>,
    Json(request): Json<ReferralSettingsDto>,
) -> Result<Json<ApiResponse<ReferralSettingsDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.referrals.update_settings(&service, request.into()).await {
        Ok(saved) => Ok(Json(ApiResponse::success(saved.into()))),
        Err(e) => Err(error_reply("Failed to save referral settings", e)),
    }
}

/// Реферальная статистика пользователей
#[utoipa::path(
    get,
    path = "/api/v1/{service}/referrals/users",
    tag = "Referrals",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Страница статистики", body = ApiResponse<PaginatedResponse<ReferralStatDto>>),
        (status = 404, description = "Неизвестный сервис")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_referral_stats(
    State(state): State<PanelState>,
    Path(service): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<ReferralStatDto>>>, (StatusCode, Json<ApiResponse<()>>)>
{
    let settings = match state.referrals.settings(&service).await {
        Ok(settings) => settings,
        Err(e) => return Err(error_reply("Failed to load referral settings", e)),
    };

    match state.referrals.list_stats(&service).await {
        Ok(stats) => {
            let dtos: Vec<ReferralStatDto> = stats
                .into_iter()
                .map(|stat| ReferralStatDto::new(stat, &settings))
                .collect();
            Ok(Json(ApiResponse::success(PaginatedResponse::paginate(
                dtos, &params,
            ))))
        }
        Err(e) => Err(error_reply("Failed to list referral stats", e)),
    }
}

/// Статистика одного пользователя
#[utoipa::path(
    get,
    path = "/api/v1/{service}/referrals/users/{user_id}",
    tag = "Referrals",
    params(
        ("service" = String, Path, description = "Тег сервиса"),
        ("user_id" = String, Path, description = "ID пользователя бота")
    ),
    responses(
        (status = 200, description = "Статистика пользователя", body = ApiResponse<ReferralStatDto>),
        (status = 404, description = "Записи нет")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_referral_stat(
    State(state): State<PanelState>,
    Path((service, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ReferralStatDto>>, (StatusCode, Json<ApiResponse<()>>)> {
    let settings = match state.referrals.settings(&service).await {
        Ok(settings) => settings,
        Err(e) => return Err(error_reply("Failed to load referral settings", e)),
    };

    match state.referrals.stat_for(&service, &user_id).await {
        Ok(Some(stat)) => Ok(Json(ApiResponse::success(ReferralStatDto::new(
            stat, &settings,
        )))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!(
                "No referral record for user {}",
                user_id
            ))),
        )),
        Err(e) => Err(error_reply("Failed to load referral stat", e)),
    }
}
