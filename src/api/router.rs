//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::*;
use crate::api::handlers::{
    access_settings, admin_config, api_tokens, auth, copy, credentials, devices, health, metrics,
    referrals, slots, status, transactions, ui_restrictions, PanelState,
};
use crate::application::services::{AccessControlService, AdminDirectory};
use crate::auth::jwt::JwtConfig;
use crate::auth::middleware::{
    access_guard, auth_middleware, superior_guard, AccessGuardState, AuthState,
};
use crate::config::AppConfig;
use crate::notifications::{create_notification_state, ws_notifications_handler, SharedEventBus};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token или API-токен (ssa_…)"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        auth::get_current_user,
        auth::change_password,
        // API Tokens
        api_tokens::list_tokens,
        api_tokens::create_token,
        api_tokens::revoke_token,
        // Slots
        slots::list_slots,
        slots::get_slot,
        slots::create_slot,
        slots::update_slot,
        slots::enable_slot,
        slots::disable_slot,
        slots::delete_slot,
        // Credentials
        credentials::list_credentials,
        credentials::get_credential,
        credentials::create_credential,
        credentials::update_credential,
        credentials::lock_credential,
        credentials::unlock_credential,
        credentials::reset_credential_usage,
        credentials::delete_credential,
        // Transactions
        transactions::list_transactions,
        transactions::get_transaction,
        transactions::create_transaction,
        transactions::approve_transaction,
        transactions::hide_transaction,
        transactions::unhide_transaction,
        transactions::clear_expired_transactions,
        // Status
        status::get_status,
        // Copy
        copy::get_copy,
        copy::update_copy,
        // Referrals
        referrals::get_referral_settings,
        referrals::update_referral_settings,
        referrals::list_referral_stats,
        referrals::get_referral_stat,
        // Admin config
        admin_config::get_admin_config,
        admin_config::update_admin_config,
        // Access control
        access_settings::list_access_settings,
        access_settings::get_access_setting,
        access_settings::upsert_access_setting,
        access_settings::delete_access_setting,
        access_settings::my_policy,
        ui_restrictions::list_restrictions,
        ui_restrictions::create_restriction,
        ui_restrictions::update_restriction,
        ui_restrictions::delete_restriction,
        // Devices
        devices::register_device,
        devices::list_devices,
        devices::deactivate_device,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            PaginatedResponse<transactions::TransactionDto>,
            PaginationParams,
            EmptyData,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::UserInfo,
            auth::ChangePasswordRequest,
            // API Tokens
            api_tokens::CreateTokenRequest,
            api_tokens::TokenResponse,
            api_tokens::CreatedTokenResponse,
            // Slots
            slots::SlotDto,
            slots::CreateSlotRequest,
            slots::UpdateSlotRequest,
            // Credentials
            credentials::CredentialDto,
            credentials::CreateCredentialRequest,
            credentials::UpdateCredentialRequest,
            // Transactions
            transactions::TransactionDto,
            transactions::CreateTransactionRequest,
            transactions::ApproveRequest,
            transactions::BulkOutcomeDto,
            // Status
            status::StatusDto,
            // Copy
            copy::BotCopyDto,
            // Referrals
            referrals::ReferralSettingsDto,
            referrals::ReferralStatDto,
            // Admin config / access control
            admin_config::AdminConfigDto,
            access_settings::AccessSettingDto,
            access_settings::UpsertAccessSettingRequest,
            access_settings::AccessPolicyDto,
            ui_restrictions::UiRestrictionDto,
            ui_restrictions::UpsertRestrictionRequest,
            // Devices
            devices::DeviceDto,
            devices::RegisterDeviceRequest,
            // Health
            health::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Проверка состояния сервера. Используйте для health-check мониторинга (uptime, ping, readiness)."),
        (name = "Authentication", description = "Аутентификация админов консоли: вход (JWT), регистрация, смена пароля. Токен возвращается в поле `token` и передаётся в заголовке `Authorization: Bearer <token>`."),
        (name = "API Tokens", description = "Токены для бот-процесса. Полный токен отображается **один раз** при создании, передаётся в заголовке `Authorization`."),
        (name = "Slots", description = "Тарифные планы подписки. Слот задаёт длительность (`duration_hours`) и цену (`required_amount`); выключенный слот не продаётся."),
        (name = "Credentials", description = "Общие логины, привязанные к слотам. Отслеживается заполненность (`usage_count`/`max_usage`) и блокировка. Заблокированный или заполненный логин не выдаётся покупателям."),
        (name = "Transactions", description = "Покупки слотов. Состояние (`pending`/`active`/`expired`) пересчитывается по часам на каждый запрос, серверного автомата состояний нет. Массовая очистка скрывает истёкшие и освобождает логины; частичный сбой суммируется в итог."),
        (name = "Status", description = "Статус-панель: активные и недавно истёкшие подписки (скользящее окно 24 часа), счётчики и число уже отправленных уведомлений об истечении."),
        (name = "Copy", description = "Тексты, которые бот отправляет покупателям. Отдельный набор на каждый сервис."),
        (name = "Referrals", description = "Реферальная программа: настройки бонусов и статистика приглашений по пользователям."),
        (name = "Admin Config", description = "Списки старших и младших админов. Старшие обходят все ограничения и управляют правами. Только для старших админов."),
        (name = "Access Control", description = "Права младших админов: запрещённые вкладки, режим read-only, ограничения элементов консоли (`blur`/`hide`/`disable`). Админ без записи — без ограничений. Изменения применяются сразу через событие."),
        (name = "Devices", description = "Регистрация устройств для push-уведомлений об истечениях и одобрениях."),
        (name = "WebSocket Notifications", description = "Real-time уведомления через WebSocket. Подключение: `ws://host:port/api/v1/notifications/ws`. Поддерживается фильтрация по `service` и `event_types` через query-параметры. События: `slot_changed`, `credential_changed`, `transaction_approved`, `transaction_hidden`, `transaction_expired`, `bulk_cleanup_completed`, `copy_updated`, `referral_settings_updated`, `admin_config_updated`, `access_settings_changed`, `ui_restriction_changed`, `error`."),
    ),
    info(
        title = "SubShare Admin API",
        version = "1.0.0",
        description = "REST API админ-консоли сервиса продажи совместных подписок.

## Архитектура

Данные бота (слоты, логины, транзакции, тексты, рефералы) лежат в
документном хранилище с независимой партицией на каждый сервис —
партиция выбирается тегом в URL: `/api/v1/{service}/…`. Права админов,
API-токены и устройства лежат в реляционной базе.

## Аутентификация

1. **JWT Bearer Token** — получите токен через `POST /api/v1/auth/login`, передавайте в заголовке `Authorization: Bearer <token>`
2. **API-токен** — создайте через `POST /api/v1/api-tokens`, передавайте в заголовке `Authorization` (префикс `ssa_`)

## Ограничения доступа

Для каждого младшего админа могут быть заданы запрещённые вкладки и
режим read-only; вкладка берётся из URL. Старшие админы (см.
`/api/v1/admin-config`) обходят все ограничения.

## Формат ответов

Все REST-ответы обёрнуты в стандартную оболочку:
```json
{\"success\": true, \"data\": {...}, \"error\": null}
```

При ошибке:
```json
{\"success\": false, \"data\": null, \"error\": \"описание ошибки\"}
```

## Пагинация

Эндпоинты со списками поддерживают параметры `page` (от 1) и `limit` (по умолчанию 50).",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
#[allow(clippy::too_many_arguments)]
pub fn create_api_router(
    db: DatabaseConnection,
    jwt_config: JwtConfig,
    panel: PanelState,
    access: Arc<AccessControlService>,
    admins: Arc<AdminDirectory>,
    event_bus: SharedEventBus,
    app_cfg: &AppConfig,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let auth_state = AuthState {
        jwt_config: jwt_config.clone(),
        db: db.clone(),
    };

    let guard_state = AccessGuardState {
        access: access.clone(),
        admins: admins.clone(),
    };

    // ── Service-scoped panel routes: ONE nested router so matchit sees
    // every parametric segment in one tree ───────────────────────────
    let panel_routes = Router::new()
        // --- Slots ---
        .route("/slots", get(slots::list_slots).post(slots::create_slot))
        .route(
            "/slots/{id}",
            get(slots::get_slot)
                .put(slots::update_slot)
                .delete(slots::delete_slot),
        )
        .route("/slots/{id}/enable", post(slots::enable_slot))
        .route("/slots/{id}/disable", post(slots::disable_slot))
        // --- Credentials ---
        .route(
            "/credentials",
            get(credentials::list_credentials).post(credentials::create_credential),
        )
        .route(
            "/credentials/{id}",
            get(credentials::get_credential)
                .put(credentials::update_credential)
                .delete(credentials::delete_credential),
        )
        .route("/credentials/{id}/lock", post(credentials::lock_credential))
        .route("/credentials/{id}/unlock", post(credentials::unlock_credential))
        .route(
            "/credentials/{id}/reset-usage",
            post(credentials::reset_credential_usage),
        )
        // --- Transactions ---
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/transactions/clear-expired",
            post(transactions::clear_expired_transactions),
        )
        .route("/transactions/{id}", get(transactions::get_transaction))
        .route(
            "/transactions/{id}/approve",
            post(transactions::approve_transaction),
        )
        .route("/transactions/{id}/hide", post(transactions::hide_transaction))
        .route(
            "/transactions/{id}/unhide",
            post(transactions::unhide_transaction),
        )
        // --- Status panel ---
        .route("/status", get(status::get_status))
        // --- Copy ---
        .route("/copy", get(copy::get_copy).put(copy::update_copy))
        // --- Referrals ---
        .route(
            "/referrals/settings",
            get(referrals::get_referral_settings).put(referrals::update_referral_settings),
        )
        .route("/referrals/users", get(referrals::list_referral_stats))
        .route(
            "/referrals/users/{user_id}",
            get(referrals::get_referral_stat),
        )
        // tab/modify restrictions, then identity
        .layer(middleware::from_fn_with_state(
            guard_state.clone(),
            access_guard,
        ))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(panel);

    // ── Other states / routers ─────────────────────────────────────

    let auth_handler_state = auth::AuthHandlerState {
        db: db.clone(),
        jwt_config: jwt_config.clone(),
    };

    // Brute-force protection on the public auth endpoints
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(app_cfg.rate_limit.login_per_second)
            .burst_size(app_cfg.rate_limit.login_burst)
            .finish()
            .expect("invalid rate limit configuration"),
    );

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (public, rate limited)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(GovernorLayer::new(governor_conf))
        .with_state(auth_handler_state.clone());

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .route("/change-password", put(auth::change_password))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_handler_state);

    // API token routes (superior admins only)
    let token_routes = Router::new()
        .route(
            "/",
            get(api_tokens::list_tokens).post(api_tokens::create_token),
        )
        .route("/{id}", delete(api_tokens::revoke_token))
        .layer(middleware::from_fn_with_state(
            guard_state.clone(),
            superior_guard,
        ))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(api_tokens::TokenHandlerState { db: db.clone() });

    // Admin config routes (superior admins only)
    let admin_config_routes = Router::new()
        .route(
            "/",
            get(admin_config::get_admin_config).put(admin_config::update_admin_config),
        )
        .layer(middleware::from_fn_with_state(
            guard_state.clone(),
            superior_guard,
        ))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(admin_config::AdminConfigState {
            admins: admins.clone(),
        });

    // Access settings routes (superior admins only)
    let access_handler_state = access_settings::AccessHandlerState {
        db: db.clone(),
        access: access.clone(),
        admins: admins.clone(),
        event_bus: event_bus.clone(),
    };
    let access_routes = Router::new()
        .route("/", get(access_settings::list_access_settings))
        .route(
            "/{user_id}",
            get(access_settings::get_access_setting)
                .put(access_settings::upsert_access_setting)
                .delete(access_settings::delete_access_setting),
        )
        .layer(middleware::from_fn_with_state(
            guard_state.clone(),
            superior_guard,
        ))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(access_handler_state.clone());

    // Own-policy route (any authenticated admin)
    let policy_routes = Router::new()
        .route("/policy", get(access_settings::my_policy))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(access_handler_state);

    // UI restriction routes (superior admins only)
    let restriction_routes = Router::new()
        .route(
            "/",
            get(ui_restrictions::list_restrictions).post(ui_restrictions::create_restriction),
        )
        .route(
            "/{id}",
            put(ui_restrictions::update_restriction)
                .delete(ui_restrictions::delete_restriction),
        )
        .layer(middleware::from_fn_with_state(
            guard_state.clone(),
            superior_guard,
        ))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(ui_restrictions::RestrictionHandlerState {
            db: db.clone(),
            event_bus: event_bus.clone(),
        });

    // Device routes (protected)
    let device_routes = Router::new()
        .route(
            "/",
            get(devices::list_devices).post(devices::register_device),
        )
        .route("/{id}", delete(devices::deactivate_device))
        .layer(middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(devices::DeviceHandlerState { db });

    // Notification WebSocket routes (no auth for WebSocket upgrade)
    let notification_state = create_notification_state(event_bus);
    let notification_routes = Router::new()
        .route("/ws", get(ws_notifications_handler))
        .with_state(notification_state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health + metrics
        .route("/health", get(health::health_check))
        .route(
            "/metrics",
            get(metrics::metrics_handler).with_state(metrics::MetricsState {
                handle: prometheus_handle,
            }),
        )
        // Auth
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        // API tokens
        .nest("/api/v1/api-tokens", token_routes)
        // Admin config + access control
        .nest("/api/v1/admin-config", admin_config_routes)
        .nest("/api/v1/access-settings", access_routes)
        .nest("/api/v1/ui-restrictions", restriction_routes)
        .nest("/api/v1/me", policy_routes)
        // Devices
        .nest("/api/v1/devices", device_routes)
        // Notifications WebSocket
        .nest("/api/v1/notifications", notification_routes)
        // Panels — ONE nested router with the service tag as first segment
        .nest("/api/v1/{service}", panel_routes)
        // Middleware (outermost first)
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(middleware::from_fn(metrics::track_metrics)),
        )
}
