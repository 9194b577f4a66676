//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::{create_token, hash_password, verify_password, JwtConfig};
use crate::infrastructure::database::entities::user;

/// Auth state for authentication handlers
#[derive(Clone)]
pub struct AuthHandlerState {
    pub db: sea_orm::DatabaseConnection,
    pub jwt_config: JwtConfig,
}

/// Запрос на авторизацию
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "username": "admin",
    "password": "secret123"
}))]
pub struct LoginRequest {
    /// Имя пользователя или email
    pub username: String,
    /// Пароль
    pub password: String,
}

/// Ответ на успешную авторизацию
///
/// Содержит JWT-токен для последующих запросов.
/// Токен передаётся в заголовке `Authorization: Bearer <token>`
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access-токен для авторизации
    pub token: String,
    /// Тип токена (всегда `Bearer`)
    pub token_type: String,
    /// Время жизни токена в секундах
    pub expires_in: i64,
    /// Информация о пользователе
    pub user: UserInfo,
}

/// Информация о пользователе
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    /// Уникальный идентификатор пользователя (UUID)
    pub id: String,
    /// Имя пользователя
    pub username: String,
    /// Email
    pub email: String,
    /// Роль: `admin`, `operator`, `viewer`
    pub role: String,
}

impl From<user::Model> for UserInfo {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role.as_str().to_string(),
        }
    }
}

/// Запрос на регистрацию нового пользователя
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Имя пользователя (от 3 до 50 символов, уникальное)
    pub username: String,
    /// Email-адрес (уникальный)
    pub email: String,
    /// Пароль (минимум 8 символов)
    pub password: String,
}

/// Запрос на смену пароля
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Текущий пароль
    pub current_password: String,
    /// Новый пароль (минимум 8 символов)
    pub new_password: String,
}

/// Авторизация пользователя
///
/// Возвращает JWT-токен при успешной аутентификации.
/// Можно использовать как имя пользователя, так и email в поле `username`.
/// Если аккаунт деактивирован — вернёт 401.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Успешная авторизация, возвращает JWT-токен", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Неверные учётные данные или аккаунт деактивирован")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ApiResponse<LoginResponse>>)> {
    // Find user by username or email
    let found = user::Entity::find()
        .filter(
            user::Column::Username
                .eq(&request.username)
                .or(user::Column::Email.eq(&request.username)),
        )
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        })?;

    let Some(found) = found else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid credentials")),
        ));
    };

    // Check if user is active
    if !found.is_active {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Account is disabled")),
        ));
    }

    // Verify password
    let password_valid = verify_password(&request.password, &found.password_hash).unwrap_or(false);
    if !password_valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid credentials")),
        ));
    }

    // Update last login time
    let mut active_user: user::ActiveModel = found.clone().into();
    active_user.last_login_at = Set(Some(Utc::now()));
    active_user.update(&state.db).await.ok();

    // Create JWT token
    let role_str = found.role.as_str();
    let token = create_token(&found.id, &found.username, role_str, &state.jwt_config).map_err(
        |e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        },
    )?;

    let response = LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expiration_hours * 3600,
        user: found.into(),
    };

    Ok(Json(ApiResponse::success(response)))
}

/// Регистрация нового пользователя
///
/// Создаёт нового пользователя с ролью `viewer` (по умолчанию).
/// Логин и email должны быть уникальными.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Пользователь успешно создан", body = ApiResponse<UserInfo>),
        (status = 400, description = "Ошибка валидации (короткий пароль, невалидный email и т.д.)"),
        (status = 409, description = "Пользователь с таким логином или email уже существует")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), (StatusCode, Json<ApiResponse<UserInfo>>)> {
    // Validate input
    if request.username.len() < 3 || request.username.len() > 50 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Username must be 3-50 characters")),
        ));
    }

    if request.password.len() < 8 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Password must be at least 8 characters")),
        ));
    }

    if !request.email.contains('@') {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Invalid email address")),
        ));
    }

    // Check uniqueness
    let existing = user::Entity::find()
        .filter(
            user::Column::Username
                .eq(&request.username)
                .or(user::Column::Email.eq(&request.email)),
        )
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        })?;

    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Username or email already taken")),
        ));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )
    })?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        username: Set(request.username),
        email: Set(request.email),
        password_hash: Set(password_hash),
        role: Set(user::UserRole::Viewer),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
    };

    let created = new_user.insert(&state.db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

/// Текущий пользователь
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Информация о текущем пользователе", body = ApiResponse<UserInfo>),
        (status = 404, description = "Пользователь не найден")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserInfo>>, (StatusCode, Json<ApiResponse<UserInfo>>)> {
    let found = user::Entity::find_by_id(&auth_user.user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        })?;

    match found {
        Some(u) => Ok(Json(ApiResponse::success(u.into()))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("User not found")),
        )),
    }
}

/// Смена пароля текущего пользователя
#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    tag = "Authentication",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Пароль успешно изменён", body = ApiResponse<String>),
        (status = 400, description = "Слишком короткий новый пароль"),
        (status = 401, description = "Текущий пароль неверен")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AuthHandlerState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ApiResponse<String>>)> {
    if request.new_password.len() < 8 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Password must be at least 8 characters")),
        ));
    }

    let found = user::Entity::find_by_id(&auth_user.user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        })?;

    let Some(found) = found else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("User not found")),
        ));
    };

    let current_valid =
        verify_password(&request.current_password, &found.password_hash).unwrap_or(false);
    if !current_valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Current password is incorrect")),
        ));
    }

    let new_hash = hash_password(&request.new_password).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )
    })?;

    let mut active_user: user::ActiveModel = found.into();
    active_user.password_hash = Set(new_hash);
    active_user.updated_at = Set(Utc::now());
    active_user.update(&state.db).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )
    })?;

    Ok(Json(ApiResponse::success("Password changed".to_string())))
}
