use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{AuthToken, User},
    services::auth::{AuthService, Claims},
    store::UserStore,
    AppState,
};

use super::super::middleware::get_user_id;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: AuthToken,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let auth_service = AuthService::new(state.store, state.config);
    let (user, token) = auth_service
        .register(
            &req.email,
            &req.password,
            &req.display_name,
            req.phone.as_deref(),
        )
        .await?;

    Ok(Json(AuthResponse { user, token }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let auth_service = AuthService::new(state.store, state.config);
    let (user, token) = auth_service.login(&req.email, &req.password).await?;

    Ok(Json(AuthResponse { user, token }))
}

pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<User>> {
    let user_id = get_user_id(&claims)?;

    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or(crate::error::AppError::UserNotFound)?;

    Ok(Json(user))
}
