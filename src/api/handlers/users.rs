use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Profile, ProfileUpdate, User},
    services::{
        auth::Claims,
        kyc::{KycService, VerificationResult},
    },
    store::UserStore,
    validation::validate_phone,
    AppState,
};

use super::super::middleware::get_user_id;

pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
    let user_id = get_user_id(&claims)?;

    if let Some(phone) = &update.phone {
        validate_phone(phone)?;
    }
    if let Some(display_name) = &update.display_name {
        if display_name.trim().is_empty() {
            return Err(AppError::Validation("Display name is required".to_string()));
        }
    }

    let user = state
        .store
        .update_profile(user_id, update)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(user))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    let kyc_service = KycService::new(state.store);
    let profile = kyc_service.get_profile(user_id).await?;

    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct VerifyIdentityRequest {
    pub user_id: Uuid,
}

pub async fn verify_identity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<VerifyIdentityRequest>,
) -> AppResult<Json<VerificationResult>> {
    let user_id = get_user_id(&claims)?;

    let kyc_service = KycService::new(state.store);
    let result = kyc_service.verify_identity(user_id, req.user_id).await?;

    Ok(Json(result))
}
