//! Identity verification stub. No external KYC provider is wired up yet:
//! a verification request from the profile owner is approved unconditionally
//! and simply flips `is_verified`.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Profile,
    services::require_party,
    store::{Store, UserStore},
};

#[derive(Debug, Serialize)]
pub struct VerificationResult {
    pub verified: bool,
}

pub struct KycService {
    store: Arc<dyn Store>,
}

impl KycService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn verify_identity(
        &self,
        caller: Uuid,
        user_id: Uuid,
    ) -> AppResult<VerificationResult> {
        require_party(caller, user_id, "profile owner")?;

        let user = self
            .store
            .mark_verified(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!(user_id = %user.id, "identity verification stub approved");

        Ok(VerificationResult {
            verified: user.is_verified,
        })
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(user.profile())
    }

    pub async fn is_user_verified(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .store
            .find_user(user_id)
            .await?
            .map(|u| u.is_verified)
            .unwrap_or(false))
    }
}
