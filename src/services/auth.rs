use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{AuthToken, User, UserInsert},
    store::{Store, UserStore},
    validation::{validate_email, validate_password, validate_phone},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub iss: String, // issuer
    pub exp: i64,    // expiry
    pub iat: i64,    // issued at
}

pub struct AuthService {
    store: Arc<dyn Store>,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        phone: Option<&str>,
    ) -> AppResult<(User, AuthToken)> {
        validate_email(email)?;
        validate_password(password)?;
        if let Some(phone) = phone {
            validate_phone(phone)?;
        }
        if display_name.trim().is_empty() {
            return Err(AppError::Validation("Display name is required".to_string()));
        }

        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash =
            hash(password, DEFAULT_COST).map_err(|e| anyhow::anyhow!("Hash error: {}", e))?;

        let user = self
            .store
            .insert_user(UserInsert {
                email: email.to_string(),
                password_hash,
                display_name: display_name.to_string(),
                phone: phone.map(str::to_string),
            })
            .await?;

        let token = self.generate_token(user.id)?;
        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, AuthToken)> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify(password, &user.password_hash)
            .map_err(|e| anyhow::anyhow!("Verify error: {}", e))?
        {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.generate_token(user.id)?;
        Ok((user, token))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let key = DecodingKey::from_secret(self.config.jwt.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &key, &validation)?;
        Ok(token_data.claims)
    }

    fn generate_token(&self, user_id: Uuid) -> AppResult<AuthToken> {
        let now = Utc::now();
        let expires_at =
            now + Duration::seconds(self.config.jwt.access_token_ttl.as_secs() as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.config.jwt.issuer.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let key = EncodingKey::from_secret(self.config.jwt.secret.as_bytes());
        let access_token = encode(&Header::default(), &claims, &key)?;

        Ok(AuthToken {
            access_token,
            expires_at,
        })
    }
}
