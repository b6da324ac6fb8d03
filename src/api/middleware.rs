use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::auth::{AuthService, Claims},
    AppState,
};

/// Authentication middleware: requires a valid bearer token and stashes the
/// claims in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let auth_service = AuthService::new(state.store.clone(), state.config.clone());
    let claims = auth_service.validate_token(token)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Like [`auth_middleware`] but for public routes that behave differently
/// for logged-in users (e.g. a listing detail marking the viewer as owner):
/// a valid token attaches claims, anything else passes through anonymously.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    if let Some(token) = token {
        let auth_service = AuthService::new(state.store.clone(), state.config.clone());
        if let Ok(claims) = auth_service.validate_token(token) {
            request.extensions_mut().insert(claims);
        }
    }

    next.run(request).await
}

/// Extract user_id from validated claims.
pub fn get_user_id(claims: &Claims) -> AppResult<Uuid> {
    Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)
}
