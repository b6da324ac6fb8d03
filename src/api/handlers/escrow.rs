use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Transaction, TransactionStatus},
    services::{auth::Claims, escrow::EscrowService},
    AppState,
};

use super::super::middleware::get_user_id;

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub listing_id: Uuid,
    pub amount: i64,
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTransactionRequest>,
) -> AppResult<Json<Transaction>> {
    let user_id = get_user_id(&claims)?;

    let escrow_service = EscrowService::new(state.store);
    let transaction = escrow_service
        .create_transaction(
            user_id,
            req.buyer_id,
            req.seller_id,
            req.listing_id,
            req.amount,
        )
        .await?;

    Ok(Json(transaction))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<Transaction>> {
    let user_id = get_user_id(&claims)?;

    let escrow_service = EscrowService::new(state.store);
    let transaction = escrow_service.get_transaction(user_id, transaction_id).await?;

    Ok(Json(transaction))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTransactionStatusRequest {
    pub status: TransactionStatus,
}

pub async fn update_transaction_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
    Json(req): Json<UpdateTransactionStatusRequest>,
) -> AppResult<Json<Transaction>> {
    let user_id = get_user_id(&claims)?;

    let escrow_service = EscrowService::new(state.store);
    let transaction = escrow_service
        .update_transaction_status(user_id, transaction_id, req.status)
        .await?;

    Ok(Json(transaction))
}

pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<Transaction>> {
    let user_id = get_user_id(&claims)?;

    let escrow_service = EscrowService::new(state.store);
    let transaction = escrow_service.confirm_payment(user_id, transaction_id).await?;

    Ok(Json(transaction))
}

pub async fn confirm_shipping(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<Transaction>> {
    let user_id = get_user_id(&claims)?;

    let escrow_service = EscrowService::new(state.store);
    let transaction = escrow_service.confirm_shipping(user_id, transaction_id).await?;

    Ok(Json(transaction))
}

pub async fn confirm_receipt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<Transaction>> {
    let user_id = get_user_id(&claims)?;

    let escrow_service = EscrowService::new(state.store);
    let transaction = escrow_service.confirm_receipt(user_id, transaction_id).await?;

    Ok(Json(transaction))
}
