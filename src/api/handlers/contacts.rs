use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{ContactRequest, ContactRequestStatus, ContactRequestWithBuyer, ContactStatus},
    services::{auth::Claims, contact_gate::ContactGateService},
    AppState,
};

use super::super::middleware::get_user_id;

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub listing_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub message: Option<String>,
}

pub async fn request_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateContactRequest>,
) -> AppResult<Json<ContactRequest>> {
    let user_id = get_user_id(&claims)?;

    let contact_gate = ContactGateService::new(state.store);
    let request = contact_gate
        .request_contact(
            user_id,
            req.listing_id,
            req.seller_id,
            req.buyer_id,
            req.message.as_deref(),
        )
        .await?;

    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub struct ContactStatusQuery {
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
}

pub async fn get_contact_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ContactStatusQuery>,
) -> AppResult<Json<ContactStatus>> {
    let user_id = get_user_id(&claims)?;

    let contact_gate = ContactGateService::new(state.store);
    let status = contact_gate
        .get_contact_status(user_id, query.listing_id, query.buyer_id)
        .await?;

    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactStatusRequest {
    pub status: ContactRequestStatus,
}

pub async fn update_contact_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<UpdateContactStatusRequest>,
) -> AppResult<Json<ContactRequest>> {
    let user_id = get_user_id(&claims)?;

    let contact_gate = ContactGateService::new(state.store);
    let request = contact_gate
        .update_contact_status(user_id, request_id, req.status)
        .await?;

    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub struct SellerRequestsQuery {
    pub seller_id: Uuid,
}

pub async fn list_seller_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<SellerRequestsQuery>,
) -> AppResult<Json<Vec<ContactRequestWithBuyer>>> {
    let user_id = get_user_id(&claims)?;

    let contact_gate = ContactGateService::new(state.store);
    let requests = contact_gate
        .list_seller_requests(user_id, query.seller_id)
        .await?;

    Ok(Json(requests))
}
