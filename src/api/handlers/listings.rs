use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Listing, ListingDetails, ListingFilters, ListingInsert, ListingUpdate},
    services::{auth::Claims, listings::ListingsService},
    AppState,
};

use super::super::middleware::get_user_id;

pub async fn list_listings(
    State(state): State<AppState>,
    Query(filters): Query<ListingFilters>,
) -> AppResult<Json<Vec<Listing>>> {
    let listings_service = ListingsService::new(state.store);
    let listings = listings_service.list_listings(&filters).await?;

    Ok(Json(listings))
}

pub async fn get_listing(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Path(listing_id): Path<Uuid>,
) -> AppResult<Json<ListingDetails>> {
    let viewer = match &claims {
        Some(Extension(claims)) => Some(get_user_id(claims)?),
        None => None,
    };

    let listings_service = ListingsService::new(state.store);
    let details = listings_service
        .get_listing_details(listing_id, viewer)
        .await?;

    Ok(Json(details))
}

pub async fn create_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ListingInsert>,
) -> AppResult<Json<Listing>> {
    let user_id = get_user_id(&claims)?;

    let listings_service = ListingsService::new(state.store);
    let listing = listings_service.create_listing(user_id, req).await?;

    Ok(Json(listing))
}

pub async fn update_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
    Json(req): Json<ListingUpdate>,
) -> AppResult<Json<Listing>> {
    let user_id = get_user_id(&claims)?;

    let listings_service = ListingsService::new(state.store);
    let listing = listings_service
        .update_listing(user_id, listing_id, req)
        .await?;

    Ok(Json(listing))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
) -> AppResult<Json<Listing>> {
    let user_id = get_user_id(&claims)?;

    let listings_service = ListingsService::new(state.store);
    let listing = listings_service.delete_listing(user_id, listing_id).await?;

    Ok(Json(listing))
}

pub async fn mark_sold(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
) -> AppResult<Json<Listing>> {
    let user_id = get_user_id(&claims)?;

    let listings_service = ListingsService::new(state.store);
    let listing = listings_service.mark_sold(user_id, listing_id).await?;

    Ok(Json(listing))
}
