use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::{
    handlers,
    middleware::{auth_middleware, optional_auth_middleware},
};
use crate::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    // Public auth routes
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // User routes
    let user_protected = Router::new()
        .route("/me", get(handlers::auth::get_current_user))
        .route("/me", put(handlers::users::update_current_user))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let user_public = Router::new().route("/:id/profile", get(handlers::users::get_profile));

    // KYC routes (protected)
    let kyc_routes = Router::new()
        .route("/verify", post(handlers::users::verify_identity))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Listing routes: browsing is public, detail picks up an optional
    // identity, mutations are protected
    let listing_public = Router::new()
        .route("/", get(handlers::listings::list_listings))
        .route(
            "/:id",
            get(handlers::listings::get_listing).layer(middleware::from_fn_with_state(
                state.clone(),
                optional_auth_middleware,
            )),
        );

    let listing_protected = Router::new()
        .route("/", post(handlers::listings::create_listing))
        .route("/:id", put(handlers::listings::update_listing))
        .route("/:id", delete(handlers::listings::delete_listing))
        .route("/:id/sold", post(handlers::listings::mark_sold))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Contact gate routes (protected)
    let contact_routes = Router::new()
        .route("/requests", post(handlers::contacts::request_contact))
        .route("/requests", get(handlers::contacts::list_seller_requests))
        .route("/requests/:id", put(handlers::contacts::update_contact_status))
        .route("/status", get(handlers::contacts::get_contact_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Escrow routes (protected)
    let transaction_routes = Router::new()
        .route("/", post(handlers::escrow::create_transaction))
        .route("/:id", get(handlers::escrow::get_transaction))
        .route("/:id/status", put(handlers::escrow::update_transaction_status))
        .route("/:id/payment", post(handlers::escrow::confirm_payment))
        .route("/:id/shipping", post(handlers::escrow::confirm_shipping))
        .route("/:id/receipt", post(handlers::escrow::confirm_receipt))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_public.merge(user_protected))
        .nest("/kyc", kyc_routes)
        .nest("/listings", listing_public.merge(listing_protected))
        .nest("/contacts", contact_routes)
        .nest("/transactions", transaction_routes)
        .with_state(state)
}
