pub mod auth;
pub mod contacts;
pub mod escrow;
pub mod listings;
pub mod users;
