//! Row-store seam. All workflow services talk to the database through these
//! traits so tests can swap in [`memory::MemoryStore`] and production uses
//! [`postgres::PgStore`]. Status writes are compare-and-swap: they name the
//! status the caller observed, and return `None` when another request got
//! there first.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ContactRequest, ContactRequestInsert, ContactRequestStatus, Listing, ListingFilters,
    ListingInsert, ListingStatus, ListingUpdate, ProfileUpdate, Transaction, TransactionInsert,
    TransactionStatus, User, UserInsert,
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: UserInsert) -> AppResult<User>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>>;
    async fn mark_verified(&self, id: Uuid) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert_listing(&self, owner: Uuid, listing: ListingInsert) -> AppResult<Listing>;
    async fn find_listing(&self, id: Uuid) -> AppResult<Option<Listing>>;
    /// Newest-first, filtered per [`ListingFilters`].
    async fn list_listings(&self, filters: &ListingFilters) -> AppResult<Vec<Listing>>;
    async fn update_listing(&self, id: Uuid, update: ListingUpdate) -> AppResult<Option<Listing>>;
    async fn set_listing_status(
        &self,
        id: Uuid,
        status: ListingStatus,
    ) -> AppResult<Option<Listing>>;
}

#[async_trait]
pub trait ContactRequestStore: Send + Sync {
    /// Idempotent on (listing_id, buyer_id): if a request already exists for
    /// that pair the existing row is returned unchanged.
    async fn insert_request(&self, request: ContactRequestInsert) -> AppResult<ContactRequest>;
    async fn find_request(&self, id: Uuid) -> AppResult<Option<ContactRequest>>;
    async fn find_request_for_buyer(
        &self,
        listing_id: Uuid,
        buyer_id: Uuid,
    ) -> AppResult<Option<ContactRequest>>;
    /// CAS: applies `from -> to` only if the row is still in `from`.
    async fn update_request_status(
        &self,
        id: Uuid,
        from: ContactRequestStatus,
        to: ContactRequestStatus,
    ) -> AppResult<Option<ContactRequest>>;
    async fn list_requests_for_seller(&self, seller_id: Uuid) -> AppResult<Vec<ContactRequest>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert_transaction(
        &self,
        transaction: TransactionInsert,
        status: TransactionStatus,
    ) -> AppResult<Transaction>;
    async fn find_transaction(&self, id: Uuid) -> AppResult<Option<Transaction>>;
    /// CAS: applies `from -> to` only if the row is still in `from`.
    async fn update_transaction_status(
        &self,
        id: Uuid,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> AppResult<Option<Transaction>>;
}

pub trait Store: UserStore + ListingStore + ContactRequestStore + TransactionStore {}

impl<T> Store for T where T: UserStore + ListingStore + ContactRequestStore + TransactionStore {}
