//! In-memory store used by the test suites. Behaves like the Postgres
//! implementation, including the compare-and-swap semantics of status
//! updates, but keeps everything in a mutex-held map per instance so tests
//! stay isolated from each other.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ContactRequest, ContactRequestInsert, ContactRequestStatus, Listing, ListingFilters,
    ListingInsert, ListingStatus, ListingUpdate, ProfileUpdate, Transaction, TransactionInsert,
    TransactionStatus, User, UserInsert,
};

use super::{ContactRequestStore, ListingStore, TransactionStore, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    listings: HashMap<Uuid, Listing>,
    contact_requests: Vec<ContactRequest>,
    transactions: HashMap<Uuid, Transaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: UserInsert) -> AppResult<User> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            display_name: user.display_name,
            phone: user.phone,
            avatar_url: None,
            is_verified: false,
            allow_whatsapp: true,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(display_name) = update.display_name {
            user.display_name = display_name;
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        if let Some(allow_whatsapp) = update.allow_whatsapp {
            user.allow_whatsapp = allow_whatsapp;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        user.is_verified = true;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert_listing(&self, owner: Uuid, listing: ListingInsert) -> AppResult<Listing> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            user_id: owner,
            title: listing.title,
            description: listing.description,
            price: listing.price,
            images: listing.images,
            category: listing.category,
            sub_category: listing.sub_category,
            brand: listing.brand,
            model: listing.model,
            condition: listing.condition,
            retail_price: listing.retail_price,
            discount_percent: listing.discount_percent,
            status: ListingStatus::Active,
            created_at: now,
            updated_at: now,
        };
        inner.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn find_listing(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.listings.get(&id).cloned())
    }

    async fn list_listings(&self, filters: &ListingFilters) -> AppResult<Vec<Listing>> {
        let inner = self.inner.lock().unwrap();
        let mut results: Vec<Listing> = inner
            .listings
            .values()
            .filter(|l| matches_filters(l, filters))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }

    async fn update_listing(&self, id: Uuid, update: ListingUpdate) -> AppResult<Option<Listing>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(listing) = inner.listings.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            listing.title = title;
        }
        if let Some(description) = update.description {
            listing.description = Some(description);
        }
        if let Some(price) = update.price {
            listing.price = price;
        }
        if let Some(images) = update.images {
            listing.images = images;
        }
        if let Some(category) = update.category {
            listing.category = category;
        }
        if let Some(sub_category) = update.sub_category {
            listing.sub_category = Some(sub_category);
        }
        if let Some(brand) = update.brand {
            listing.brand = Some(brand);
        }
        if let Some(model) = update.model {
            listing.model = Some(model);
        }
        if let Some(condition) = update.condition {
            listing.condition = Some(condition);
        }
        if let Some(retail_price) = update.retail_price {
            listing.retail_price = Some(retail_price);
        }
        if let Some(discount_percent) = update.discount_percent {
            listing.discount_percent = Some(discount_percent);
        }
        listing.updated_at = Utc::now();
        Ok(Some(listing.clone()))
    }

    async fn set_listing_status(
        &self,
        id: Uuid,
        status: ListingStatus,
    ) -> AppResult<Option<Listing>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(listing) = inner.listings.get_mut(&id) else {
            return Ok(None);
        };
        listing.status = status;
        listing.updated_at = Utc::now();
        Ok(Some(listing.clone()))
    }
}

fn matches_filters(listing: &Listing, filters: &ListingFilters) -> bool {
    if let Some(category) = &filters.category {
        if &listing.category != category {
            return false;
        }
    }
    if let Some(min_price) = filters.min_price {
        if listing.price < min_price {
            return false;
        }
    }
    if let Some(max_price) = filters.max_price {
        if listing.price > max_price {
            return false;
        }
    }
    if let Some(condition) = filters.condition {
        if listing.condition != Some(condition) {
            return false;
        }
    }
    if let Some(brand) = &filters.brand {
        if listing.brand.as_deref() != Some(brand.as_str()) {
            return false;
        }
    }
    if let Some(status) = filters.status {
        if listing.status != status {
            return false;
        }
    }
    if let Some(user_id) = filters.user_id {
        if listing.user_id != user_id {
            return false;
        }
    }
    if let Some(search) = &filters.search {
        let needle = search.to_lowercase();
        let haystacks = [
            Some(listing.title.as_str()),
            listing.description.as_deref(),
            listing.brand.as_deref(),
        ];
        if !haystacks
            .iter()
            .flatten()
            .any(|h| h.to_lowercase().contains(&needle))
        {
            return false;
        }
    }
    true
}

#[async_trait]
impl ContactRequestStore for MemoryStore {
    async fn insert_request(&self, request: ContactRequestInsert) -> AppResult<ContactRequest> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner
            .contact_requests
            .iter()
            .find(|r| r.listing_id == request.listing_id && r.buyer_id == request.buyer_id)
        {
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let request = ContactRequest {
            id: Uuid::new_v4(),
            listing_id: request.listing_id,
            buyer_id: request.buyer_id,
            seller_id: request.seller_id,
            message: request.message,
            status: ContactRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        inner.contact_requests.push(request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: Uuid) -> AppResult<Option<ContactRequest>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.contact_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_request_for_buyer(
        &self,
        listing_id: Uuid,
        buyer_id: Uuid,
    ) -> AppResult<Option<ContactRequest>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .contact_requests
            .iter()
            .find(|r| r.listing_id == listing_id && r.buyer_id == buyer_id)
            .cloned())
    }

    async fn update_request_status(
        &self,
        id: Uuid,
        from: ContactRequestStatus,
        to: ContactRequestStatus,
    ) -> AppResult<Option<ContactRequest>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(request) = inner
            .contact_requests
            .iter_mut()
            .find(|r| r.id == id && r.status == from)
        else {
            return Ok(None);
        };
        request.status = to;
        request.updated_at = Utc::now();
        Ok(Some(request.clone()))
    }

    async fn list_requests_for_seller(&self, seller_id: Uuid) -> AppResult<Vec<ContactRequest>> {
        let inner = self.inner.lock().unwrap();
        let mut requests: Vec<ContactRequest> = inner
            .contact_requests
            .iter()
            .filter(|r| r.seller_id == seller_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert_transaction(
        &self,
        transaction: TransactionInsert,
        status: TransactionStatus,
    ) -> AppResult<Transaction> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            listing_id: transaction.listing_id,
            buyer_id: transaction.buyer_id,
            seller_id: transaction.seller_id,
            amount: transaction.amount,
            status,
            created_at: now,
            updated_at: now,
        };
        inner.transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn find_transaction(&self, id: Uuid) -> AppResult<Option<Transaction>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.transactions.get(&id).cloned())
    }

    async fn update_transaction_status(
        &self,
        id: Uuid,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> AppResult<Option<Transaction>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(transaction) = inner.transactions.get_mut(&id) else {
            return Ok(None);
        };
        if transaction.status != from {
            return Ok(None);
        }
        transaction.status = to;
        transaction.updated_at = Utc::now();
        Ok(Some(transaction.clone()))
    }
}
