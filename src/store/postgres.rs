use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    ContactRequest, ContactRequestInsert, ContactRequestStatus, Listing, ListingFilters,
    ListingInsert, ListingStatus, ListingUpdate, ProfileUpdate, Transaction, TransactionInsert,
    TransactionStatus, User, UserInsert,
};
use crate::validation::escape_like_pattern;

use super::{ContactRequestStore, ListingStore, TransactionStore, UserStore};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: UserInsert) -> AppResult<User> {
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, password_hash, display_name, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(&user.phone)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Option<User>> {
        let user: Option<User> = sqlx::query_as(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                phone = COALESCE($3, phone),
                avatar_url = COALESCE($4, avatar_url),
                allow_whatsapp = COALESCE($5, allow_whatsapp),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.display_name)
        .bind(&update.phone)
        .bind(&update.avatar_url)
        .bind(update.allow_whatsapp)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<Option<User>> {
        let user: Option<User> = sqlx::query_as(
            "UPDATE users SET is_verified = true, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl ListingStore for PgStore {
    async fn insert_listing(&self, owner: Uuid, listing: ListingInsert) -> AppResult<Listing> {
        let listing: Listing = sqlx::query_as(
            r#"
            INSERT INTO listings (
                id, user_id, title, description, price, images, category,
                sub_category, brand, model, condition, retail_price,
                discount_percent, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(&listing.images)
        .bind(&listing.category)
        .bind(&listing.sub_category)
        .bind(&listing.brand)
        .bind(&listing.model)
        .bind(listing.condition)
        .bind(listing.retail_price)
        .bind(listing.discount_percent)
        .bind(ListingStatus::Active)
        .fetch_one(&self.db)
        .await?;

        Ok(listing)
    }

    async fn find_listing(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let listing: Option<Listing> = sqlx::query_as("SELECT * FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(listing)
    }

    async fn list_listings(&self, filters: &ListingFilters) -> AppResult<Vec<Listing>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM listings WHERE 1 = 1");

        if let Some(category) = &filters.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(min_price) = filters.min_price {
            query.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filters.max_price {
            query.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(condition) = filters.condition {
            query.push(" AND condition = ").push_bind(condition);
        }
        if let Some(brand) = &filters.brand {
            query.push(" AND brand = ").push_bind(brand.clone());
        }
        if let Some(status) = filters.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(user_id) = filters.user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(search) = &filters.search {
            let pattern = format!("%{}%", escape_like_pattern(search));
            query
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR brand ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        query.push(" ORDER BY created_at DESC");

        let listings: Vec<Listing> = query
            .build_query_as::<Listing>()
            .fetch_all(&self.db)
            .await?;

        Ok(listings)
    }

    async fn update_listing(&self, id: Uuid, update: ListingUpdate) -> AppResult<Option<Listing>> {
        let listing: Option<Listing> = sqlx::query_as(
            r#"
            UPDATE listings
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                images = COALESCE($5, images),
                category = COALESCE($6, category),
                sub_category = COALESCE($7, sub_category),
                brand = COALESCE($8, brand),
                model = COALESCE($9, model),
                condition = COALESCE($10, condition),
                retail_price = COALESCE($11, retail_price),
                discount_percent = COALESCE($12, discount_percent),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.price)
        .bind(&update.images)
        .bind(&update.category)
        .bind(&update.sub_category)
        .bind(&update.brand)
        .bind(&update.model)
        .bind(update.condition)
        .bind(update.retail_price)
        .bind(update.discount_percent)
        .fetch_optional(&self.db)
        .await?;

        Ok(listing)
    }

    async fn set_listing_status(
        &self,
        id: Uuid,
        status: ListingStatus,
    ) -> AppResult<Option<Listing>> {
        let listing: Option<Listing> = sqlx::query_as(
            "UPDATE listings SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;

        Ok(listing)
    }
}

#[async_trait]
impl ContactRequestStore for PgStore {
    async fn insert_request(&self, request: ContactRequestInsert) -> AppResult<ContactRequest> {
        // The unique (listing_id, buyer_id) index makes the create
        // idempotent even when two requests race.
        let inserted: Option<ContactRequest> = sqlx::query_as(
            r#"
            INSERT INTO contact_requests (id, listing_id, buyer_id, seller_id, message, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (listing_id, buyer_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.listing_id)
        .bind(request.buyer_id)
        .bind(request.seller_id)
        .bind(&request.message)
        .bind(ContactRequestStatus::Pending)
        .fetch_optional(&self.db)
        .await?;

        match inserted {
            Some(row) => Ok(row),
            None => self
                .find_request_for_buyer(request.listing_id, request.buyer_id)
                .await?
                .ok_or_else(|| {
                    anyhow::anyhow!("contact request missing after insert conflict").into()
                }),
        }
    }

    async fn find_request(&self, id: Uuid) -> AppResult<Option<ContactRequest>> {
        let request: Option<ContactRequest> =
            sqlx::query_as("SELECT * FROM contact_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(request)
    }

    async fn find_request_for_buyer(
        &self,
        listing_id: Uuid,
        buyer_id: Uuid,
    ) -> AppResult<Option<ContactRequest>> {
        let request: Option<ContactRequest> = sqlx::query_as(
            "SELECT * FROM contact_requests WHERE listing_id = $1 AND buyer_id = $2",
        )
        .bind(listing_id)
        .bind(buyer_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(request)
    }

    async fn update_request_status(
        &self,
        id: Uuid,
        from: ContactRequestStatus,
        to: ContactRequestStatus,
    ) -> AppResult<Option<ContactRequest>> {
        let request: Option<ContactRequest> = sqlx::query_as(
            r#"
            UPDATE contact_requests
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.db)
        .await?;

        Ok(request)
    }

    async fn list_requests_for_seller(&self, seller_id: Uuid) -> AppResult<Vec<ContactRequest>> {
        let requests: Vec<ContactRequest> = sqlx::query_as(
            "SELECT * FROM contact_requests WHERE seller_id = $1 ORDER BY created_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.db)
        .await?;

        Ok(requests)
    }
}

#[async_trait]
impl TransactionStore for PgStore {
    async fn insert_transaction(
        &self,
        transaction: TransactionInsert,
        status: TransactionStatus,
    ) -> AppResult<Transaction> {
        let transaction: Transaction = sqlx::query_as(
            r#"
            INSERT INTO transactions (id, listing_id, buyer_id, seller_id, amount, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(transaction.listing_id)
        .bind(transaction.buyer_id)
        .bind(transaction.seller_id)
        .bind(transaction.amount)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        Ok(transaction)
    }

    async fn find_transaction(&self, id: Uuid) -> AppResult<Option<Transaction>> {
        let transaction: Option<Transaction> =
            sqlx::query_as("SELECT * FROM transactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(transaction)
    }

    async fn update_transaction_status(
        &self,
        id: Uuid,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> AppResult<Option<Transaction>> {
        let transaction: Option<Transaction> = sqlx::query_as(
            r#"
            UPDATE transactions
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.db)
        .await?;

        Ok(transaction)
    }
}
