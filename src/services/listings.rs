use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Listing, ListingDetails, ListingFilters, ListingInsert, ListingStatus, ListingUpdate,
    },
    services::require_party,
    store::{ListingStore, Store, UserStore},
    validation::{validate_listing_title, validate_price},
};

pub struct ListingsService {
    store: Arc<dyn Store>,
}

impl ListingsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_listing(&self, caller: Uuid, listing: ListingInsert) -> AppResult<Listing> {
        validate_listing_title(&listing.title)?;
        validate_price(listing.price)?;

        self.store.insert_listing(caller, listing).await
    }

    pub async fn list_listings(&self, filters: &ListingFilters) -> AppResult<Vec<Listing>> {
        self.store.list_listings(filters).await
    }

    /// Listing plus the seller's public identity. The seller's phone number
    /// is included only when the viewer is the owner; anyone else obtains it
    /// through the contact gate.
    pub async fn get_listing_details(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<ListingDetails> {
        let listing = self
            .store
            .find_listing(id)
            .await?
            .ok_or(AppError::ListingNotFound)?;

        let seller = self.store.find_user(listing.user_id).await?;
        let is_owner = viewer == Some(listing.user_id);

        let (seller_name, seller_verified, seller_phone) = match seller {
            Some(seller) => {
                let phone = if is_owner { seller.phone.clone() } else { None };
                (seller.display_name, seller.is_verified, phone)
            }
            None => ("Unknown Seller".to_string(), false, None),
        };

        Ok(ListingDetails {
            listing,
            is_owner,
            seller_name,
            seller_verified,
            seller_phone,
        })
    }

    pub async fn update_listing(
        &self,
        caller: Uuid,
        id: Uuid,
        update: ListingUpdate,
    ) -> AppResult<Listing> {
        let listing = self.owned_listing(caller, id).await?;

        if let Some(title) = &update.title {
            validate_listing_title(title)?;
        }
        if let Some(price) = update.price {
            validate_price(price)?;
        }

        self.store
            .update_listing(listing.id, update)
            .await?
            .ok_or(AppError::ListingNotFound)
    }

    /// Soft delete: the row stays (contact requests and transactions
    /// reference it) but the listing disappears from browse results.
    pub async fn delete_listing(&self, caller: Uuid, id: Uuid) -> AppResult<Listing> {
        let listing = self.owned_listing(caller, id).await?;

        self.store
            .set_listing_status(listing.id, ListingStatus::Hidden)
            .await?
            .ok_or(AppError::ListingNotFound)
    }

    pub async fn mark_sold(&self, caller: Uuid, id: Uuid) -> AppResult<Listing> {
        let listing = self.owned_listing(caller, id).await?;

        self.store
            .set_listing_status(listing.id, ListingStatus::Sold)
            .await?
            .ok_or(AppError::ListingNotFound)
    }

    async fn owned_listing(&self, caller: Uuid, id: Uuid) -> AppResult<Listing> {
        let listing = self
            .store
            .find_listing(id)
            .await?
            .ok_or(AppError::ListingNotFound)?;
        require_party(caller, listing.user_id, "owner")?;
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserInsert;
    use crate::store::memory::MemoryStore;
    use crate::store::UserStore;

    fn insert(title: &str, price: i64, category: &str) -> ListingInsert {
        ListingInsert {
            title: title.to_string(),
            description: None,
            price,
            images: vec![],
            category: category.to_string(),
            sub_category: None,
            brand: None,
            model: None,
            condition: None,
            retail_price: None,
            discount_percent: None,
        }
    }

    #[tokio::test]
    async fn create_and_browse() {
        let store = Arc::new(MemoryStore::new());
        let listings = ListingsService::new(store);
        let seller = Uuid::new_v4();

        listings
            .create_listing(seller, insert("Trail Running Shoes", 1200, "Hiking"))
            .await
            .unwrap();
        listings
            .create_listing(seller, insert("Mountain Bike", 15000, "Cycling"))
            .await
            .unwrap();

        let all = listings
            .list_listings(&ListingFilters::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let hiking = listings
            .list_listings(&ListingFilters {
                category: Some("Hiking".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hiking.len(), 1);
        assert_eq!(hiking[0].title, "Trail Running Shoes");

        let cheap = listings
            .list_listings(&ListingFilters {
                max_price: Some(2000),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cheap.len(), 1);
    }

    #[tokio::test]
    async fn search_matches_title_description_and_brand() {
        let store = Arc::new(MemoryStore::new());
        let listings = ListingsService::new(store);
        let seller = Uuid::new_v4();

        let mut shoes = insert("Trail Running Shoes", 1200, "Hiking");
        shoes.brand = Some("Salomon".to_string());
        listings.create_listing(seller, shoes).await.unwrap();
        listings
            .create_listing(seller, insert("Hiking Backpack 65L", 800, "Hiking"))
            .await
            .unwrap();

        let hits = listings
            .list_listings(&ListingFilters {
                search: Some("salomon".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Trail Running Shoes");
    }

    #[tokio::test]
    async fn invalid_listings_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let listings = ListingsService::new(store);
        let seller = Uuid::new_v4();

        let err = listings
            .create_listing(seller, insert("   ", 100, "Hiking"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = listings
            .create_listing(seller, insert("Free stuff", 0, "Hiking"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn details_reveal_phone_only_to_the_owner() {
        let store = Arc::new(MemoryStore::new());
        let listings = ListingsService::new(store.clone());
        let seller = store
            .insert_user(UserInsert {
                email: "sarah@example.com".to_string(),
                password_hash: "x".to_string(),
                display_name: "Sarah Seller".to_string(),
                phone: Some("+27 82 123 4567".to_string()),
            })
            .await
            .unwrap();

        let listing = listings
            .create_listing(seller.id, insert("Trail Running Shoes", 1200, "Hiking"))
            .await
            .unwrap();

        let own_view = listings
            .get_listing_details(listing.id, Some(seller.id))
            .await
            .unwrap();
        assert!(own_view.is_owner);
        assert_eq!(own_view.seller_phone.as_deref(), Some("+27 82 123 4567"));

        let buyer_view = listings
            .get_listing_details(listing.id, Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(!buyer_view.is_owner);
        assert_eq!(buyer_view.seller_name, "Sarah Seller");
        assert_eq!(buyer_view.seller_phone, None);

        let anon_view = listings
            .get_listing_details(listing.id, None)
            .await
            .unwrap();
        assert_eq!(anon_view.seller_phone, None);
    }

    #[tokio::test]
    async fn only_the_owner_mutates_a_listing() {
        let store = Arc::new(MemoryStore::new());
        let listings = ListingsService::new(store);
        let seller = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let listing = listings
            .create_listing(seller, insert("Mountain Bike", 15000, "Cycling"))
            .await
            .unwrap();

        let err = listings
            .update_listing(
                stranger,
                listing.id,
                ListingUpdate {
                    price: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden("owner")));

        let err = listings.delete_listing(stranger, listing.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden("owner")));
    }

    #[tokio::test]
    async fn delete_is_a_soft_hide_and_sold_is_a_status() {
        let store = Arc::new(MemoryStore::new());
        let listings = ListingsService::new(store);
        let seller = Uuid::new_v4();

        let listing = listings
            .create_listing(seller, insert("Mountain Bike", 15000, "Cycling"))
            .await
            .unwrap();

        let hidden = listings.delete_listing(seller, listing.id).await.unwrap();
        assert_eq!(hidden.status, ListingStatus::Hidden);

        // The row still exists and can be looked up directly.
        let details = listings
            .get_listing_details(listing.id, Some(seller))
            .await
            .unwrap();
        assert_eq!(details.listing.status, ListingStatus::Hidden);

        let other = listings
            .create_listing(seller, insert("Backpack", 800, "Hiking"))
            .await
            .unwrap();
        let sold = listings.mark_sold(seller, other.id).await.unwrap();
        assert_eq!(sold.status, ListingStatus::Sold);
    }
}
