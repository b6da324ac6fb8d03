//! Contact gating: a seller's phone number is disclosed to a buyer only
//! after the seller explicitly accepts that buyer's request for the listing.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        ContactRequest, ContactRequestInsert, ContactRequestStatus, ContactRequestWithBuyer,
        ContactStatus,
    },
    services::require_party,
    store::{ContactRequestStore, Store, UserStore},
    validation::validate_contact_message,
};

pub struct ContactGateService {
    store: Arc<dyn Store>,
}

impl ContactGateService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a contact request as the buyer. Idempotent on
    /// (listing_id, buyer_id): a repeated call returns the existing request
    /// unchanged, whatever its status.
    pub async fn request_contact(
        &self,
        caller: Uuid,
        listing_id: Uuid,
        seller_id: Uuid,
        buyer_id: Uuid,
        message: Option<&str>,
    ) -> AppResult<ContactRequest> {
        require_party(caller, buyer_id, "buyer")?;
        validate_contact_message(message)?;

        if let Some(existing) = self
            .store
            .find_request_for_buyer(listing_id, buyer_id)
            .await?
        {
            return Ok(existing);
        }

        self.store
            .insert_request(ContactRequestInsert {
                listing_id,
                buyer_id,
                seller_id,
                message: message.map(str::to_string),
            })
            .await
    }

    /// The buyer's view of their request. The seller's phone number appears
    /// only when the request has been accepted; in every other case the
    /// field is null no matter what the profile holds.
    pub async fn get_contact_status(
        &self,
        caller: Uuid,
        listing_id: Uuid,
        buyer_id: Uuid,
    ) -> AppResult<ContactStatus> {
        require_party(caller, buyer_id, "buyer")?;

        let Some(request) = self
            .store
            .find_request_for_buyer(listing_id, buyer_id)
            .await?
        else {
            return Ok(ContactStatus::default());
        };

        let seller_phone = if request.status == ContactRequestStatus::Accepted {
            self.store
                .find_user(request.seller_id)
                .await?
                .and_then(|u| u.phone)
        } else {
            None
        };

        Ok(ContactStatus {
            status: Some(request.status),
            request_id: Some(request.id),
            seller_phone,
        })
    }

    /// Seller decision. Only pending -> accepted and pending -> declined are
    /// valid; a decided request cannot be re-decided. The status write is a
    /// CAS, so a racing decision surfaces as a conflict instead of silently
    /// overwriting.
    pub async fn update_contact_status(
        &self,
        caller: Uuid,
        request_id: Uuid,
        new_status: ContactRequestStatus,
    ) -> AppResult<ContactRequest> {
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or(AppError::ContactRequestNotFound)?;

        require_party(caller, request.seller_id, "seller")?;

        if !request.status.can_transition_to(new_status) {
            return Err(AppError::invalid_transition(request.status, new_status));
        }

        self.store
            .update_request_status(request_id, request.status, new_status)
            .await?
            .ok_or(AppError::TransitionConflict)
    }

    /// All requests addressed to a seller, newest first, with each buyer's
    /// public profile attached.
    pub async fn list_seller_requests(
        &self,
        caller: Uuid,
        seller_id: Uuid,
    ) -> AppResult<Vec<ContactRequestWithBuyer>> {
        require_party(caller, seller_id, "seller")?;

        let requests = self.store.list_requests_for_seller(seller_id).await?;

        let mut result = Vec::with_capacity(requests.len());
        for request in requests {
            let buyer = self
                .store
                .find_user(request.buyer_id)
                .await?
                .map(|u| u.profile());
            result.push(ContactRequestWithBuyer { request, buyer });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserInsert;
    use crate::store::memory::MemoryStore;
    use crate::store::{ContactRequestStore, UserStore};

    async fn seed_user(store: &MemoryStore, name: &str, phone: Option<&str>) -> Uuid {
        store
            .insert_user(UserInsert {
                email: format!("{}@example.com", name),
                password_hash: "x".to_string(),
                display_name: name.to_string(),
                phone: phone.map(str::to_string),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn request_contact_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store.clone());
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        let listing = Uuid::new_v4();

        let first = gate
            .request_contact(buyer, listing, seller, buyer, Some("Hi"))
            .await
            .unwrap();
        let second = gate
            .request_contact(buyer, listing, seller, buyer, Some("Hi again"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        // The repeat call must not overwrite the original message.
        assert_eq!(second.message.as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn caller_must_be_the_buyer() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store);
        let buyer = Uuid::new_v4();
        let someone_else = Uuid::new_v4();

        let err = gate
            .request_contact(someone_else, Uuid::new_v4(), Uuid::new_v4(), buyer, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden("buyer")));
    }

    #[tokio::test]
    async fn overlong_message_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store);
        let buyer = Uuid::new_v4();
        let long = "x".repeat(501);

        let err = gate
            .request_contact(buyer, Uuid::new_v4(), Uuid::new_v4(), buyer, Some(&long))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn phone_is_hidden_until_accepted() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store.clone());
        let seller = seed_user(&store, "sarah", Some("+27 82 123 4567")).await;
        let buyer = Uuid::new_v4();
        let listing = Uuid::new_v4();

        let request = gate
            .request_contact(buyer, listing, seller, buyer, Some("Hi"))
            .await
            .unwrap();

        let status = gate.get_contact_status(buyer, listing, buyer).await.unwrap();
        assert_eq!(status.status, Some(ContactRequestStatus::Pending));
        assert_eq!(status.seller_phone, None);

        gate.update_contact_status(seller, request.id, ContactRequestStatus::Accepted)
            .await
            .unwrap();

        let status = gate.get_contact_status(buyer, listing, buyer).await.unwrap();
        assert_eq!(status.status, Some(ContactRequestStatus::Accepted));
        assert_eq!(status.seller_phone.as_deref(), Some("+27 82 123 4567"));
    }

    #[tokio::test]
    async fn declined_request_never_reveals_phone() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store.clone());
        let seller = seed_user(&store, "sarah", Some("+27 82 123 4567")).await;
        let buyer = Uuid::new_v4();
        let listing = Uuid::new_v4();

        let request = gate
            .request_contact(buyer, listing, seller, buyer, None)
            .await
            .unwrap();
        gate.update_contact_status(seller, request.id, ContactRequestStatus::Declined)
            .await
            .unwrap();

        let status = gate.get_contact_status(buyer, listing, buyer).await.unwrap();
        assert_eq!(status.status, Some(ContactRequestStatus::Declined));
        assert_eq!(status.seller_phone, None);
    }

    #[tokio::test]
    async fn missing_request_yields_empty_status() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store);
        let buyer = Uuid::new_v4();

        let status = gate
            .get_contact_status(buyer, Uuid::new_v4(), buyer)
            .await
            .unwrap();
        assert!(status.status.is_none());
        assert!(status.request_id.is_none());
        assert!(status.seller_phone.is_none());
    }

    #[tokio::test]
    async fn only_the_seller_may_decide() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store.clone());
        let seller = seed_user(&store, "sarah", None).await;
        let buyer = Uuid::new_v4();

        let request = gate
            .request_contact(buyer, Uuid::new_v4(), seller, buyer, None)
            .await
            .unwrap();

        // Neither the buyer nor a stranger may decide the request.
        for caller in [buyer, Uuid::new_v4()] {
            let err = gate
                .update_contact_status(caller, request.id, ContactRequestStatus::Accepted)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Forbidden("seller")));
        }
    }

    #[tokio::test]
    async fn deciding_a_terminal_request_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store.clone());
        let seller = seed_user(&store, "sarah", None).await;
        let buyer = Uuid::new_v4();

        let request = gate
            .request_contact(buyer, Uuid::new_v4(), seller, buyer, None)
            .await
            .unwrap();
        gate.update_contact_status(seller, request.id, ContactRequestStatus::Declined)
            .await
            .unwrap();

        // Accepting after declining is rejected, as is repeating the decline.
        for next in [
            ContactRequestStatus::Accepted,
            ContactRequestStatus::Declined,
        ] {
            let err = gate
                .update_contact_status(seller, request.id, next)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition { .. }));
        }
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store);

        let err = gate
            .update_contact_status(
                Uuid::new_v4(),
                Uuid::new_v4(),
                ContactRequestStatus::Accepted,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ContactRequestNotFound));
    }

    #[tokio::test]
    async fn racing_decisions_leave_exactly_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store.clone());
        let seller = seed_user(&store, "sarah", None).await;
        let buyer = Uuid::new_v4();

        let request = gate
            .request_contact(buyer, Uuid::new_v4(), seller, buyer, None)
            .await
            .unwrap();

        // Simulate two requests that both observed the pending status by
        // driving the CAS directly.
        let first = store
            .update_request_status(
                request.id,
                ContactRequestStatus::Pending,
                ContactRequestStatus::Accepted,
            )
            .await
            .unwrap();
        let second = store
            .update_request_status(
                request.id,
                ContactRequestStatus::Pending,
                ContactRequestStatus::Declined,
            )
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn seller_inbox_is_newest_first_and_guarded() {
        let store = Arc::new(MemoryStore::new());
        let gate = ContactGateService::new(store.clone());
        let seller = seed_user(&store, "sarah", None).await;
        let buyer_a = seed_user(&store, "john", None).await;
        let buyer_b = seed_user(&store, "jane", None).await;

        gate.request_contact(buyer_a, Uuid::new_v4(), seller, buyer_a, Some("First"))
            .await
            .unwrap();
        gate.request_contact(buyer_b, Uuid::new_v4(), seller, buyer_b, Some("Second"))
            .await
            .unwrap();

        let inbox = gate.list_seller_requests(seller, seller).await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert!(inbox[0].request.created_at >= inbox[1].request.created_at);
        assert!(inbox.iter().all(|r| r.buyer.is_some()));

        let err = gate
            .list_seller_requests(buyer_a, seller)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden("seller")));
    }
}
