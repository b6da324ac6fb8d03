//! Escrow workflow: funds are (notionally) held while the item moves from
//! seller to buyer. No real payment rails are attached; custody is
//! simulated, but the lifecycle and authorization rules are enforced.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Transaction, TransactionInsert, TransactionStatus},
    services::require_party,
    store::{Store, TransactionStore},
    validation::validate_amount,
};

pub struct EscrowService {
    store: Arc<dyn Store>,
}

impl EscrowService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Open a transaction as the buyer. Starts at `escrow_pending`; the
    /// buyer moves it to `funds_secured` with [`confirm_payment`].
    ///
    /// [`confirm_payment`]: EscrowService::confirm_payment
    pub async fn create_transaction(
        &self,
        caller: Uuid,
        buyer_id: Uuid,
        seller_id: Uuid,
        listing_id: Uuid,
        amount: i64,
    ) -> AppResult<Transaction> {
        require_party(caller, buyer_id, "buyer")?;
        validate_amount(amount)?;

        self.store
            .insert_transaction(
                TransactionInsert {
                    listing_id,
                    buyer_id,
                    seller_id,
                    amount,
                },
                TransactionStatus::EscrowPending,
            )
            .await
    }

    /// Visible to the two parties only.
    pub async fn get_transaction(&self, caller: Uuid, id: Uuid) -> AppResult<Transaction> {
        let transaction = self
            .store
            .find_transaction(id)
            .await?
            .ok_or(AppError::TransactionNotFound)?;

        if caller != transaction.buyer_id && caller != transaction.seller_id {
            return Err(AppError::Forbidden("buyer or seller"));
        }

        Ok(transaction)
    }

    /// Apply one forward step. Each edge belongs to a specific party:
    /// the buyer secures funds and confirms receipt, the seller confirms
    /// shipping. Any other requested transition is rejected, and the write
    /// itself is a CAS so overlapping requests cannot lose an update.
    pub async fn update_transaction_status(
        &self,
        caller: Uuid,
        id: Uuid,
        new_status: TransactionStatus,
    ) -> AppResult<Transaction> {
        let transaction = self
            .store
            .find_transaction(id)
            .await?
            .ok_or(AppError::TransactionNotFound)?;

        if caller != transaction.buyer_id && caller != transaction.seller_id {
            return Err(AppError::Forbidden("buyer or seller"));
        }

        if !transaction.status.can_transition_to(new_status) {
            return Err(AppError::invalid_transition(transaction.status, new_status));
        }

        let responsible = match new_status {
            TransactionStatus::FundsSecured => ("buyer", transaction.buyer_id),
            TransactionStatus::Shipped => ("seller", transaction.seller_id),
            TransactionStatus::Completed => ("buyer", transaction.buyer_id),
            // Unreachable through the transition table; nothing steps back
            // to the initial state.
            TransactionStatus::EscrowPending => {
                return Err(AppError::invalid_transition(transaction.status, new_status));
            }
        };
        require_party(caller, responsible.1, responsible.0)?;

        self.store
            .update_transaction_status(id, transaction.status, new_status)
            .await?
            .ok_or(AppError::TransitionConflict)
    }

    /// Buyer confirms payment: escrow_pending -> funds_secured.
    pub async fn confirm_payment(&self, caller: Uuid, id: Uuid) -> AppResult<Transaction> {
        self.update_transaction_status(caller, id, TransactionStatus::FundsSecured)
            .await
    }

    /// Seller confirms dispatch: funds_secured -> shipped.
    pub async fn confirm_shipping(&self, caller: Uuid, id: Uuid) -> AppResult<Transaction> {
        self.update_transaction_status(caller, id, TransactionStatus::Shipped)
            .await
    }

    /// Buyer confirms receipt: shipped -> completed. Terminal.
    pub async fn confirm_receipt(&self, caller: Uuid, id: Uuid) -> AppResult<Transaction> {
        self.update_transaction_status(caller, id, TransactionStatus::Completed)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::TransactionStore;

    fn service() -> (Arc<MemoryStore>, EscrowService) {
        let store = Arc::new(MemoryStore::new());
        let escrow = EscrowService::new(store.clone());
        (store, escrow)
    }

    #[tokio::test]
    async fn new_transactions_start_in_escrow_pending() {
        let (_, escrow) = service();
        let buyer = Uuid::new_v4();

        let tx = escrow
            .create_transaction(buyer, buyer, Uuid::new_v4(), Uuid::new_v4(), 1200)
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::EscrowPending);
        assert_eq!(tx.amount, 1200);
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let (_, escrow) = service();
        let buyer = Uuid::new_v4();

        for amount in [0, -1, -1200] {
            let err = escrow
                .create_transaction(buyer, buyer, Uuid::new_v4(), Uuid::new_v4(), amount)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn only_the_buyer_may_open_a_transaction() {
        let (_, escrow) = service();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();

        let err = escrow
            .create_transaction(seller, buyer, seller, Uuid::new_v4(), 500)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden("buyer")));
    }

    #[tokio::test]
    async fn non_party_cannot_read_a_transaction() {
        let (_, escrow) = service();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();

        let tx = escrow
            .create_transaction(buyer, buyer, seller, Uuid::new_v4(), 500)
            .await
            .unwrap();

        assert!(escrow.get_transaction(buyer, tx.id).await.is_ok());
        assert!(escrow.get_transaction(seller, tx.id).await.is_ok());

        let err = escrow
            .get_transaction(Uuid::new_v4(), tx.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (_, escrow) = service();
        let err = escrow
            .get_transaction(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TransactionNotFound));
    }

    #[tokio::test]
    async fn full_lifecycle_with_the_right_parties() {
        let (_, escrow) = service();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();

        let tx = escrow
            .create_transaction(buyer, buyer, seller, Uuid::new_v4(), 1200)
            .await
            .unwrap();

        let tx = escrow.confirm_payment(buyer, tx.id).await.unwrap();
        assert_eq!(tx.status, TransactionStatus::FundsSecured);

        let tx = escrow.confirm_shipping(seller, tx.id).await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Shipped);

        let tx = escrow.confirm_receipt(buyer, tx.id).await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn each_edge_is_bound_to_its_party() {
        let (_, escrow) = service();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();

        let tx = escrow
            .create_transaction(buyer, buyer, seller, Uuid::new_v4(), 800)
            .await
            .unwrap();

        // The seller cannot confirm the buyer's payment.
        let err = escrow.confirm_payment(seller, tx.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden("buyer")));
        escrow.confirm_payment(buyer, tx.id).await.unwrap();

        // The buyer cannot confirm shipping.
        let err = escrow.confirm_shipping(buyer, tx.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden("seller")));
        escrow.confirm_shipping(seller, tx.id).await.unwrap();

        // The seller cannot confirm receipt.
        let err = escrow.confirm_receipt(seller, tx.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden("buyer")));
        escrow.confirm_receipt(buyer, tx.id).await.unwrap();
    }

    #[tokio::test]
    async fn skipping_or_reversing_states_is_rejected() {
        let (_, escrow) = service();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();

        let tx = escrow
            .create_transaction(buyer, buyer, seller, Uuid::new_v4(), 800)
            .await
            .unwrap();

        // Cannot skip straight to shipped or completed from escrow_pending.
        for next in [TransactionStatus::Shipped, TransactionStatus::Completed] {
            let err = escrow
                .update_transaction_status(seller, tx.id, next)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition { .. }));
        }

        escrow.confirm_payment(buyer, tx.id).await.unwrap();

        // Cannot move back to escrow_pending.
        let err = escrow
            .update_transaction_status(buyer, tx.id, TransactionStatus::EscrowPending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn completed_is_terminal() {
        let (_, escrow) = service();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();

        let tx = escrow
            .create_transaction(buyer, buyer, seller, Uuid::new_v4(), 800)
            .await
            .unwrap();
        escrow.confirm_payment(buyer, tx.id).await.unwrap();
        escrow.confirm_shipping(seller, tx.id).await.unwrap();
        escrow.confirm_receipt(buyer, tx.id).await.unwrap();

        // A second receipt confirmation has no edge to follow.
        let err = escrow.confirm_receipt(buyer, tx.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn racing_transitions_leave_exactly_one_winner() {
        let (store, escrow) = service();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();

        let tx = escrow
            .create_transaction(buyer, buyer, seller, Uuid::new_v4(), 800)
            .await
            .unwrap();
        escrow.confirm_payment(buyer, tx.id).await.unwrap();

        // Two requests that both observed funds_secured; the CAS lets only
        // the first through.
        let first = store
            .update_transaction_status(
                tx.id,
                TransactionStatus::FundsSecured,
                TransactionStatus::Shipped,
            )
            .await
            .unwrap();
        let second = store
            .update_transaction_status(
                tx.id,
                TransactionStatus::FundsSecured,
                TransactionStatus::Shipped,
            )
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
    }
}
