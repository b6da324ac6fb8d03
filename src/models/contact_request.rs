use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contact_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactRequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl ContactRequestStatus {
    /// Accepted and declined are terminal; a request is only ever decided
    /// once.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ContactRequestStatus::Pending)
    }

    pub fn can_transition_to(self, next: ContactRequestStatus) -> bool {
        matches!(
            (self, next),
            (ContactRequestStatus::Pending, ContactRequestStatus::Accepted)
                | (ContactRequestStatus::Pending, ContactRequestStatus::Declined)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContactRequestStatus::Pending => "pending",
            ContactRequestStatus::Accepted => "accepted",
            ContactRequestStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for ContactRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactRequest {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub message: Option<String>,
    pub status: ContactRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ContactRequestInsert {
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactRequestWithBuyer {
    #[serde(flatten)]
    pub request: ContactRequest,
    pub buyer: Option<Profile>,
}

/// What a buyer sees when asking about their own request. `seller_phone` is
/// populated only when the request has been accepted.
#[derive(Debug, Default, Serialize)]
pub struct ContactStatus {
    pub status: Option<ContactRequestStatus>,
    pub request_id: Option<Uuid>,
    pub seller_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::ContactRequestStatus::*;

    #[test]
    fn pending_can_be_decided_either_way() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Declined));
    }

    #[test]
    fn no_transition_out_of_terminal_states() {
        for terminal in [Accepted, Declined] {
            for next in [Pending, Accepted, Declined] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn pending_cannot_loop_back_to_pending() {
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn terminality() {
        assert!(!Pending.is_terminal());
        assert!(Accepted.is_terminal());
        assert!(Declined.is_terminal());
    }
}
