pub mod auth;
pub mod contact_gate;
pub mod escrow;
pub mod kyc;
pub mod listings;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Shared party guard: the authenticated caller must be the stored
/// buyer/seller/owner the operation requires. `role` names the expected
/// party in the error message.
pub fn require_party(caller: Uuid, expected: Uuid, role: &'static str) -> AppResult<()> {
    if caller != expected {
        return Err(AppError::Forbidden(role));
    }
    Ok(())
}
