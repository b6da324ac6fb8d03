pub mod contact_request;
pub mod listing;
pub mod transaction;
pub mod user;

pub use contact_request::*;
pub use listing::*;
pub use transaction::*;
pub use user::*;
