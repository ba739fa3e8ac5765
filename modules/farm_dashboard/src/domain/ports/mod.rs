pub mod auth;
pub mod confirm;
pub mod records;
pub mod storage;

pub use auth::AuthPort;
pub use confirm::ConfirmPort;
pub use records::{FarmRepository, ProfileRepository};
pub use storage::ObjectStorage;
