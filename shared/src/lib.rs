pub mod credentials;
pub mod error;
pub mod store;

pub use credentials::ServiceAccountKey;
pub use error::StoreError;
pub use store::{DocumentStore, FirestoreStore, MemoryStore};
