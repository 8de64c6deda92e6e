pub mod error;
pub mod manager;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use error::StoreError;
pub use manager::DatabaseManager;
pub use memory::MemoryContactStore;
pub use repository::{ContactStore, PgContactStore};
