pub mod db;
pub mod models;
pub mod pagination;
pub mod rating;
pub mod store;

pub use store::{MemStore, PgStore, Store, StoreError, StoreResult};
