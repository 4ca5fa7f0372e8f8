pub mod memory;
pub mod mysql;

pub use burrow_core::error::StorageError;
pub use burrow_core::repository::{KeyPolicy, LookupKey, ReadRepository, Repository, UrlRecord};
pub use memory::InMemoryRepository;
pub use mysql::{ConnectOptions, MySqlRepository};
