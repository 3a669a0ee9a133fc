pub mod config;
pub mod error;
pub mod notify;
pub mod retry;
pub mod schema;
pub mod store;

pub use config::StoreConfig;
pub use error::StorageError;
pub use notify::{ChangeEvent, ChangeKind, ChangeTable};
pub use retry::retry_with_backoff;
pub use store::{GameStore, SqliteStore};
