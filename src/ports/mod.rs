pub mod cache;
pub mod config_store;
pub mod notifier;
pub mod repository;

pub use cache::*;
pub use config_store::*;
pub use notifier::*;
pub use repository::*;
