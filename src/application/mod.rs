pub mod bid_service;
pub mod error;
pub mod marketplace;
pub mod project_service;
pub mod report_service;
pub mod views;

pub use bid_service::*;
pub use error::*;
pub use marketplace::*;
pub use project_service::*;
pub use report_service::*;
pub use views::*;
