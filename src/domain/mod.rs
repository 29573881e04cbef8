pub mod bid;
pub mod error;
pub mod filter;
pub mod history;
pub mod invoice;
pub mod notification;
pub mod owner;
pub mod project;
pub mod stats;
pub mod user;

pub use bid::*;
pub use error::*;
pub use filter::*;
pub use history::*;
pub use invoice::*;
pub use notification::*;
pub use owner::*;
pub use project::*;
pub use stats::*;
pub use user::*;
