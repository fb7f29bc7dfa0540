pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod types;

pub use error::{ApiError, Operation};
pub use router::create_router;
pub use types::*;
