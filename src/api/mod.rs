//! The API layer, containing web handlers and routing.

pub mod handlers;
pub mod router;

pub use handlers::{ApiDoc, ApiResponse, ErrorResponse, MessageResponse};
pub use router::create_router;
