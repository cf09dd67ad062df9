//! Application layer containing business logic and shared state.

pub mod company_service;
pub mod position_service;
pub mod state;
pub mod status;
pub mod transaction_service;
pub mod user_service;

pub use company_service::CompanyService;
pub use position_service::PositionService;
pub use state::AppState;
pub use status::{StatusError, StatusResult};
pub use transaction_service::TransactionService;
pub use user_service::{UserService, withdraw_note};
