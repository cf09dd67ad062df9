//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, DatabaseError, ValidationError};
pub use traits::{
    CompanyRepository, HealthCheck, PositionRepository, TransactionRepository, UserRepository,
};
pub use types::{
    Company, CompanyRequest, HealthResponse, HealthStatus, NewCompany, NewPosition, NewUser,
    PaginationParams, Position, PositionRequest, TopupCompanyBalance, Transaction,
    TOPUP_NOTE, TransactionType, User, UserRequest, WithdrawRequest,
};
