//! Repository traits defining the persistence contracts the usecases rely on.
//!
//! Every lookup by id reports a missing record as
//! `AppError::Database(DatabaseError::NotFound(_))` so callers can branch on
//! the error kind instead of an `Option`.

use async_trait::async_trait;

use super::error::AppError;
use super::types::{Company, NewCompany, NewPosition, NewUser, Position, Transaction, User};

/// Persistence for employees
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID with its position joined
    async fn find_by_id(&self, id: i64) -> Result<User, AppError>;

    /// List users ordered by ID
    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError>;

    async fn create(&self, user: &NewUser) -> Result<User, AppError>;

    async fn update_by_id(&self, id: i64, user: &NewUser) -> Result<User, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

/// Persistence for job positions
#[async_trait]
pub trait PositionRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Position, AppError>;

    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<Position>, AppError>;

    async fn create(&self, position: &NewPosition) -> Result<Position, AppError>;

    async fn update_by_id(&self, id: i64, position: &NewPosition) -> Result<Position, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

/// Persistence for the singleton company record and its balance
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Get the company record
    async fn get(&self) -> Result<Company, AppError>;

    /// Insert the company if none exists, otherwise overwrite it
    async fn create_or_update(&self, company: &NewCompany) -> Result<Company, AppError>;

    /// Increase the balance and record a credit transaction, atomically
    async fn add_balance(&self, amount: i64) -> Result<Company, AppError>;

    /// Decrease the balance and record a debit transaction, atomically.
    ///
    /// Fails with `AppError::InsufficientBalance` when the balance is lower
    /// than `amount`; nothing is written in that case.
    async fn debit_balance(&self, amount: i64, note: &str) -> Result<(), AppError>;
}

/// Read access to the ledger
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>, AppError>;
}

/// Storage connectivity probe
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;
}
