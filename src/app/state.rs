//! Application state management.

use std::sync::Arc;

use crate::domain::{
    CompanyRepository, HealthCheck, PositionRepository, TransactionRepository, UserRepository,
};

use super::{CompanyService, PositionService, TransactionService, UserService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub positions: Arc<PositionService>,
    pub company: Arc<CompanyService>,
    pub transactions: Arc<TransactionService>,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    /// Wire every usecase to a single storage client
    #[must_use]
    pub fn new<D>(db: Arc<D>) -> Self
    where
        D: UserRepository
            + PositionRepository
            + CompanyRepository
            + TransactionRepository
            + HealthCheck
            + 'static,
    {
        let users = Arc::new(UserService::new(
            Arc::clone(&db) as _,
            Arc::clone(&db) as _,
            Arc::clone(&db) as _,
        ));
        let positions = Arc::new(PositionService::new(Arc::clone(&db) as _));
        let company = Arc::new(CompanyService::new(Arc::clone(&db) as _));
        let transactions = Arc::new(TransactionService::new(Arc::clone(&db) as _));

        Self {
            users,
            positions,
            company,
            transactions,
            health: db,
        }
    }
}
