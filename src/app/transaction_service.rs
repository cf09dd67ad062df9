//! Ledger read usecase. Transactions are only written by company balance changes.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::instrument;

use crate::domain::{Transaction, TransactionRepository};

use super::status::{StatusError, StatusResult};

pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
}

impl TransactionService {
    #[must_use]
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, limit: i64, offset: i64) -> StatusResult<Vec<Transaction>> {
        self.transactions
            .fetch(limit, offset)
            .await
            .map(|items| (items, StatusCode::OK))
            .map_err(|err| StatusError::new(StatusCode::INTERNAL_SERVER_ERROR, err))
    }
}
