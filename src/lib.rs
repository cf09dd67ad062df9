//! Payroll ledger service: employees, positions, a company balance and its transaction history.

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
