//! Company usecases. These choose the HTTP status of their outcome.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{info, instrument};

use crate::domain::{AppError, Company, CompanyRepository, CompanyRequest, NewCompany, TopupCompanyBalance};

use super::status::{StatusError, StatusResult};

/// Status for failed writes: 404 for a missing record, 422 otherwise
fn write_failure(err: AppError) -> StatusError {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    StatusError::new(status, err)
}

pub struct CompanyService {
    company: Arc<dyn CompanyRepository>,
}

impl CompanyService {
    #[must_use]
    pub fn new(company: Arc<dyn CompanyRepository>) -> Self {
        Self { company }
    }

    #[instrument(skip(self))]
    pub async fn get_company_info(&self) -> StatusResult<Company> {
        match self.company.get().await {
            Ok(company) => Ok((company, StatusCode::OK)),
            Err(err) if err.is_not_found() => Err(StatusError::new(StatusCode::NOT_FOUND, err)),
            Err(err) => Err(StatusError::new(StatusCode::INTERNAL_SERVER_ERROR, err)),
        }
    }

    /// Insert-or-overwrite is decided by the repository
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_or_update_company(&self, request: &CompanyRequest) -> StatusResult<Company> {
        let company = self
            .company
            .create_or_update(&NewCompany::from(request))
            .await
            .map_err(write_failure)?;
        Ok((company, StatusCode::OK))
    }

    #[instrument(skip(self, request), fields(amount = request.balance))]
    pub async fn topup_balance(&self, request: &TopupCompanyBalance) -> StatusResult<Company> {
        let company = self
            .company
            .add_balance(request.balance)
            .await
            .map_err(write_failure)?;
        info!(balance = company.balance, "Company balance topped up");
        Ok((company, StatusCode::OK))
    }
}
