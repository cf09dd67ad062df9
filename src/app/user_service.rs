//! Employee usecases, including the salary withdrawal workflow.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{
    AppError, CompanyRepository, NewUser, PositionRepository, User, UserRepository, UserRequest,
    ValidationError, WithdrawRequest,
};

/// Ledger note for a salary withdrawal. The trailing space is intentional.
pub fn withdraw_note(name: &str) -> String {
    format!("{} withdraw salary ", name)
}

/// Employee service coordinating users, positions and the company balance
pub struct UserService {
    users: Arc<dyn UserRepository>,
    positions: Arc<dyn PositionRepository>,
    company: Arc<dyn CompanyRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        positions: Arc<dyn PositionRepository>,
        company: Arc<dyn CompanyRepository>,
    ) -> Self {
        Self {
            users,
            positions,
            company,
        }
    }

    /// Pay out a user's salary from the company balance.
    ///
    /// The secret must match the stored one exactly. The debit and its ledger
    /// entry are written by the repository as one unit.
    #[instrument(skip(self, request), fields(user_id = request.id))]
    pub async fn withdraw_salary(&self, request: &WithdrawRequest) -> Result<(), AppError> {
        let user = self.users.find_by_id(request.id).await?;

        if request.secret_id != user.secret_id {
            return Err(ValidationError::SecretIdNotValid.into());
        }

        let salary = user
            .position
            .as_ref()
            .map(|p| p.salary)
            .ok_or_else(|| {
                AppError::Internal(format!("position of user {} was not loaded", user.id))
            })?;

        self.company
            .debit_balance(salary, &withdraw_note(&user.name))
            .await?;

        info!(amount = salary, "Salary withdrawn");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<User, AppError> {
        self.users.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_user(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        self.users.fetch(limit, offset).await
    }

    #[instrument(skip(self))]
    pub async fn destroy_user(&self, id: i64) -> Result<(), AppError> {
        self.users.delete(id).await
    }

    /// Overwrite an existing user; the update is skipped when the lookup fails
    #[instrument(skip(self, request))]
    pub async fn edit_user(&self, id: i64, request: &UserRequest) -> Result<User, AppError> {
        self.users.find_by_id(id).await?;
        self.users.update_by_id(id, &NewUser::from(request)).await
    }

    /// Create a user after checking that its position exists
    #[instrument(skip(self, request), fields(position_id = request.position_id))]
    pub async fn store_user(&self, request: &UserRequest) -> Result<User, AppError> {
        self.positions
            .find_by_id(request.position_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ValidationError::PositionIdNotValid.into()
                } else {
                    e
                }
            })?;

        self.users.create(&NewUser::from(request)).await
    }
}
