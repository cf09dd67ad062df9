//! Domain types with validation support.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Ledger note attached to every company top-up
pub const TOPUP_NOTE: &str = "Topup balance company";

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Balance increase (top-up)
    Credit,
    /// Balance decrease (salary withdrawal)
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job position with its monthly salary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Position {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "CEO")]
    pub name: String,
    #[schema(example = 5000)]
    pub salary: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Budi")]
    pub name: String,
    /// Withdrawal credential, never rendered in responses
    #[serde(skip_serializing, default)]
    pub secret_id: String,
    #[schema(example = "budi@example.com")]
    pub email: String,
    #[schema(example = "08123456789")]
    pub phone: String,
    #[schema(example = "Jln. Malioboro")]
    pub address: String,
    #[schema(example = 1)]
    pub position_id: i64,
    /// Joined position, populated by single-record lookups
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<Position>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The single company record owning the payroll balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Company {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "PT SEJAHTERA SELAMANYA")]
    pub name: String,
    #[schema(example = "Jln. Malioboro")]
    pub address: String,
    #[schema(example = 20000000)]
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only ledger entry recording a balance change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Transaction {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 5000)]
    pub amount: i64,
    #[schema(example = "Budi withdraw salary ")]
    pub note: String,
    pub r#type: TransactionType,
    pub created_at: DateTime<Utc>,
}

/// Fields written when creating or updating a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub secret_id: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub position_id: i64,
}

/// Fields written when creating or updating a position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPosition {
    pub name: String,
    pub salary: i64,
}

/// Fields written when creating or updating the company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub address: String,
    pub balance: i64,
}

/// Request body for creating or editing a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Budi")]
    pub name: String,
    #[validate(length(min = 1, message = "Secret id is required"))]
    #[schema(example = "s3cr3t")]
    pub secret_id: String,
    #[validate(email(message = "Email must be a valid address"))]
    #[schema(example = "budi@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    #[schema(example = "08123456789")]
    pub phone: String,
    #[validate(length(min = 1, message = "Address is required"))]
    #[schema(example = "Jln. Malioboro")]
    pub address: String,
    #[schema(example = 1)]
    pub position_id: i64,
}

impl From<&UserRequest> for NewUser {
    fn from(req: &UserRequest) -> Self {
        Self {
            name: req.name.clone(),
            secret_id: req.secret_id.clone(),
            email: req.email.clone(),
            phone: req.phone.clone(),
            address: req.address.clone(),
            position_id: req.position_id,
        }
    }
}

/// Request body for creating or editing a position
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PositionRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "CEO")]
    pub name: String,
    #[validate(range(min = 0, message = "Salary must not be negative"))]
    #[schema(example = 5000)]
    pub salary: i64,
}

impl From<&PositionRequest> for NewPosition {
    fn from(req: &PositionRequest) -> Self {
        Self {
            name: req.name.clone(),
            salary: req.salary,
        }
    }
}

/// Request body for creating or replacing the company record
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompanyRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "PT SEJAHTERA SELAMANYA")]
    pub name: String,
    #[validate(range(min = 0, message = "Balance must not be negative"))]
    #[schema(example = 20000000)]
    pub balance: i64,
    #[validate(length(min = 1, message = "Address is required"))]
    #[schema(example = "Jln. Malioboro")]
    pub address: String,
}

impl From<&CompanyRequest> for NewCompany {
    fn from(req: &CompanyRequest) -> Self {
        Self {
            name: req.name.clone(),
            address: req.address.clone(),
            balance: req.balance,
        }
    }
}

/// Request body for topping up the company balance
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TopupCompanyBalance {
    #[validate(range(min = 1, message = "Balance must be greater than 0"))]
    #[schema(example = 5000000)]
    pub balance: i64,
}

/// Request body for an employee salary withdrawal
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct WithdrawRequest {
    #[schema(example = 1)]
    pub id: i64,
    #[validate(length(min = 1, message = "Secret id is required"))]
    #[schema(example = "s3cr3t")]
    pub secret_id: String,
}

/// Offset pagination parameters for list requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[serde(default = "default_limit")]
    #[schema(example = 10)]
    pub limit: i64,
    /// Number of items to skip
    #[validate(range(min = 0, message = "Offset must not be negative"))]
    #[serde(default)]
    #[schema(example = 0)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    10
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Health status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
}

impl HealthResponse {
    #[must_use]
    pub fn new(database: HealthStatus) -> Self {
        Self {
            status: database,
            database,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn user_request() -> UserRequest {
        UserRequest {
            name: "test".to_string(),
            secret_id: "secret".to_string(),
            email: "test@test.com".to_string(),
            phone: "123456789".to_string(),
            address: "test address".to_string(),
            position_id: 1,
        }
    }

    #[test]
    fn test_transaction_type_display_and_parsing() {
        for (kind, string) in [
            (TransactionType::Credit, "credit"),
            (TransactionType::Debit, "debit"),
        ] {
            assert_eq!(kind.as_str(), string);
            assert_eq!(kind.to_string(), string);
            assert_eq!(TransactionType::from_str(string).unwrap(), kind);
        }

        assert!(TransactionType::from_str("refund").is_err());
    }

    #[test]
    fn test_user_request_validation() {
        assert!(user_request().validate().is_ok());

        let mut req = user_request();
        req.name = String::new();
        assert!(req.validate().is_err());

        let mut req = user_request();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());

        let mut req = user_request();
        req.secret_id = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_position_and_balance_requests_validation() {
        let req = PositionRequest {
            name: "CEO".to_string(),
            salary: 0,
        };
        assert!(req.validate().is_ok());

        let req = PositionRequest {
            name: "CEO".to_string(),
            salary: -1,
        };
        assert!(req.validate().is_err());

        assert!(TopupCompanyBalance { balance: 0 }.validate().is_err());
        assert!(TopupCompanyBalance { balance: 1 }.validate().is_ok());
    }

    #[test]
    fn test_new_user_from_request_copies_every_field() {
        let req = user_request();
        let new_user = NewUser::from(&req);
        assert_eq!(
            new_user,
            NewUser {
                name: "test".to_string(),
                secret_id: "secret".to_string(),
                email: "test@test.com".to_string(),
                phone: "123456789".to_string(),
                address: "test address".to_string(),
                position_id: 1,
            }
        );
    }

    #[test]
    fn test_user_serialization_hides_secret() {
        let now = Utc::now();
        let user = User {
            id: 1,
            name: "test".to_string(),
            secret_id: "secret".to_string(),
            email: "test@test.com".to_string(),
            phone: "123456789".to_string(),
            address: "test address".to_string(),
            position_id: 1,
            position: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("secret_id").is_none());
        assert!(json.get("position").is_none());
        assert_eq!(json["name"], "test");
    }

    #[test]
    fn test_pagination_defaults() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset, 0);
        assert!(params.validate().is_ok());
    }
}
