//! HTTP request handlers with OpenAPI documentation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

use crate::app::{AppState, StatusError};
use crate::domain::{
    AppError, Company, CompanyRequest, DatabaseError, HealthResponse, HealthStatus,
    PaginationParams, Position, PositionRequest, TopupCompanyBalance, Transaction,
    TransactionType, User, UserRequest, ValidationError, WithdrawRequest,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Ledger API",
        version = "0.1.0",
        description = "Employees, positions, the company balance and its transaction ledger",
        license(
            name = "MIT"
        )
    ),
    paths(
        health_check_handler,
        liveness_handler,
        readiness_handler,
        fetch_users_handler,
        store_user_handler,
        get_user_handler,
        edit_user_handler,
        destroy_user_handler,
        withdraw_salary_handler,
        fetch_positions_handler,
        store_position_handler,
        get_position_handler,
        edit_position_handler,
        destroy_position_handler,
        get_company_handler,
        create_or_update_company_handler,
        topup_company_handler,
        fetch_transactions_handler,
    ),
    components(
        schemas(
            User,
            Position,
            Company,
            Transaction,
            TransactionType,
            UserRequest,
            PositionRequest,
            CompanyRequest,
            TopupCompanyBalance,
            WithdrawRequest,
            PaginationParams,
            HealthResponse,
            HealthStatus,
            MessageResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "users", description = "Employee management and salary withdrawal"),
        (name = "positions", description = "Job positions and salaries"),
        (name = "company", description = "Company record and balance"),
        (name = "transactions", description = "Balance ledger"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Success envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[schema(example = "success")]
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: "success".to_string(),
            data,
        }
    }
}

/// Success envelope for operations without a payload
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    #[schema(example = "success")]
    pub message: String,
    #[schema(value_type = Option<String>)]
    pub data: Option<()>,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "success".to_string(),
            data: None,
        }
    }
}

/// Failure envelope; `message` carries the error type
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    #[schema(example = "validation_error")]
    pub message: String,
    #[schema(example = "secret id not valid")]
    pub error: String,
}

type JsonResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Unwrap a JSON body and run its `validator` rules
fn validated_body<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        AppError::Validation(ValidationError::InvalidField {
            field: "body".to_string(),
            message: rejection.body_text(),
        })
    })?;
    body.validate()
        .map_err(|e| AppError::Validation(ValidationError::Multiple(e.to_string())))?;
    Ok(body)
}

fn validated_page(
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<PaginationParams, AppError> {
    let Query(params) = params.map_err(|rejection| {
        AppError::Validation(ValidationError::InvalidField {
            field: "query".to_string(),
            message: rejection.body_text(),
        })
    })?;
    params
        .validate()
        .map_err(|e| AppError::Validation(ValidationError::Multiple(e.to_string())))?;
    Ok(params)
}

fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    let Path(id) = id.map_err(|rejection| {
        AppError::Validation(ValidationError::InvalidField {
            field: "id".to_string(),
            message: rejection.body_text(),
        })
    })?;
    Ok(id)
}

/// Detailed health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status", body = HealthResponse)
    )
)]
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(database_health(&state).await)
}

/// Kubernetes liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Application is alive")
    )
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Application is ready to serve traffic"),
        (status = 503, description = "Application is not ready")
    )
)]
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    match database_health(&state).await.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn database_health(state: &AppState) -> HealthResponse {
    let database = match state.health.health_check().await {
        Ok(()) => HealthStatus::Healthy,
        Err(e) => {
            error!(error = %e, "Database health check failed");
            HealthStatus::Unhealthy
        }
    };
    HealthResponse::new(database)
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum number of users to return (1-100, default: 10)"),
        ("offset" = Option<i64>, Query, description = "Number of users to skip (default: 0)")
    ),
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<User>>),
        (status = 400, description = "Invalid pagination parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn fetch_users_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> JsonResult<Vec<User>> {
    let page = validated_page(params)?;
    let users = state.users.fetch_user(page.limit, page.offset).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// Create a user
///
/// The referenced position must exist; otherwise the request fails with
/// `position id not valid `.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserRequest,
    responses(
        (status = 200, description = "User created", body = ApiResponse<User>),
        (status = 400, description = "Validation error or unknown position", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn store_user_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> JsonResult<User> {
    let request = validated_body(payload)?;
    let user = state.users.store_user(&request).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Get a user with its position
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<User>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> JsonResult<User> {
    let id = path_id(id)?;
    let user = state.users.get_by_id(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Replace a user's fields
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<User>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Referenced position does not exist", body = ErrorResponse)
    )
)]
pub async fn edit_user_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> JsonResult<User> {
    let id = path_id(id)?;
    let request = validated_body(payload)?;
    let user = state.users.edit_user(id, &request).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn destroy_user_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = path_id(id)?;
    state.users.destroy_user(id).await?;
    Ok(Json(MessageResponse::ok()))
}

/// Withdraw a user's salary from the company balance
///
/// Debits the salary of the user's position and appends a `debit` entry to
/// the ledger in one database transaction.
#[utoipa::path(
    post,
    path = "/users/withdraw",
    tag = "users",
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Salary withdrawn", body = MessageResponse),
        (status = 400, description = "Secret id not valid", body = ErrorResponse),
        (status = 404, description = "User or company not found", body = ErrorResponse),
        (status = 422, description = "Company balance too low", body = ErrorResponse)
    )
)]
pub async fn withdraw_salary_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let request = validated_body(payload)?;
    state.users.withdraw_salary(&request).await?;
    Ok(Json(MessageResponse::ok()))
}

/// List positions
#[utoipa::path(
    get,
    path = "/positions",
    tag = "positions",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum number of positions to return (1-100, default: 10)"),
        ("offset" = Option<i64>, Query, description = "Number of positions to skip (default: 0)")
    ),
    responses(
        (status = 200, description = "List of positions", body = ApiResponse<Vec<Position>>),
        (status = 400, description = "Invalid pagination parameters", body = ErrorResponse)
    )
)]
pub async fn fetch_positions_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> JsonResult<Vec<Position>> {
    let page = validated_page(params)?;
    let positions = state
        .positions
        .fetch_position(page.limit, page.offset)
        .await?;
    Ok(Json(ApiResponse::ok(positions)))
}

/// Create a position
#[utoipa::path(
    post,
    path = "/positions",
    tag = "positions",
    request_body = PositionRequest,
    responses(
        (status = 200, description = "Position created", body = ApiResponse<Position>),
        (status = 400, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn store_position_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> JsonResult<Position> {
    let request = validated_body(payload)?;
    let position = state.positions.store_position(&request).await?;
    Ok(Json(ApiResponse::ok(position)))
}

#[utoipa::path(
    get,
    path = "/positions/{id}",
    tag = "positions",
    params(
        ("id" = i64, Path, description = "Position ID")
    ),
    responses(
        (status = 200, description = "Position found", body = ApiResponse<Position>),
        (status = 404, description = "Position not found", body = ErrorResponse)
    )
)]
pub async fn get_position_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> JsonResult<Position> {
    let id = path_id(id)?;
    let position = state.positions.get_by_id(id).await?;
    Ok(Json(ApiResponse::ok(position)))
}

#[utoipa::path(
    put,
    path = "/positions/{id}",
    tag = "positions",
    params(
        ("id" = i64, Path, description = "Position ID")
    ),
    request_body = PositionRequest,
    responses(
        (status = 200, description = "Position updated", body = ApiResponse<Position>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Position not found", body = ErrorResponse)
    )
)]
pub async fn edit_position_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PositionRequest>, JsonRejection>,
) -> JsonResult<Position> {
    let id = path_id(id)?;
    let request = validated_body(payload)?;
    let position = state.positions.edit_position(id, &request).await?;
    Ok(Json(ApiResponse::ok(position)))
}

/// Delete a position that no user references
#[utoipa::path(
    delete,
    path = "/positions/{id}",
    tag = "positions",
    params(
        ("id" = i64, Path, description = "Position ID")
    ),
    responses(
        (status = 200, description = "Position deleted", body = MessageResponse),
        (status = 404, description = "Position not found", body = ErrorResponse),
        (status = 409, description = "Position still assigned to users", body = ErrorResponse)
    )
)]
pub async fn destroy_position_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = path_id(id)?;
    state.positions.destroy_position(id).await?;
    Ok(Json(MessageResponse::ok()))
}

/// Get the company record
#[utoipa::path(
    get,
    path = "/company",
    tag = "company",
    responses(
        (status = 200, description = "Company found", body = ApiResponse<Company>),
        (status = 404, description = "No company configured", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_company_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.company.get_company_info().await {
        Ok((company, status)) => (status, Json(ApiResponse::ok(company))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Create the company, or overwrite it when one exists
#[utoipa::path(
    post,
    path = "/company",
    tag = "company",
    request_body = CompanyRequest,
    responses(
        (status = 200, description = "Company stored", body = ApiResponse<Company>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 422, description = "Company could not be stored", body = ErrorResponse)
    )
)]
pub async fn create_or_update_company_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompanyRequest>, JsonRejection>,
) -> Response {
    let request = match validated_body(payload) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    match state.company.create_or_update_company(&request).await {
        Ok((company, status)) => (status, Json(ApiResponse::ok(company))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Add funds to the company balance
///
/// Appends a `credit` entry with the note `Topup balance company`.
#[utoipa::path(
    post,
    path = "/company/topup",
    tag = "company",
    request_body = TopupCompanyBalance,
    responses(
        (status = 200, description = "Balance topped up", body = ApiResponse<Company>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "No company configured", body = ErrorResponse),
        (status = 422, description = "Top-up failed", body = ErrorResponse)
    )
)]
pub async fn topup_company_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TopupCompanyBalance>, JsonRejection>,
) -> Response {
    let request = match validated_body(payload) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    match state.company.topup_balance(&request).await {
        Ok((company, status)) => (status, Json(ApiResponse::ok(company))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// List ledger entries in insertion order
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum number of entries to return (1-100, default: 10)"),
        ("offset" = Option<i64>, Query, description = "Number of entries to skip (default: 0)")
    ),
    responses(
        (status = 200, description = "Ledger entries", body = ApiResponse<Vec<Transaction>>),
        (status = 400, description = "Invalid pagination parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn fetch_transactions_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Response {
    let page = match validated_page(params) {
        Ok(page) => page,
        Err(err) => return err.into_response(),
    };
    match state.transactions.fetch(page.limit, page.offset).await {
        Ok((items, status)) => (status, Json(ApiResponse::ok(items))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Default status and error type for an application error
fn classify(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::Database(db_err) => match db_err {
            DatabaseError::Connection(_) => (StatusCode::SERVICE_UNAVAILABLE, "database_error"),
            DatabaseError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DatabaseError::Duplicate(_) => (StatusCode::CONFLICT, "duplicate"),
            DatabaseError::ForeignKey(_) => (StatusCode::CONFLICT, "conflict"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        },
        AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        AppError::InsufficientBalance { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_balance")
        }
        AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}

fn error_response(status: StatusCode, error_type: &str, err: &AppError) -> Response {
    let message = err.to_string();

    if status.is_server_error() {
        error!(error_type = %error_type, message = %message, "Server error");
    }

    let body = Json(ErrorResponse {
        success: false,
        message: error_type.to_string(),
        error: message,
    });

    (status, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = classify(&self);
        error_response(status, error_type, &self)
    }
}

/// Renders with the status the usecase chose
impl IntoResponse for StatusError {
    fn into_response(self) -> Response {
        let (_, error_type) = classify(&self.source);
        error_response(self.status, error_type, &self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_classify_error_statuses() {
        assert_eq!(
            classify(&AppError::not_found("user 1")).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            classify(&AppError::Database(DatabaseError::ForeignKey("fk".into()))).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            classify(&AppError::Database(DatabaseError::Connection("down".into()))).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            classify(&AppError::Validation(ValidationError::SecretIdNotValid)).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            classify(&AppError::InsufficientBalance {
                available: 1,
                requested: 2
            })
            .0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_app_error_envelope() {
        let response = AppError::from(ValidationError::PositionIdNotValid).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "validation_error");
        assert_eq!(json["error"], "position id not valid ");
    }

    #[tokio::test]
    async fn test_status_error_keeps_chosen_status() {
        let err = StatusError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(DatabaseError::Query("boom".into())),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["message"], "database_error");
    }

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"], serde_json::json!([1, 2]));

        let json = serde_json::to_value(MessageResponse::ok()).unwrap();
        assert!(json["data"].is_null());
    }
}
