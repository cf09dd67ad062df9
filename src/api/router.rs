//! Router construction.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app::AppState;

use super::handlers::{
    ApiDoc, create_or_update_company_handler, destroy_position_handler, destroy_user_handler,
    edit_position_handler, edit_user_handler, fetch_positions_handler, fetch_transactions_handler,
    fetch_users_handler, get_company_handler, get_position_handler, get_user_handler,
    health_check_handler, liveness_handler, readiness_handler, store_position_handler,
    store_user_handler, topup_company_handler, withdraw_salary_handler,
};

/// Upper bound for JSON request bodies
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the application router with request tracing, a body size limit, CORS and Swagger UI
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health_check_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/users", get(fetch_users_handler).post(store_user_handler))
        .route("/users/withdraw", post(withdraw_salary_handler))
        .route(
            "/users/{id}",
            get(get_user_handler)
                .put(edit_user_handler)
                .delete(destroy_user_handler),
        )
        .route(
            "/positions",
            get(fetch_positions_handler).post(store_position_handler),
        )
        .route(
            "/positions/{id}",
            get(get_position_handler)
                .put(edit_position_handler)
                .delete(destroy_position_handler),
        )
        .route(
            "/company",
            get(get_company_handler).post(create_or_update_company_handler),
        )
        .route("/company/topup", post(topup_company_handler))
        .route("/transactions", get(fetch_transactions_handler))
        .with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(cors),
        )
}
