//! HTTP API Layer
//!
//! This crate provides the REST API for the invoicing backend using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Registration, login, profiles, invoices and payments
//! - **Middleware**: Bearer authentication and audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Every failure is returned as `{"error": "..."}`
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_invoicing::{
    CatalogPort, InvoicePort, InvoiceService, PaymentPort, PaymentService, UserPort, UserService,
};
use infra_db::PostgresInvoicingAdapter;

use crate::config::ApiConfig;
use crate::handlers::{health, invoices, payments, users};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub invoices: InvoiceService,
    pub payments: PaymentService,
    pub users: UserService,
}

impl AppState {
    /// State backed by PostgreSQL through `pool`
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let store = Arc::new(PostgresInvoicingAdapter::new(pool.clone()));
        Self::with_store(pool, config, store)
    }

    /// State whose services run against `store`
    ///
    /// The pool is still used by the readiness check.
    pub fn with_store<S>(pool: PgPool, config: ApiConfig, store: Arc<S>) -> Self
    where
        S: CatalogPort + InvoicePort + PaymentPort + UserPort + 'static,
    {
        let invoices = InvoiceService::new(store.clone(), store.clone());
        let payments = PaymentService::new(store.clone(), config.payment_gateway_url.clone());
        let users = UserService::new(store);

        Self {
            pool,
            config,
            invoices,
            payments,
            users,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    router(AppState::new(pool, config))
}

/// Builds the router around an existing state
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/register", post(users::register))
        .route("/login", post(users::login));

    // Audit runs inside auth so it sees the caller's claims
    let protected_routes = Router::new()
        .route("/profile/update", put(users::update_profile))
        .route("/invoice/create", post(invoices::create_invoice))
        .route("/invoice/:id/update", put(invoices::update_invoice))
        .route("/payment/initiate", post(payments::initiate_payment))
        .route("/payment/verify/:transaction_id", get(payments::verify_payment))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
