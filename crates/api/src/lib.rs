//! HTTP API for the Irth Biladi and Cilka storefronts.
//!
//! Serves the catalog, checkout, accounts and admin dashboard under `/api`,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod notify;
pub mod response;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use notify::Notifier;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// `cors_origin` restricts browser access to one origin; `None` allows any.
pub fn create_app(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    cors_origin: Option<&str>,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api", api_routes())
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<Arc<AppState>> {
    use routes::{admin, auth, categories, contact, orders, products, settings};

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile).put(auth::update_profile))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/{id}", get(orders::get))
        .route("/settings/delivery-fee", get(settings::delivery_fee))
        .route("/contact", post(contact::submit))
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/{id}", axum::routing::delete(admin::delete_order))
        .route("/admin/orders/{id}/status", put(admin::update_order_status))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}", axum::routing::delete(admin::delete_user))
        .route("/admin/users/{id}/role", put(admin::set_user_role))
        .route("/admin/contact", get(admin::list_contact_messages))
        .route("/admin/settings/delivery-fee", put(admin::set_delivery_fee))
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(_)) => {
            tracing::warn!("ignoring invalid CORS origin, allowing any");
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
