pub mod auth;
pub mod error;
mod productos;
mod reportes;
mod validation;
mod ventas;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (no token required)
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/health", get(health_check));

    // Everything else sits behind the auth middleware
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        // Catalog
        .route("/productos", get(productos::list_productos))
        .route("/productos", post(productos::create_producto))
        .route("/productos/:id", get(productos::get_producto))
        .route("/productos/:id", patch(productos::patch_producto))
        .route("/productos/:id", put(productos::put_producto))
        .route("/productos/:id", delete(productos::delete_producto))
        // Sales
        .route("/ventas", post(ventas::create_venta))
        .route("/ventas/diarias", get(ventas::ventas_diarias))
        // Reports
        .route("/reportes/ventas", get(reportes::reporte_ventas))
        .route("/reportes/mas-vendidos", get(reportes::mas_vendidos))
        .route("/reportes/inventario", get(reportes::inventario))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the configured origin allow-list. Requests without
/// an Origin header (server-to-server) pass through untouched.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    port: u16,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        port: state.config.server.port,
    })
}
