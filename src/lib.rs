use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod directory;
pub mod errors;
pub mod http;
pub mod logging;
pub mod response_log;

use directory::CarrierDirectory;
use response_log::ResponseStore;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<CarrierDirectory>,
    pub responses: Arc<dyn ResponseStore>,
}

impl AppState {
    pub fn new(directory: CarrierDirectory, responses: Arc<dyn ResponseStore>) -> Self {
        Self {
            directory: Arc::new(directory),
            responses,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(http::handlers::root))
        .route("/health", get(http::handlers::health))
        .route("/check-carrier", post(http::handlers::check_carrier))
        .route("/carriers", get(http::handlers::list_carriers))
        .route("/carrier/{id}", get(http::handlers::carrier_by_id))
        .route("/carrier/dot/{dot}", get(http::handlers::carrier_by_dot))
        .route("/carrier/mc/{mc}", get(http::handlers::carrier_by_mc))
        .route("/store-response", post(http::handlers::store_response))
        .route("/responses", get(http::handlers::list_responses))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
