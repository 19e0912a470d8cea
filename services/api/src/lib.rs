use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use shared::DocumentStore;

pub mod config;
pub mod error;
pub mod handlers;
pub mod resources;

pub use config::Config;

use resources::ResourceSpec;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
}

pub fn create_app(state: AppState) -> Router {
    let mut app: Router<AppState> =
        Router::new().route("/health", get(handlers::health_check));

    for resource in state.config.routes.resources() {
        app = app.merge(resource_routes(resource));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer()),
    )
    .with_state(state)
}

// One generic handler set bound per collection; the spec rides along as a
// route extension.
fn resource_routes(resource: &'static ResourceSpec) -> Router<AppState> {
    Router::new()
        .route(
            resource.path,
            get(handlers::list_documents).post(handlers::create_document),
        )
        .route(
            &format!("{}/:id", resource.path),
            get(handlers::get_document).delete(handlers::delete_document),
        )
        .layer(Extension(resource))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
