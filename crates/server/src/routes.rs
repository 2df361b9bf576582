use axum::{
    middleware,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::auth::{self, ServerState};

pub mod cars;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public catalogue routes plus the
/// owner-scoped routes behind the bearer-token middleware.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/cars/all-ads", get(cars::all_ads));

    let protected = Router::new()
        .route("/cars", get(cars::list_cars).post(cars::create_car))
        .route("/cars/expired", get(cars::expired_cars))
        .route(
            "/cars/:id",
            get(cars::get_car).patch(cars::update_car).delete(cars::delete_car),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
