use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all Quire endpoints.
pub fn build_router(engine: AppState) -> Router {
    let docs = Router::new()
        .route("/createDoc", post(handler::create_doc))
        .route("/saveDoc", post(handler::save_doc))
        .route("/pastVersion", post(handler::past_version))
        .route("/copyDoc", post(handler::copy_doc))
        .route("/openDoc", post(handler::open_doc))
        .route("/allDocs", get(handler::all_docs))
        .route("/history", post(handler::history))
        .route("/reviewUpstream", post(handler::review_upstream))
        .route("/getUpstream", post(handler::get_upstream))
        .route("/requestMerge", post(handler::request_merge))
        .route("/reviewPullRequest", post(handler::review_pull_request))
        .route("/actionPullRequest", post(handler::action_pull_request));

    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .nest("/api/doc", docs)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}
