use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, downloads, events};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/sign_up", get(auth::sign_up_page).post(auth::sign_up))
        .route("/download", get(downloads::download_guide))
        .route("/download1", get(downloads::download_template));

    let protected_routes = Router::new()
        .route("/", get(events::index))
        .route("/events", get(events::feed))
        .route("/logout", get(auth::logout))
        .route("/upload_csv", post(events::upload_csv))
        .route("/insert", post(events::insert))
        .route("/update", post(events::update))
        .route("/ajax_delete", post(events::delete))
        .route("/delete_all", post(events::delete_all))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
