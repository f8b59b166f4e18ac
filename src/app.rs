use crate::{handlers, state::AppState};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

async fn health() -> &'static str {
    "ok"
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/users/login", post(handlers::login))
        .route("/api/users/me", get(handlers::me))
        .route("/api/trainers", get(handlers::get_trainers))
        .route(
            "/api/appointments",
            get(handlers::get_appointments).post(handlers::create_appointment),
        )
        .route("/api/appointments/validate", post(handlers::validate_appointment))
        .route(
            "/api/appointments/{id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
