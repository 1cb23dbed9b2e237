pub mod evaluations;
pub mod health;
pub mod questions;
pub mod reports;
pub mod reviews;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health::health))
        .route("/api/v1/health/ready", get(health::ready))
        .route("/api/v1/questions", get(questions::list_questions))
        .route("/api/v1/config/perspectives", get(questions::perspectives))
        .route("/api/v1/config/dimensions", get(questions::dimensions))
        .route(
            "/api/v1/evaluations",
            post(evaluations::create_evaluation).get(evaluations::list_all_evaluations),
        )
        .route("/api/v1/evaluations/:id", get(evaluations::evaluation_detail))
        .route("/api/v1/evaluations/:id/run", post(evaluations::trigger_run))
        .route(
            "/api/v1/evaluations/:id/import",
            post(evaluations::import_eval_responses),
        )
        .route(
            "/api/v1/evaluations/:id/responses",
            get(evaluations::list_responses),
        )
        .route(
            "/api/v1/evaluations/:id/review",
            get(evaluations::next_unscored),
        )
        .route(
            "/api/v1/evaluations/:id/progress",
            get(evaluations::review_progress),
        )
        .route("/api/v1/reviews", post(reviews::submit_review))
        .route("/api/v1/reports/:id", get(reports::get_report))
        .route("/api/v1/reports/:id/generate", post(reports::generate_report))
        .layer(axum::middleware::from_fn(crate::middleware::request_context))
        .with_state(state)
}
