use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/stats/:metric", get(handlers::get_metric))
        .route("/api/trend", post(handlers::trend))
        .route("/api/meal-plan/cost", get(handlers::meal_plan_cost))
        .route("/api/cost-summary", post(handlers::cost_summary))
        .with_state(state)
}
