use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/view/toggle", post(handlers::toggle_view))
        .route("/view/filters", post(handlers::set_filters))
        .route("/view/filters/reset", post(handlers::reset_filters))
        .route("/view/page", post(handlers::set_page))
        .route("/view/page-size", post(handlers::set_page_size))
        .route("/refresh", post(handlers::manual_refresh))
        .route("/auto-refresh", post(handlers::toggle_auto_refresh))
        .route("/api/leads", get(handlers::get_leads))
        .route("/api/leads/:key/engagement", get(handlers::get_engagement))
        .route("/api/view", post(handlers::view_command))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/status", get(handlers::get_status))
        .route("/api/refresh", post(handlers::api_refresh))
        .route("/api/auto-refresh", post(handlers::api_auto_refresh))
        .with_state(state)
}
