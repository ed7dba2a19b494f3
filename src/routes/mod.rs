use axum::http::StatusCode;

pub mod confirmations;
pub mod facilities;
pub mod health;
pub mod oncalls;
pub mod organizations;
pub mod rota_rules;
pub mod rota_weeks;
pub mod shifts;
pub mod sites;
pub mod staff;
pub mod tasks;

// Common error mappers

pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    tracing::error!("store operation failed: {e}");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

pub fn bad_request<M: std::fmt::Display>(msg: M) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.to_string())
}
