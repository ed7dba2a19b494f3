// src/rota/mod.rs
//
// Pure scheduling logic: no sqlx, no axum. Everything here takes plain data
// and an explicit date where "now" matters, so it is unit-testable without a
// database.

pub mod recurrence;
pub mod rules;
pub mod shift_time;
