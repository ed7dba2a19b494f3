// src/main.rs

use std::env;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

mod db;
mod models;
mod rota;
mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Initialize DB pool
    let pool = db::connect().await?;
    let state = AppState { pool };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Root API router
    let api = Router::new()
        // health
        .route("/health", get(routes::health::health))
        // organizations
        .route(
            "/api/v1/organizations",
            post(routes::organizations::create_org).get(routes::organizations::list_orgs),
        )
        .route(
            "/api/v1/organizations/:id",
            get(routes::organizations::get_org)
                .patch(routes::organizations::patch_org)
                .delete(routes::organizations::delete_org),
        )
        // sites
        .route(
            "/api/v1/organizations/:org_id/sites",
            post(routes::sites::create_site).get(routes::sites::list_sites_for_org),
        )
        .route(
            "/api/v1/sites/:id",
            get(routes::sites::get_site)
                .patch(routes::sites::patch_site)
                .delete(routes::sites::delete_site),
        )
        // facilities
        .route(
            "/api/v1/sites/:site_id/facilities",
            post(routes::facilities::create_facility).get(routes::facilities::list_facilities),
        )
        .route("/api/v1/facilities/:id", delete(routes::facilities::delete_facility))
        // staff directory
        .route(
            "/api/v1/staff",
            post(routes::staff::create_staff).get(routes::staff::list_staff),
        )
        .route(
            "/api/v1/staff/:id",
            patch(routes::staff::patch_staff).delete(routes::staff::delete_staff),
        )
        // rota weeks
        .route(
            "/api/v1/sites/:site_id/rota-weeks",
            post(routes::rota_weeks::fetch_or_create_week),
        )
        .route(
            "/api/v1/rota-weeks/:id",
            get(routes::rota_weeks::get_week).patch(routes::rota_weeks::update_week_status),
        )
        .route(
            "/api/v1/rota-weeks/:id/violations",
            get(routes::rota_weeks::week_violations),
        )
        // shifts
        .route(
            "/api/v1/rota-weeks/:id/shifts",
            post(routes::shifts::add_shift).get(routes::shifts::list_shifts),
        )
        .route(
            "/api/v1/shifts/:id",
            patch(routes::shifts::update_shift).delete(routes::shifts::delete_shift),
        )
        // on-call assignments (organisation-wide)
        .route(
            "/api/v1/organizations/:org_id/oncalls",
            post(routes::oncalls::upsert_oncall)
                .get(routes::oncalls::list_oncalls)
                .delete(routes::oncalls::delete_oncalls_for_day),
        )
        .route(
            "/api/v1/organizations/:org_id/oncalls/copy",
            post(routes::oncalls::copy_oncalls_from_day),
        )
        .route("/api/v1/oncalls/:id", delete(routes::oncalls::delete_oncall))
        // per-site rule configuration
        .route(
            "/api/v1/sites/:site_id/rota-rule",
            get(routes::rota_rules::get_rota_rule).put(routes::rota_rules::upsert_rota_rule),
        )
        .route(
            "/api/v1/rota-rules/:id/staffing-rules",
            put(routes::rota_rules::bulk_upsert_staffing_rules)
                .get(routes::rota_rules::list_staffing_rules),
        )
        // day confirmations & override audit trail
        .route(
            "/api/v1/rota-weeks/:id/confirmations",
            post(routes::confirmations::confirm_day)
                .get(routes::confirmations::list_confirmations),
        )
        .route(
            "/api/v1/rota-weeks/:id/confirmations/:date",
            delete(routes::confirmations::reset_day_confirmation),
        )
        .route(
            "/api/v1/rota-weeks/:id/overrides",
            get(routes::confirmations::list_overrides),
        )
        // recurring workflow tasks
        .route(
            "/api/v1/organizations/:org_id/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/api/v1/tasks/:id",
            patch(routes::tasks::patch_task).delete(routes::tasks::delete_task),
        )
        .route(
            "/api/v1/tasks/:id/completions",
            post(routes::tasks::complete_task).get(routes::tasks::list_completions),
        )
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Port (axum 0.7 style)
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080); // default 8080

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("API listening on http://127.0.0.1:{port}");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
