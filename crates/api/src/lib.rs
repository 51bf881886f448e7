pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (no team prefix)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me))
        .route("/me", put(routes::auth::update_me));

    // Team routes
    let team_routes = Router::new()
        .route("/", get(routes::team::list))
        .route("/", post(routes::team::create))
        .route("/join", post(routes::team::join))
        .route("/{team_id}", get(routes::team::get))
        .route("/{team_id}/settings", put(routes::team::update_settings))
        .route("/{team_id}/leave", post(routes::team::leave))
        .route("/{team_id}/rights", get(routes::team::rights))
        .route("/{team_id}/report", get(routes::team::report));

    // Member routes (under team)
    let member_routes = Router::new()
        .route("/", get(routes::member::list).post(routes::member::add))
        .route("/{user_id}", put(routes::member::change_role))
        .route("/{user_id}", delete(routes::member::remove));

    // Role routes (under team)
    let role_routes = Router::new()
        .route("/", get(routes::role::list))
        .route("/{name}", put(routes::role::upsert))
        .route("/{name}", delete(routes::role::delete));

    // Task routes (under team)
    let task_routes = Router::new()
        .route("/", get(routes::task::list))
        .route("/", post(routes::task::create))
        .route("/{task_id}", get(routes::task::get))
        .route("/{task_id}", put(routes::task::update))
        .route("/{task_id}", delete(routes::task::delete))
        .route("/{task_id}/status", post(routes::task::set_status))
        .route("/{task_id}/toggle", post(routes::task::toggle));

    // Category routes (under team)
    let category_routes = Router::new()
        .route("/", get(routes::category::list))
        .route("/", post(routes::category::create))
        .route("/{category_id}", put(routes::category::rename))
        .route("/{category_id}", delete(routes::category::delete));

    // Compose API
    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/team", team_routes)
        .nest("/team/{team_id}/member", member_routes)
        .nest("/team/{team_id}/role", role_routes)
        .nest("/team/{team_id}/task", task_routes)
        .nest("/team/{team_id}/category", category_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
