use crate::config::db::DB;
use crate::config::rd::RD;
use crate::config::AppConfig;
use crate::errors::{any_error, ApiError};
use crate::middleware::session::load_session;
use crate::route::emit::JsonEmitter;
use crate::route::{auth_api, post_api};
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

pub mod config;
pub mod errors;
pub mod middleware;
pub mod model;
pub mod route;
pub mod service;
pub mod store;
pub mod util;

// Application state shared across handlers
// Cloning AppState is cheap because it uses Arc internally to share the storage and Redis clients.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DB>,
    pub rd: Arc<RD>,
    pub emitter: JsonEmitter,
}

// Application router creation
// Note: The order of layers is important.
pub fn create_app(state: AppState) -> Router {
    let config = &state.config;

    let api = Router::new()
        .merge(post_api::create_routes())
        .merge(auth_api::create_routes(&state))
        .layer(axum::middleware::from_fn_with_state(state.clone(), load_session));

    let mut app = Router::new()
        .nest("/api", api)
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(DefaultBodyLimit::max(config.http.max_body_size as usize))
                .layer(config.http.cors.clone().into_layer()),
        );

    if config.log.log_requests {
        app = app.layer(TraceLayer::new_for_http());
    }
    app.with_state(state)
}

impl AppState {
    /// Opens the storage and Redis clients described by `config`.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db = DB::new(&config.db.url, config.db.pool_size)
            .await
            .context("Cannot connect to database")?;

        let rd = RD::new(&config.redis.url)
            .await
            .context("Cannot connect to redis server")?;

        Ok(AppState {
            config: Arc::new(config),
            db: Arc::new(db),
            rd: Arc::new(rd),
            emitter: JsonEmitter,
        })
    }
}

pub async fn handle_404(_uri: Uri) -> ApiError {
    any_error(404, "Not Found", None)
}

async fn handle_405() -> ApiError {
    any_error(405, "Method Not Allowed", None)
}

// Custom panic handler, logs the panic and returns a 500 response
fn handle_panic(panic: Box<dyn std::any::Any + Send>) -> Response {
    let panic_message = if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Unknown panic"
    };

    error!("App panicked: {}", panic_message);
    any_error(500, "Internal Server Error", None).into_response()
}
