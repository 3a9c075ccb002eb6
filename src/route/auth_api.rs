use crate::middleware::limit_request::limit_request;
use crate::middleware::session::SESSION_COOKIE;
use crate::model::user::{LoginRequest, LoginResponse, Session};
use crate::route::emit::Emitter;
use crate::service::auth_service::AuthService;
use crate::util::extractor::Json;
use crate::AppState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{middleware, Extension, Router};

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let rd_pool = state.rd.pool.clone();
    let window = state.config.session.login_window_secs;
    let attempts = state.config.session.login_attempts;

    Router::new()
        .route("/login", post(login).layer(middleware::from_fn(move |req, next| {
            limit_request(rd_pool.clone(), window, attempts, req, next)
        })))
        .route("/logout", post(logout))
}

async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let ttl = state.config.session.ttl_secs;

    match AuthService::login(state.db.as_ref(), &state.rd, ttl, &req).await {
        Ok(session) => {
            let cookie = session_cookie(&session.token, ttl);
            let mut res = state.emitter.emit_success(LoginResponse { token: session.token });
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                res.headers_mut().insert(SET_COOKIE, value);
            }
            res
        }
        Err(error) => state.emitter.emit_failure(error),
    }
}

async fn logout(State(state): State<AppState>, session: Option<Extension<Session>>) -> Response {
    let Some(Extension(session)) = session else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match AuthService::logout(&state.rd, &session.token).await {
        Ok(()) => {
            let mut res = StatusCode::NO_CONTENT.into_response();
            res.headers_mut().insert(
                SET_COOKIE,
                HeaderValue::from_static("token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"),
            );
            res
        }
        Err(error) => state.emitter.emit_failure(error),
    }
}

fn session_cookie(token: &str, ttl_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; Max-Age={ttl_secs}; HttpOnly; SameSite=Lax")
}
