use crate::service::auth_service::AuthService;
use crate::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, error};

pub const SESSION_COOKIE: &str = "token";

/// Middleware attaching the caller's [`Session`](crate::model::user::Session) to the request.
///
/// The token is read from the `token` cookie, falling back to a `Bearer` authorization header.
/// Requests without a token, with one that no longer maps to a session, or arriving while the
/// session store is unreachable pass through anonymously. Handlers that need an identity read
/// it as `Option<Extension<Session>>`.
pub async fn load_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = get_cookie(&request, SESSION_COOKIE).or_else(|| extract_bearer(&request));

    if let Some(token) = token {
        match AuthService::resolve(&state.rd, &token).await {
            Ok(Some(session)) => {
                request.extensions_mut().insert(session);
            }
            Ok(None) => debug!("ignoring unknown session token"),
            Err(e) => error!("cannot resolve session, continuing anonymously: {:?}", e),
        }
    }

    next.run(request).await
}

// Helper function to extract Bearer token from Authorization header
pub fn extract_bearer(request: &Request) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;

    Some(token.to_string())
}

// Helper function to get a cookie by name from the request
pub fn get_cookie(request: &Request, name: &str) -> Option<String> {
    let cookie_header = request.headers().get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    cookie_str.split(';').find_map(|s| {
        let (cookie_name, cookie_value) = s.trim().split_once('=')?;

        if cookie_name == name {
            Some(cookie_value.to_string())
        } else {
            None
        }
    })
}
