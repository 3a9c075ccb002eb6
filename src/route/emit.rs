use crate::errors::{ApiError, ApiResult};
use crate::util::extractor::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::debug;

/// How a handler turns the outcome of an operation into a response.
///
/// Handlers get an emitter from the application state instead of building responses themselves,
/// so the output format is decided in one place.
pub trait Emitter: Clone + Send + Sync + 'static {
    fn emit_success<T: Serialize>(&self, payload: T) -> Response;

    fn emit_failure(&self, error: ApiError) -> Response;

    fn emit<T: Serialize>(&self, result: ApiResult<T>) -> Response {
        match result {
            Ok(payload) => self.emit_success(payload),
            Err(error) => self.emit_failure(error),
        }
    }
}

/// Emits payloads as JSON bodies and failures as the `{code, error, message}` error document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter;

impl Emitter for JsonEmitter {
    fn emit_success<T: Serialize>(&self, payload: T) -> Response {
        Json(payload).into_response()
    }

    fn emit_failure(&self, error: ApiError) -> Response {
        debug!("request failed: {}", error);
        error.into_response()
    }
}
