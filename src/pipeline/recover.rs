//! Panic containment middleware.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::extract::Request;
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use futures_util::FutureExt;

use crate::http::error::{reject, GateError};

/// Outermost stage: a panic anywhere downstream becomes one well-formed
/// 500 response instead of a dropped connection.
///
/// The connection is marked `close` so the peer does not reuse it after
/// the handler aborted in an unknown state.
pub async fn recover_panic(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let cause = panic_message(panic.as_ref());
            let mut response =
                reject(GateError::Internal(format!("panic: {cause}")), &method, &uri);
            response
                .headers_mut()
                .insert(header::CONNECTION, HeaderValue::from_static("close"));
            response
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
