//! Authentication and authorization middleware.

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::timeout;

use crate::http::error::{reject, GateError};
use crate::http::server::AppState;
use crate::identity::principal::Principal;
use crate::identity::token::{self, TokenScope};
use crate::observability::metrics;

/// Resolve the request's bearer credential into a [`Principal`].
///
/// Requests without an `Authorization` header proceed anonymously; a
/// header that is present but unusable is rejected here. Every outcome,
/// success or rejection, marks the response `Vary: Authorization` so
/// caches key on the credential.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let raw = match request.headers().get(header::AUTHORIZATION) {
        None => {
            metrics::record_auth_outcome("anonymous");
            request.extensions_mut().insert(Principal::Anonymous);
            return vary_on_authorization(next.run(request).await);
        }
        Some(value) => match value.to_str() {
            Ok(raw) => raw.to_string(),
            Err(_) => {
                return vary_on_authorization(reject(GateError::MalformedHeader, &method, &uri))
            }
        },
    };

    let plaintext = match token::parse_bearer(&raw) {
        Some(plaintext) => plaintext,
        None => return vary_on_authorization(reject(GateError::MalformedHeader, &method, &uri)),
    };

    if !token::is_well_formed(plaintext) {
        return vary_on_authorization(reject(GateError::MalformedToken, &method, &uri));
    }

    let lookup = timeout(
        state.config.timeouts.external_call(),
        state.tokens.resolve(TokenScope::Authentication, plaintext),
    )
    .await;

    let user = match lookup {
        Err(_) => {
            let err = GateError::Dependency("token lookup timed out".into());
            return vary_on_authorization(reject(err, &method, &uri));
        }
        Ok(Err(err)) => {
            let err = GateError::Dependency(format!("token lookup: {err}"));
            return vary_on_authorization(reject(err, &method, &uri));
        }
        Ok(Ok(None)) => {
            return vary_on_authorization(reject(GateError::InvalidOrExpiredToken, &method, &uri))
        }
        Ok(Ok(Some(user))) => user,
    };

    metrics::record_auth_outcome("authenticated");
    request.extensions_mut().insert(Principal::Authenticated(user));
    vary_on_authorization(next.run(request).await)
}

/// Gate a route on a single capability.
///
/// Applied per protected route:
/// `route_layer(middleware::from_fn_with_state((state, "movies:read"), require_permission))`.
/// Runs after [`authenticate`], which it relies on for the principal.
pub async fn require_permission(
    State((state, permission)): State<(AppState, &'static str)>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let principal = match request.extensions().get::<Principal>() {
        Some(principal) => principal.clone(),
        None => {
            let err = GateError::Internal("no principal in request context".into());
            return reject(err, &method, &uri);
        }
    };

    let user = match principal.user() {
        None => return reject(GateError::AuthenticationRequired, &method, &uri),
        Some(user) => user,
    };

    if !user.activated {
        return reject(GateError::NotActivated, &method, &uri);
    }

    // Fetched per request so a revoked grant takes effect immediately.
    let lookup = timeout(
        state.config.timeouts.external_call(),
        state.permissions.all_for(user.id),
    )
    .await;

    let permissions = match lookup {
        Err(_) => {
            let err = GateError::Dependency("permission lookup timed out".into());
            return reject(err, &method, &uri);
        }
        Ok(Err(err)) => {
            let err = GateError::Dependency(format!("permission lookup: {err}"));
            return reject(err, &method, &uri);
        }
        Ok(Ok(permissions)) => permissions,
    };

    if !permissions.contains(permission) {
        return reject(GateError::MissingPermission, &method, &uri);
    }

    next.run(request).await
}

fn vary_on_authorization(mut response: Response) -> Response {
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}
