//! Admission control middleware.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::http::error::{reject, GateError};
use crate::http::server::AppState;

/// Reject over-limit clients before any expensive work runs.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // A disabled limiter must not touch the registry at all, or the
    // table grows without bound while limiting is off.
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let key = match client_key(&request, state.config.rate_limit.trust_forwarded_for) {
        Ok(key) => key,
        Err(err) => return reject(err, request.method(), request.uri()),
    };

    if state.registry.admit(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        reject(GateError::RateLimited, request.method(), request.uri())
    }
}

/// Derive the rate-limiting key for a request.
///
/// Fails closed: a request whose origin cannot be established is a
/// server error, never an unlimited pass.
fn client_key(request: &Request, trust_forwarded_for: bool) -> Result<String, GateError> {
    if trust_forwarded_for {
        if let Some(forwarded) = request.headers().get("x-forwarded-for") {
            let first = forwarded
                .to_str()
                .ok()
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|entry| !entry.is_empty());

            return match first {
                Some(entry) => Ok(entry.to_string()),
                None => Err(GateError::Internal("unusable x-forwarded-for header".into())),
            };
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .ok_or_else(|| GateError::Internal("client address unavailable".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_peer(peer: Option<SocketAddr>) -> Request {
        let mut request = Request::new(Body::empty());
        if let Some(addr) = peer {
            request.extensions_mut().insert(ConnectInfo(addr));
        }
        request
    }

    #[test]
    fn keys_on_peer_ip_by_default() {
        let addr: SocketAddr = "192.0.2.7:51724".parse().unwrap();
        let request = request_with_peer(Some(addr));

        assert_eq!(client_key(&request, false).unwrap(), "192.0.2.7");
    }

    #[test]
    fn missing_peer_address_fails_closed() {
        let request = request_with_peer(None);
        assert!(client_key(&request, false).is_err());
    }

    #[test]
    fn trusts_first_forwarded_entry_when_configured() {
        let addr: SocketAddr = "10.0.0.1:80".parse().unwrap();
        let mut request = request_with_peer(Some(addr));
        request
            .headers_mut()
            .insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());

        assert_eq!(client_key(&request, true).unwrap(), "203.0.113.9");
        // Untrusted mode keeps keying on the peer.
        assert_eq!(client_key(&request, false).unwrap(), "10.0.0.1");
    }

    #[test]
    fn empty_forwarded_header_fails_closed() {
        let addr: SocketAddr = "10.0.0.1:80".parse().unwrap();
        let mut request = request_with_peer(Some(addr));
        request
            .headers_mut()
            .insert("x-forwarded-for", "".parse().unwrap());

        assert!(client_key(&request, true).is_err());
    }
}
