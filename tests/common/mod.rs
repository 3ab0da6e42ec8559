//! Shared fixtures for gate integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request};

use request_gate::config::GateConfig;
use request_gate::identity::principal::User;
use request_gate::identity::store::InMemoryStore;
use request_gate::identity::token::TokenScope;

// 26-character tokens in the external encoding.
pub const ACTIVE_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const INACTIVE_TOKEN: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBB";
pub const READER_TOKEN: &str = "CCCCCCCCCCCCCCCCCCCCCCCCCC";
pub const UNKNOWN_TOKEN: &str = "DDDDDDDDDDDDDDDDDDDDDDDDDD";

/// Store with an activated user holding both movie grants, an
/// unactivated user, and an activated user with read access only.
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    let expiry = SystemTime::now() + Duration::from_secs(3600);

    store.insert_token(TokenScope::Authentication, ACTIVE_TOKEN, user(1, "alice", true), expiry);
    store.insert_token(TokenScope::Authentication, INACTIVE_TOKEN, user(2, "bob", false), expiry);
    store.insert_token(TokenScope::Authentication, READER_TOKEN, user(3, "carol", true), expiry);

    store.grant(1, "movies:read");
    store.grant(1, "movies:write");
    store.grant(3, "movies:read");

    store
}

pub fn user(id: i64, name: &str, activated: bool) -> User {
    User {
        id,
        name: name.to_string(),
        activated,
    }
}

/// Config tuned for tests: the limiter stays off unless a test turns it
/// back on.
pub fn test_config() -> GateConfig {
    let mut config = GateConfig::default();
    config.rate_limit.enabled = false;
    config
}

/// Build a request carrying the peer address the connect-info extractor
/// would have provided on a real socket.
pub fn request(method: Method, uri: &str, bearer: Option<&str>) -> Request<Body> {
    request_from(SocketAddr::from(([127, 0, 0, 1], 49152)), method, uri, bearer)
}

pub fn request_from(
    peer: SocketAddr,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let mut request = builder.body(Body::empty()).unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
