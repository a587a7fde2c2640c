//! Page-navigation gate backed by the session cookie.
//!
//! Independent of the bearer-token check on `/api`: pages look at the
//! cookie, data endpoints look at the `Authorization` header.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use jsonwebtoken::DecodingKey;
use tracing::debug;
use uuid::Uuid;

use crate::identity::{decode_subject, SESSION_AUDIENCE};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "taskboard_session";

const LOGIN_PATH: &str = "/login";
const SIGNUP_PATH: &str = "/signup";
const API_PREFIX: &str = "/api/";
const STATIC_PATHS: &[&str] = &["/_next", "/favicon.ico", "/images"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
}

#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn get_session(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Reads the session JWT out of the `Cookie` header.
pub struct CookieSessionResolver {
    decoding: DecodingKey,
}

impl CookieSessionResolver {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

#[async_trait]
impl SessionResolver for CookieSessionResolver {
    async fn get_session(&self, headers: &HeaderMap) -> Option<Session> {
        let token = session_cookie(headers)?;
        match decode_subject(token, &self.decoding, SESSION_AUDIENCE) {
            Ok(user_id) => Some(Session { user_id }),
            Err(e) => {
                debug!(error = %e, "session cookie rejected");
                None
            }
        }
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a freshly issued session token.
pub fn session_cookie_header(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value that drops the session.
pub fn clear_session_cookie_header() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.starts_with(&format!("{prefix}/"))
}

pub fn is_auth_page(path: &str) -> bool {
    path.starts_with(LOGIN_PATH) || path.starts_with(SIGNUP_PATH)
}

/// Static assets, anything that looks like a file, and the API namespace
/// are never gated.
pub fn bypasses_gate(path: &str) -> bool {
    STATIC_PATHS.iter().any(|p| matches_prefix(path, p))
        || path.starts_with(API_PREFIX)
        || path.contains('.')
}

/// Only needs to know whether a session exists, which lets the caller skip
/// resolving one for bypassed paths.
pub fn decide(path: &str, has_session: bool) -> GateDecision {
    if bypasses_gate(path) {
        return GateDecision::Continue;
    }

    match (has_session, is_auth_page(path)) {
        (false, false) => GateDecision::Redirect(format!(
            "{LOGIN_PATH}?redirectedFrom={}",
            urlencoding::encode(path)
        )),
        (true, true) => GateDecision::Redirect("/".to_string()),
        _ => GateDecision::Continue,
    }
}

pub async fn session_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    if bypasses_gate(&path) {
        return next.run(req).await;
    }

    let session = state.sessions.get_session(req.headers()).await;
    if let Some(session) = &session {
        debug!(user_id = %session.user_id, path = %path, "session resolved");
    }

    match decide(&path, session.is_some()) {
        GateDecision::Continue => next.run(req).await,
        GateDecision::Redirect(to) => {
            debug!(from = %path, to = %to, "session gate redirect");
            Redirect::temporary(&to).into_response()
        }
    }
}
