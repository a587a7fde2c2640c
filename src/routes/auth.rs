use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use crate::session::{clear_session_cookie_header, session_cookie_header};
use crate::state::AppState;
use uuid::Uuid;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use argon2::password_hash::{SaltString, PasswordHash};
use tracing::{debug, error, info};

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn read_credentials(body: Result<Json<Credentials>, JsonRejection>) -> Result<Credentials, Response> {
    body.map(|Json(credentials)| credentials).map_err(|e| {
        debug!(error = %e, "unreadable credentials");
        reject(StatusCode::BAD_REQUEST, "invalid payload")
    })
}

/// Issues the bearer token and the session cookie for one login event.
fn issue_credentials(state: &AppState, user_id: Uuid) -> Result<(String, String), Response> {
    let tokens = state
        .tokens
        .issue_api_token(user_id)
        .and_then(|api| Ok((api, state.tokens.issue_session_token(user_id)?)));

    match tokens {
        Ok((api, session)) => Ok((
            api,
            session_cookie_header(&session, state.token_ttl_hours.saturating_mul(3600)),
        )),
        Err(e) => {
            error!(error = %e, "token issue failed");
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "token error"))
        }
    }
}

pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let payload = match read_credentials(body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let email = payload.email.trim().to_string();
    if email.is_empty() || payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return reject(StatusCode::BAD_REQUEST, "invalid payload");
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = match Argon2::default().hash_password(payload.password.as_bytes(), &salt) {
        Ok(h) => h.to_string(),
        Err(e) => {
            error!(error = %e, "password hash failed");
            return reject(StatusCode::INTERNAL_SERVER_ERROR, "could not create user");
        }
    };
    let user_id = Uuid::new_v4();

    let res = sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(&email)
    .bind(&password_hash)
    .execute(&state.db)
    .await;

    if let Err(e) = res {
        if let Some(db_error) = e.as_database_error() {
            if db_error.code() == Some(std::borrow::Cow::Borrowed("23505")) {
                return reject(StatusCode::CONFLICT, "email already registered");
            }
        }
        error!(error = %e, "user insert failed");
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "could not create user");
    }

    let (token, cookie) = match issue_credentials(&state, user_id) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    info!(user_id = %user_id, "user signed up");
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(SignupResponse { id: user_id, email, token }),
    )
        .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    let payload = match read_credentials(body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let row = sqlx::query_as::<_, (Uuid, String)>(
        r#"
        SELECT id, password_hash FROM users WHERE email = $1
        "#,
    )
    .bind(payload.email.trim())
    .fetch_optional(&state.db)
    .await;

    let (user_id, stored_hash) = match row {
        Ok(Some(r)) => r,
        Ok(None) => return reject(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        Err(e) => {
            error!(error = %e, "user lookup failed");
            return reject(StatusCode::INTERNAL_SERVER_ERROR, "db error");
        }
    };

    let parsed_hash = match PasswordHash::new(&stored_hash) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, user_id = %user_id, "stored password hash unreadable");
            return reject(StatusCode::INTERNAL_SERVER_ERROR, "db error");
        }
    };

    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return reject(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let (token, cookie) = match issue_credentials(&state, user_id) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    info!(user_id = %user_id, "user logged in");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { token }),
    )
        .into_response()
}

pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie_header())],
    )
}
