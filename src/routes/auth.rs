use axum::extract::State;
use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;

use crate::extractors::JsonBody;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{
    extract_token_from_headers, hash_password, hash_token, sign_jwt_for_user, verify_password,
};
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::sessions::Session;
use crate::store::operations::users::User;
use crate::validation::{is_valid_email, validate_password, validate_username};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
}

impl From<&User> for UserProfile {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.clone(),
            email: value.email.clone(),
            username: value.username.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserProfile,
}

/// Sign a JWT and persist the matching server-side session record.
fn issue_token(user_id: &str, state: &AppState) -> Result<String, AppError> {
    let access_token = sign_jwt_for_user(
        user_id,
        &state.config().jwt_secret,
        state.config().jwt_expires_in_hours,
    )?;

    let token_hash = hash_token(&access_token);
    state.store().create_session(&Session {
        token_hash,
        user_id: user_id.to_string(),
        token_type: "user".to_string(),
        created_at: Utc::now(),
        expires_at: Utc::now() + Duration::hours(state.config().jwt_expires_in_hours as i64),
        revoked: false,
    })?;

    Ok(access_token)
}

fn set_token_cookie(response: &mut Response, token: &str, max_age_hours: u64) {
    let cookie = format!(
        "token={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        max_age_hours * 3600
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
}

fn clear_token_cookie(response: &mut Response) {
    if let Ok(value) = HeaderValue::from_str("token=; Path=/; HttpOnly; Max-Age=0") {
        response.headers_mut().append(SET_COOKIE, value);
    }
}

async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Response, AppError> {
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::bad_request(
            "AUTH_INVALID_EMAIL",
            "Invalid email format",
        ));
    }
    let username = req.username.trim();
    if let Err(msg) = validate_username(username) {
        return Err(AppError::bad_request("AUTH_INVALID_USERNAME", msg));
    }
    if let Err(msg) = validate_password(&req.password) {
        return Err(AppError::bad_request("AUTH_WEAK_PASSWORD", msg));
    }

    if state.store().get_user_by_email(&email)?.is_some() {
        return Err(AppError::conflict(
            "AUTH_EMAIL_EXISTS",
            "Email already registered",
        ));
    }

    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.clone(),
        username: username.to_string(),
        password_hash: hash_password(&req.password)?,
        is_banned: false,
        created_at: now,
        updated_at: now,
    };

    state.store().create_user(&user)?;

    let access_token = issue_token(&user.id, &state)?;

    let payload = AuthResponse {
        access_token: access_token.clone(),
        user: UserProfile::from(&user),
    };

    let mut response = created(payload).into_response();
    set_token_cookie(
        &mut response,
        &access_token,
        state.config().jwt_expires_in_hours,
    );
    Ok(response)
}

async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Response, AppError> {
    let user = state
        .store()
        .get_user_by_email(&req.email)?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    if user.is_banned {
        return Err(AppError::forbidden("User is banned"));
    }

    let verified = verify_password(&req.password, &user.password_hash)?;
    if !verified {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let access_token = issue_token(&user.id, &state)?;

    let payload = AuthResponse {
        access_token: access_token.clone(),
        user: UserProfile::from(&user),
    };

    let mut response = ok(payload).into_response();
    set_token_cookie(
        &mut response,
        &access_token,
        state.config().jwt_expires_in_hours,
    );
    Ok(response)
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Ok(token) = extract_token_from_headers(&headers) {
        let token_hash = hash_token(&token);
        if let Err(e) = state.store().delete_session(&token_hash) {
            tracing::warn!(error = %e, "Failed to delete session on logout");
        }
    }

    let mut response = ok(serde_json::json!({"loggedOut": true})).into_response();
    clear_token_cookie(&mut response);
    Ok(response)
}
