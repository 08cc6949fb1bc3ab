use axum::extract::State;
use axum::routing::get;
use axum::Router;

use chrono::NaiveDate;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::progress::level;
use crate::response::{ok, AppError};
use crate::routes::auth::UserProfile;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile))
        .route("/me/progress", get(get_progress))
}

async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let user = state
        .store()
        .get_user_by_id(&auth.user_id)?
        .ok_or_else(|| AppError::not_found("用户不存在"))?;
    Ok(ok(UserProfile::from(&user)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressSummary {
    xp: i64,
    level: u32,
    xp_for_next_level: i64,
    progress_percent: f64,
    day_streak: u32,
    current_streak: u32,
    last_activity_date: Option<NaiveDate>,
}

/// 成长概览。没答过题的用户返回零值档案，不落库。
async fn get_progress(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let profile = state.store().get_profile(&auth.user_id)?;

    let summary = match profile {
        Some(p) => ProgressSummary {
            xp: p.xp,
            level: p.level,
            xp_for_next_level: level::xp_for_next_level(p.level),
            progress_percent: level::progress_percent(p.xp, p.level),
            day_streak: p.day_streak,
            current_streak: p.current_streak,
            last_activity_date: p.last_activity_date,
        },
        None => ProgressSummary {
            xp: 0,
            level: 1,
            xp_for_next_level: level::xp_for_next_level(1),
            progress_percent: 0.0,
            day_streak: 0,
            current_streak: 0,
            last_activity_date: None,
        },
    };

    Ok(ok(summary))
}
