use axum::extract::State;
use axum::routing::get;
use axum::Router;

use chrono::Utc;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::mastery::MasteryStatus;

pub fn router() -> Router<AppState> {
    Router::new().route("/daily-stats", get(daily_stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DailyStats {
    today_questions: u64,
    today_correct: u64,
    today_accuracy: String,
    today_pomodoros: u64,
    wrong_questions: u64,
    streak_days: u32,
}

/// 当日（UTC 日历日）学习概况。
async fn daily_stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let today = Utc::now().date_naive();

    let attempts = state.store().count_attempts_on_day(&auth.user_id, today)?;
    let pomodoros = state
        .store()
        .count_focus_logs_on_day(&auth.user_id, today)?;
    let wrong = state
        .store()
        .count_mastery_by_status(&auth.user_id, MasteryStatus::NeedsReview)?;
    let streak_days = state
        .store()
        .get_profile(&auth.user_id)?
        .map(|p| p.day_streak)
        .unwrap_or(0);

    let accuracy = if attempts.total > 0 {
        format!(
            "{}%",
            (attempts.correct as f64 / attempts.total as f64 * 100.0).round() as u64
        )
    } else {
        "-".to_string()
    };

    Ok(ok(DailyStats {
        today_questions: attempts.total,
        today_correct: attempts.correct,
        today_accuracy: accuracy,
        today_pomodoros: pomodoros,
        wrong_questions: wrong,
        streak_days,
    }))
}
