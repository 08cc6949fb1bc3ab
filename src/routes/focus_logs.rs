use axum::extract::State;
use axum::routing::post;
use axum::Router;

use serde::Deserialize;

use crate::auth::AuthUser;
use crate::extractors::JsonBody;
use crate::progress::engine::FocusSubmission;
use crate::response::{created, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/focus-logs", post(create_focus_log))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FocusLogRequest {
    duration_secs: u32,
    questions_completed: Option<u64>,
    correct_count: Option<u64>,
    pomodoro_session_id: Option<String>,
}

/// 专注会话结束事件：一次性上报，服务端结算奖励经验。
async fn create_focus_log(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FocusLogRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if req.duration_secs == 0 {
        return Err(AppError::bad_request(
            "FOCUS_INVALID_DURATION",
            "durationSecs must be positive",
        ));
    }

    let outcome = state
        .progress()
        .log_focus_session(
            &auth.user_id,
            FocusSubmission {
                duration_secs: req.duration_secs,
                questions_completed: req.questions_completed,
                correct_count: req.correct_count,
                pomodoro_session_id: req.pomodoro_session_id,
            },
        )
        .await?;

    Ok(created(outcome))
}
