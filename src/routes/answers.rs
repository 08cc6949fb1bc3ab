use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;

use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::extractors::JsonBody;
use crate::progress::engine::AnswerSubmission;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::mastery::{MasteryRecord, MasteryStatus};
use crate::store::operations::questions::Question;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/answers", post(submit_answer))
        .route("/mark-mastered", post(mark_mastered))
        .route("/wrong-questions", get(list_wrong_questions))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAnswerRequest {
    question_id: String,
    user_answer: String,
    pomodoro_session_id: Option<String>,
}

async fn submit_answer(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SubmitAnswerRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if req.question_id.trim().is_empty() || req.user_answer.trim().is_empty() {
        return Err(AppError::bad_request(
            "ANSWER_MISSING_FIELDS",
            "questionId and userAnswer are required",
        ));
    }

    let outcome = state
        .progress()
        .submit_answer(
            &auth.user_id,
            AnswerSubmission {
                question_id: req.question_id,
                raw_answer: req.user_answer,
                pomodoro_session_id: req.pomodoro_session_id,
            },
        )
        .await?;

    Ok(ok(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkMasteredRequest {
    question_id: String,
}

async fn mark_mastered(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<MarkMasteredRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if req.question_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "ANSWER_MISSING_FIELDS",
            "questionId is required",
        ));
    }

    let record = state
        .progress()
        .mark_mastered(&auth.user_id, &req.question_id)
        .await?;

    Ok(ok(record))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WrongQuestionEntry {
    record: MasteryRecord,
    question: Option<Question>,
}

/// 错题本：状态为待复习的记录，按最近作答时间倒序，联出题目内容。
async fn list_wrong_questions(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let records = state.store().list_mastery_by_status(
        &auth.user_id,
        MasteryStatus::NeedsReview,
        state.config().limits.max_wrong_questions,
    )?;

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let question = state.store().get_question(&record.question_id)?;
        if question.is_none() {
            tracing::warn!(question_id = %record.question_id, "Wrong-book entry references missing question");
        }
        entries.push(WrongQuestionEntry { record, question });
    }

    let count = entries.len();
    Ok(ok(serde_json::json!({
        "items": entries,
        "count": count,
    })))
}
