use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::bookmarks::Bookmark;
use crate::store::operations::questions::Question;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/bookmarks",
        post(create_bookmark)
            .delete(remove_bookmark)
            .get(list_bookmarks),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkRequest {
    question_id: String,
}

async fn create_bookmark(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<BookmarkRequest>,
) -> Result<axum::response::Response, AppError> {
    if req.question_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "BOOKMARK_MISSING_FIELDS",
            "questionId is required",
        ));
    }

    // 收藏前确认题目存在
    state
        .store()
        .get_question(&req.question_id)?
        .ok_or_else(|| AppError::not_found("Question not found"))?;

    let existing = state
        .store()
        .get_bookmark(&auth.user_id, &req.question_id)?;

    let bookmark = state.store().upsert_bookmark(&Bookmark {
        user_id: auth.user_id.clone(),
        question_id: req.question_id.clone(),
        created_at: Utc::now(),
    })?;

    if existing.is_some() {
        Ok(ok(bookmark).into_response())
    } else {
        Ok(created(bookmark).into_response())
    }
}

async fn remove_bookmark(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<BookmarkRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if req.question_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "BOOKMARK_MISSING_FIELDS",
            "questionId is required",
        ));
    }

    if !state
        .store()
        .delete_bookmark(&auth.user_id, &req.question_id)?
    {
        return Err(AppError::not_found("Bookmark not found"));
    }

    Ok(ok(serde_json::json!({"removed": true})))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkEntry {
    bookmark: Bookmark,
    question: Option<Question>,
}

async fn list_bookmarks(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let bookmarks = state
        .store()
        .list_bookmarks(&auth.user_id, state.config().limits.max_bookmarks)?;

    let mut entries = Vec::with_capacity(bookmarks.len());
    for bookmark in bookmarks {
        let question = state.store().get_question(&bookmark.question_id)?;
        entries.push(BookmarkEntry { bookmark, question });
    }

    let count = entries.len();
    Ok(ok(serde_json::json!({
        "items": entries,
        "count": count,
    })))
}
