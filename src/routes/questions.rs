use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;

use serde::Deserialize;

use crate::auth::AuthUser;
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::response::{ok, paginated, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions))
        .route("/:id", get(get_question))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuestionsQuery {
    year: Option<String>,
    page: Option<u64>,
    per_page: Option<u64>,
}

impl ListQuestionsQuery {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
    fn per_page(&self) -> u64 {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

async fn list_questions(
    _auth: AuthUser,
    Query(q): Query<ListQuestionsQuery>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let page = q.page();
    let per_page = q.per_page();
    let year = q.year.as_deref();

    let questions = state.store().list_questions(
        year,
        per_page as usize,
        ((page - 1) * per_page) as usize,
    )?;
    let total = state.store().count_questions(year)?;

    Ok(paginated(questions, total, page, per_page))
}

async fn get_question(
    _auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let question = state
        .store()
        .get_question(&id)?
        .ok_or_else(|| AppError::not_found("Question not found"))?;
    Ok(ok(question))
}
