use crate::auth::current_user;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use conclave_core::model::{NewScore, ReviewSubmission, ScoreRecord};

pub const LOW_SCORE_COMMENT_THRESHOLD: i64 = 3;

pub async fn submit_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ReviewSubmission>,
) -> ApiResult<(StatusCode, Json<Vec<ScoreRecord>>)> {
    let user = current_user(&state, &headers)?;

    state
        .store
        .get_response(body.response_id)?
        .ok_or_else(|| ApiError::not_found("Response not found"))?;

    let mut batch = Vec::with_capacity(body.scores.len());
    for score in &body.scores {
        if !(1..=5).contains(&score.value) {
            return Err(ApiError::validation(format!(
                "Score value must be between 1 and 5 (dimension: {})",
                score.dimension
            )));
        }
        if score.value <= LOW_SCORE_COMMENT_THRESHOLD && score.comment.trim().is_empty() {
            return Err(ApiError::validation(format!(
                "Comment required for scores <= {} (dimension: {})",
                LOW_SCORE_COMMENT_THRESHOLD, score.dimension
            )));
        }
        batch.push(NewScore {
            response_id: body.response_id,
            user_id: user.id,
            dimension: score.dimension.clone(),
            value: score.value,
            comment: score.comment.clone(),
        });
    }

    let created = state.store.insert_scores(&batch)?;
    Ok((StatusCode::CREATED, Json(created)))
}
