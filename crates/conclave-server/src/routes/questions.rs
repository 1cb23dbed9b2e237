use crate::auth::current_user;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use conclave_core::questions::Question;

pub async fn list_questions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Question>>> {
    current_user(&state, &headers)?;
    Ok(Json(state.questions.as_ref().clone()))
}

pub async fn perspectives(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    current_user(&state, &headers)?;
    Ok(Json(serde_json::json!({
        "perspectives": state.config.perspectives,
    })))
}

pub async fn dimensions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    current_user(&state, &headers)?;
    Ok(Json(serde_json::json!({
        "dimensions": state.config.dimensions,
    })))
}
