use crate::auth::current_user;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use conclave_core::engine::collector::run_evaluation_task;
use conclave_core::engine::import::import_responses as run_import;
use conclave_core::model::{Evaluation, EvaluationCreate, EvaluationStatus, ImportBatch};
use rand::seq::SliceRandom;
use uuid::Uuid;

const BLIND_LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn get_evaluation_or_404(state: &AppState, id: Uuid) -> Result<Evaluation, ApiError> {
    state
        .store
        .get_evaluation(id)?
        .ok_or_else(|| ApiError::not_found("Evaluation not found"))
}

pub async fn create_evaluation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<EvaluationCreate>,
) -> ApiResult<(StatusCode, Json<Evaluation>)> {
    let user = current_user(&state, &headers)?;

    if body.name.trim().is_empty() {
        return Err(ApiError::validation("Evaluation name must not be empty"));
    }
    if body.model_list.is_empty() {
        return Err(ApiError::validation("model_list must not be empty"));
    }

    let evaluation = state.store.create_evaluation(
        &body.name,
        &body.perspective,
        &body.scoring_dimensions,
        &body.model_list,
        &body.prompt_template,
        body.review_mode,
        user.id,
    )?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}

pub async fn list_all_evaluations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Evaluation>>> {
    current_user(&state, &headers)?;
    Ok(Json(state.store.list_evaluations()?))
}

pub async fn evaluation_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Evaluation>> {
    current_user(&state, &headers)?;
    Ok(Json(get_evaluation_or_404(&state, id)?))
}

pub async fn trigger_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    current_user(&state, &headers)?;
    let evaluation = get_evaluation_or_404(&state, id)?;

    if !matches!(
        evaluation.status,
        EvaluationStatus::Created | EvaluationStatus::Collecting
    ) {
        return Err(ApiError::conflict(format!(
            "Cannot run evaluation in '{}' status",
            evaluation.status.as_str()
        )));
    }

    // The compare-and-set is the guard against two concurrent triggers both
    // starting a sweep: the loser sees an ineligible status.
    if !state.store.try_begin_collection(id)? {
        return Err(ApiError::conflict(
            "Evaluation is not eligible for collection",
        ));
    }

    tokio::spawn(run_evaluation_task(
        state.store.clone(),
        state.config.clone(),
        state.questions.as_ref().clone(),
        id,
        evaluation.model_list.clone(),
        evaluation.prompt_template.clone(),
    ));

    Ok(Json(serde_json::json!({
        "message": "Evaluation run started",
        "evaluation_id": id,
    })))
}

pub async fn import_eval_responses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<ImportBatch>,
) -> ApiResult<Json<serde_json::Value>> {
    current_user(&state, &headers)?;
    let evaluation = get_evaluation_or_404(&state, id)?;

    let created = run_import(&state.store, id, &body, &state.questions)?;

    if evaluation.status == EvaluationStatus::Created {
        state
            .store
            .set_evaluation_status(id, EvaluationStatus::Reviewing)?;
    }

    Ok(Json(serde_json::json!({
        "message": format!("Imported {} responses", created.len()),
        "count": created.len(),
    })))
}

pub async fn list_responses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<conclave_core::model::ResponseRecord>>> {
    current_user(&state, &headers)?;
    get_evaluation_or_404(&state, id)?;
    Ok(Json(state.store.responses_for_evaluation(id)?))
}

/// Next unscored question's response set for the caller. In blind mode the
/// order is shuffled per request and model identity is replaced with
/// positional labels.
pub async fn next_unscored(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers)?;
    let evaluation = get_evaluation_or_404(&state, id)?;

    let unscored = state.store.unscored_responses(id, user.id)?;
    if unscored.is_empty() {
        return Ok(Json(serde_json::json!({
            "complete": true,
            "message": "All responses have been scored",
        })));
    }

    let question_id = unscored[0].question_id.clone();
    let mut question_responses: Vec<_> = unscored
        .into_iter()
        .filter(|r| r.question_id == question_id)
        .collect();

    let is_blind = evaluation.review_mode == conclave_core::model::ReviewMode::Blind;
    if is_blind {
        question_responses.shuffle(&mut rand::thread_rng());
    }

    let items: Vec<serde_json::Value> = question_responses
        .iter()
        .enumerate()
        .map(|(i, resp)| {
            let label = if is_blind {
                format!("Response {}", BLIND_LABELS[i % BLIND_LABELS.len()] as char)
            } else {
                resp.model_name.clone()
            };
            let mut item = serde_json::json!({
                "response_id": resp.id,
                "label": label,
                "response_text": resp.response_text,
                "question_id": resp.question_id,
            });
            if !is_blind {
                item["model_name"] = serde_json::json!(resp.model_name);
            }
            item
        })
        .collect();

    let question_text = state
        .store
        .get_question(&question_id)?
        .map(|q| q.text)
        .unwrap_or_default();

    Ok(Json(serde_json::json!({
        "complete": false,
        "question": { "id": question_id, "text": question_text },
        "responses": items,
        "review_mode": evaluation.review_mode.as_str(),
    })))
}

pub async fn review_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = current_user(&state, &headers)?;
    get_evaluation_or_404(&state, id)?;

    let stats = state.store.progress(id, user.id)?;
    let percent = if stats.total_responses > 0 {
        (stats.scored_by_user as f64 / stats.total_responses as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    Ok(Json(serde_json::json!({
        "evaluation_id": id,
        "total_responses": stats.total_responses,
        "scored_by_you": stats.scored_by_user,
        "remaining_for_you": stats.total_responses - stats.scored_by_user,
        "percent_complete": percent,
        "total_reviewers": stats.total_reviewers,
        "model_count": stats.model_count,
        "question_count": stats.question_count,
    })))
}
