use crate::auth::current_user;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use conclave_core::model::Evaluation;
use conclave_report::aggregate::{aggregate_scores, AggregatedReport};
use conclave_report::insights::{identify_strengths_weaknesses, rank_models, RankedModel, StrengthsWeaknesses};
use conclave_report::render::{build_report_data, render_html, render_markdown};
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

struct ReportParts {
    evaluation: Evaluation,
    report: AggregatedReport,
    rankings: Vec<RankedModel>,
    strengths: BTreeMap<String, StrengthsWeaknesses>,
}

/// Fetch rows and run the full aggregation pipeline for one evaluation.
/// The not-found check happens before any aggregation work.
fn assemble(state: &AppState, id: Uuid) -> Result<ReportParts, ApiError> {
    let evaluation = state
        .store
        .get_evaluation(id)?
        .ok_or_else(|| ApiError::not_found("Evaluation not found"))?;

    let responses = state.store.responses_for_evaluation(id)?;
    let scores = state.store.scores_for_evaluation(id)?;
    let report = aggregate_scores(&responses, &scores);
    let rankings = rank_models(&report);
    let strengths = identify_strengths_weaknesses(&report);

    Ok(ReportParts {
        evaluation,
        report,
        rankings,
        strengths,
    })
}

pub async fn get_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    current_user(&state, &headers)?;
    let parts = assemble(&state, id)?;
    let data = build_report_data(
        &parts.evaluation,
        &parts.report,
        &parts.rankings,
        &parts.strengths,
    )?;
    Ok(Json(data))
}

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "json".to_string()
}

pub async fn generate_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(params): Query<GenerateParams>,
) -> ApiResult<Response> {
    current_user(&state, &headers)?;
    let parts = assemble(&state, id)?;

    match params.format.as_str() {
        "json" => {
            let data = build_report_data(
                &parts.evaluation,
                &parts.report,
                &parts.rankings,
                &parts.strengths,
            )?;
            Ok(Json(data).into_response())
        }
        "markdown" => {
            let md = render_markdown(
                &parts.evaluation,
                &parts.report,
                &parts.rankings,
                &parts.strengths,
            );
            Ok(([("content-type", "text/plain; charset=utf-8")], md).into_response())
        }
        "html" => {
            let html = render_html(
                &parts.evaluation,
                &parts.report,
                &parts.rankings,
                &parts.strengths,
            );
            Ok(Html(html).into_response())
        }
        other => Err(ApiError::validation(format!(
            "Unsupported report format '{}'",
            other
        ))),
    }
}
