use crate::config::{AppConfig, ModelConfig, PromptTemplate};
use crate::model::{EvaluationStatus, NewResponse, ResponseSource};
use crate::providers::llm::{build_client, LlmClient};
use crate::questions::Question;
use crate::storage::Store;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

pub fn render_prompt(template: &PromptTemplate, question_text: &str) -> String {
    template.template.replace("{question}", question_text)
}

/// Call one model once per retry budget. Backoff grows linearly with the
/// attempt number; after the budget is exhausted the last error propagates
/// so the sweep can skip this (model, question) pair.
pub async fn call_model(
    client: &dyn LlmClient,
    model: &ModelConfig,
    prompt: &str,
) -> anyhow::Result<(String, serde_json::Value)> {
    let mut last_error: Option<anyhow::Error> = None;

    for attempt in 1..=MAX_RETRIES {
        let start = Instant::now();
        match client.complete(prompt).await {
            Ok(reply) => {
                let latency = start.elapsed();
                let mut meta = serde_json::json!({
                    "model": reply.model,
                    "provider": reply.provider,
                    "latency_seconds": (latency.as_secs_f64() * 1000.0).round() / 1000.0,
                });
                if let (Some(obj), Some(extra)) = (meta.as_object_mut(), reply.meta.as_object()) {
                    for (k, v) in extra {
                        obj.insert(k.clone(), v.clone());
                    }
                }
                tracing::info!(
                    model = %model.name,
                    latency_ms = latency.as_millis() as u64,
                    "model responded"
                );
                return Ok((reply.text, meta));
            }
            Err(e) => {
                tracing::warn!(
                    model = %model.name,
                    attempt,
                    max = MAX_RETRIES,
                    error = %e,
                    "model call failed"
                );
                last_error = Some(e);
                if attempt < MAX_RETRIES {
                    sleep(RETRY_DELAY * attempt).await;
                }
            }
        }
    }

    Err(anyhow::anyhow!(
        "model {} failed after {} attempts: {}",
        model.name,
        MAX_RETRIES,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Sweep every question across every model sequentially, collecting answers.
/// Exhausted pairs are skipped, not fatal. All collected responses commit in
/// a single transaction at the end of the sweep.
pub async fn run_collection(
    store: &Store,
    evaluation_id: Uuid,
    models: &[(ModelConfig, Arc<dyn LlmClient>)],
    questions: &[Question],
    template: &PromptTemplate,
) -> anyhow::Result<usize> {
    let total = questions.len() * models.len();
    let mut completed = 0usize;
    let mut collected: Vec<NewResponse> = Vec::new();

    for question in questions {
        let prompt = render_prompt(template, &question.text);
        for (model_cfg, client) in models {
            completed += 1;
            tracing::info!(
                completed,
                total,
                model = %model_cfg.name,
                question = %question.id,
                "collecting"
            );

            match call_model(client.as_ref(), model_cfg, &prompt).await {
                Ok((text, meta)) => {
                    collected.push(NewResponse {
                        evaluation_id,
                        question_id: question.id.clone(),
                        model_name: model_cfg.name.clone(),
                        response_text: text,
                        source: ResponseSource::Api,
                        metadata: meta,
                    });
                }
                Err(e) => {
                    tracing::error!(
                        model = %model_cfg.name,
                        question = %question.id,
                        error = %e,
                        "skipping pair after all retries failed"
                    );
                }
            }
        }
    }

    let created = store.insert_responses(&collected)?;
    tracing::info!(
        evaluation_id = %evaluation_id,
        collected = created.len(),
        total,
        "collection sweep complete"
    );
    Ok(created.len())
}

/// Background task driving one evaluation through its collection lifecycle:
/// sync questions, `running`, sweep, then `reviewing` on success or back to
/// `created` on failure.
pub async fn run_evaluation_task(
    store: Store,
    config: Arc<AppConfig>,
    questions: Vec<Question>,
    evaluation_id: Uuid,
    model_names: Vec<String>,
    template_id: String,
) {
    if let Err(e) = run_evaluation_inner(
        &store,
        &config,
        &questions,
        evaluation_id,
        &model_names,
        &template_id,
    )
    .await
    {
        tracing::error!(evaluation_id = %evaluation_id, error = %e, "evaluation run failed");
        if let Err(e) = store.set_evaluation_status(evaluation_id, EvaluationStatus::Created) {
            tracing::error!(evaluation_id = %evaluation_id, error = %e, "failed to reset status");
        }
    }
}

async fn run_evaluation_inner(
    store: &Store,
    config: &AppConfig,
    questions: &[Question],
    evaluation_id: Uuid,
    model_names: &[String],
    template_id: &str,
) -> anyhow::Result<()> {
    let model_configs: Vec<ModelConfig> = config
        .models
        .iter()
        .filter(|m| model_names.contains(&m.name))
        .cloned()
        .collect();
    anyhow::ensure!(
        !model_configs.is_empty(),
        "no matching model configs for {:?}",
        model_names
    );

    let template = config
        .template(template_id)
        .ok_or_else(|| anyhow::anyhow!("prompt template '{}' not found", template_id))?
        .clone();

    let mut models: Vec<(ModelConfig, Arc<dyn LlmClient>)> = Vec::new();
    for cfg in model_configs {
        let client = build_client(&cfg)?;
        models.push((cfg, client));
    }

    store.sync_questions(questions)?;
    store.set_evaluation_status(evaluation_id, EvaluationStatus::Running)?;

    run_collection(store, evaluation_id, &models, questions, &template).await?;

    store.set_evaluation_status(evaluation_id, EvaluationStatus::Reviewing)?;
    Ok(())
}
