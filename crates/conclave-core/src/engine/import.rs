use crate::errors::ServiceError;
use crate::model::{ImportBatch, NewResponse, ResponseRecord, ResponseSource};
use crate::questions::Question;
use crate::storage::Store;
use uuid::Uuid;

/// Import pre-collected responses into an evaluation. Every question id is
/// validated against the loaded bank first; an unknown id rejects the whole
/// batch before any row is persisted.
pub fn import_responses(
    store: &Store,
    evaluation_id: Uuid,
    batch: &ImportBatch,
    bank: &[Question],
) -> anyhow::Result<Vec<ResponseRecord>> {
    let mut referenced: Vec<&Question> = Vec::new();
    for item in &batch.responses {
        match bank.iter().find(|q| q.id == item.question_id) {
            Some(q) => {
                if !referenced.iter().any(|r| r.id == q.id) {
                    referenced.push(q);
                }
            }
            None => {
                return Err(ServiceError::validation(format!(
                    "Unknown question_id: {}",
                    item.question_id
                ))
                .into());
            }
        }
    }

    let to_sync: Vec<Question> = referenced.into_iter().cloned().collect();
    store.sync_questions(&to_sync)?;

    let rows: Vec<NewResponse> = batch
        .responses
        .iter()
        .map(|item| NewResponse {
            evaluation_id,
            question_id: item.question_id.clone(),
            model_name: item.model_name.clone(),
            response_text: item.response_text.clone(),
            source: ResponseSource::Import,
            metadata: item.metadata.clone(),
        })
        .collect();

    let created = store.insert_responses(&rows)?;
    tracing::info!(
        evaluation_id = %evaluation_id,
        imported = created.len(),
        "imported responses"
    );
    Ok(created)
}
