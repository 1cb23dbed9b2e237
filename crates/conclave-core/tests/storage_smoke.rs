use conclave_core::model::{EvaluationStatus, NewResponse, NewScore, ResponseSource, ReviewMode};
use conclave_core::questions::{Question, QuestionType};
use conclave_core::storage::Store;
use tempfile::tempdir;

fn question(id: &str) -> Question {
    Question {
        id: id.into(),
        text: format!("text for {}", id),
        question_type: QuestionType::Theological,
        difficulty: "intermediate".into(),
        scripture_references: vec!["John 1:1".into()],
        tags: vec!["smoke".into()],
    }
}

#[test]
fn test_storage_smoke_lifecycle() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("conclave.db");

    // 1. Open store (init schema)
    let store = Store::open(&db_path)?;
    store.init_schema()?;
    store.ping()?;

    // 2. User + evaluation
    let reviewer = store.insert_user("sub-r1", "r1@example.com", Some("R One"), "reviewer")?;
    let evaluation = store.create_evaluation(
        "smoke run",
        "multi_perspective",
        &["accuracy".into(), "clarity".into()],
        &["m1".into(), "m2".into()],
        "default",
        ReviewMode::Blind,
        reviewer.id,
    )?;
    assert_eq!(evaluation.status, EvaluationStatus::Created);

    let fetched = store.get_evaluation(evaluation.id)?.unwrap();
    assert_eq!(fetched.model_list, vec!["m1".to_string(), "m2".to_string()]);

    // 3. Run trigger guard: allowed from created, then again from collecting,
    //    blocked once reviewing.
    assert!(store.try_begin_collection(evaluation.id)?);
    assert!(store.try_begin_collection(evaluation.id)?);
    store.set_evaluation_status(evaluation.id, EvaluationStatus::Reviewing)?;
    assert!(!store.try_begin_collection(evaluation.id)?);
    let status = store.get_evaluation(evaluation.id)?.unwrap().status;
    assert_eq!(status, EvaluationStatus::Reviewing);

    // 4. Questions sync is idempotent
    store.sync_questions(&[question("Q1"), question("Q2")])?;
    store.sync_questions(&[question("Q1")])?;
    assert!(store.get_question("Q1")?.is_some());
    assert!(store.get_question("Q3")?.is_none());

    // 5. One response per (question, model), single-transaction batch
    let mut batch = Vec::new();
    for q in ["Q1", "Q2"] {
        for m in ["m1", "m2"] {
            batch.push(NewResponse {
                evaluation_id: evaluation.id,
                question_id: q.into(),
                model_name: m.into(),
                response_text: format!("{} answers {}", m, q),
                source: ResponseSource::Api,
                metadata: serde_json::json!({"latency_seconds": 0.5}),
            });
        }
    }
    let responses = store.insert_responses(&batch)?;
    assert_eq!(responses.len(), 4);

    let listed = store.responses_for_evaluation(evaluation.id)?;
    assert_eq!(listed.len(), 4);
    // Ordered by question then model.
    assert_eq!(listed[0].question_id, "Q1");
    assert_eq!(listed[0].model_name, "m1");

    // 6. Scores, unscored set, progress
    let target = &listed[0];
    store.insert_scores(&[NewScore {
        response_id: target.id,
        user_id: reviewer.id,
        dimension: "accuracy".into(),
        value: 4,
        comment: String::new(),
    }])?;

    let unscored = store.unscored_responses(evaluation.id, reviewer.id)?;
    assert_eq!(unscored.len(), 3);
    assert!(unscored.iter().all(|r| r.id != target.id));

    let progress = store.progress(evaluation.id, reviewer.id)?;
    assert_eq!(progress.total_responses, 4);
    assert_eq!(progress.scored_by_user, 1);
    assert_eq!(progress.total_reviewers, 1);
    assert_eq!(progress.model_count, 2);
    assert_eq!(progress.question_count, 2);

    let scores = store.scores_for_evaluation(evaluation.id)?;
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].value, 4);

    // 7. Explicit cascade delete
    store.delete_evaluation(evaluation.id)?;
    assert!(store.get_evaluation(evaluation.id)?.is_none());
    assert!(store.responses_for_evaluation(evaluation.id)?.is_empty());
    assert!(store.scores_for_evaluation(evaluation.id)?.is_empty());

    Ok(())
}

#[test]
fn test_list_evaluations_newest_first() -> anyhow::Result<()> {
    let store = Store::memory()?;
    store.init_schema()?;
    let user = store.insert_user("sub", "u@example.com", None, "reviewer")?;

    for name in ["first", "second"] {
        store.create_evaluation(
            name,
            "multi_perspective",
            &[],
            &["m1".into()],
            "default",
            ReviewMode::Labeled,
            user.id,
        )?;
        // created_at has second resolution in RFC3339; a tiny sleep keeps
        // ordering observable.
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let listed = store.list_evaluations()?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "second");
    Ok(())
}
