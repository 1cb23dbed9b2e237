use conclave_core::model::{ResponseRecord, ResponseSource, ScoreRecord};
use conclave_report::aggregate::{aggregate_scores, round2};
use conclave_report::insights::{identify_strengths_weaknesses, rank_models};
use uuid::Uuid;

fn response(evaluation_id: Uuid, question_id: &str, model: &str) -> ResponseRecord {
    ResponseRecord {
        id: Uuid::new_v4(),
        evaluation_id,
        question_id: question_id.into(),
        model_name: model.into(),
        response_text: format!("{} on {}", model, question_id),
        source: ResponseSource::Api,
        metadata: serde_json::Value::Null,
        created_at: "2026-01-01T00:00:00Z".into(),
    }
}

fn score(response_id: Uuid, user_id: Uuid, dimension: &str, value: i64) -> ScoreRecord {
    ScoreRecord {
        id: Uuid::new_v4(),
        response_id,
        user_id,
        dimension: dimension.into(),
        value,
        comment: String::new(),
        scored_at: "2026-01-01T00:00:00Z".into(),
    }
}

#[test]
fn computes_averages_and_head_to_head() {
    // Two models, two reviewers, one dimension: the worked example.
    let eval_id = Uuid::new_v4();
    let r1 = response(eval_id, "Q1", "m1");
    let r2 = response(eval_id, "Q1", "m2");
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());

    let scores = vec![
        score(r1.id, u1, "accuracy", 5),
        score(r1.id, u2, "accuracy", 3),
        score(r2.id, u1, "accuracy", 4),
        score(r2.id, u2, "accuracy", 2),
    ];

    let report = aggregate_scores(&[r1, r2], &scores);

    assert_eq!(report.total_responses, 2);
    assert_eq!(report.total_scores, 4);
    assert_eq!(report.reviewer_count, 2);
    assert_eq!(report.model_averages["m1"]["accuracy"], 4.0);
    assert_eq!(report.model_averages["m2"]["accuracy"], 3.0);
    assert_eq!(report.model_overall["m1"], 4.0);
    assert_eq!(report.head_to_head["m1"]["m2"]["accuracy"], 1.0);
    // Only one direction stored.
    assert!(report.head_to_head["m2"].is_empty());
    assert_eq!(report.dimension_averages["accuracy"]["m1"], 4.0);
}

#[test]
fn overall_is_flattened_mean_not_mean_of_means() {
    // m1: accuracy [5, 5, 5], clarity [1]. Mean of per-dimension means would
    // be 3.0; the flattened mean is 4.0.
    let eval_id = Uuid::new_v4();
    let r1 = response(eval_id, "Q1", "m1");
    let u = Uuid::new_v4();

    let scores = vec![
        score(r1.id, u, "accuracy", 5),
        score(r1.id, u, "accuracy", 5),
        score(r1.id, u, "accuracy", 5),
        score(r1.id, u, "clarity", 1),
    ];

    let report = aggregate_scores(&[r1], &scores);
    assert_eq!(report.model_overall["m1"], 4.0);
    assert_eq!(report.model_averages["m1"]["accuracy"], 5.0);
    assert_eq!(report.model_averages["m1"]["clarity"], 1.0);
}

#[test]
fn zero_responses_yields_empty_report() {
    let report = aggregate_scores(&[], &[]);
    assert_eq!(report.total_responses, 0);
    assert_eq!(report.total_scores, 0);
    assert_eq!(report.reviewer_count, 0);
    assert!(report.model_averages.is_empty());
    assert!(report.model_overall.is_empty());
    assert!(report.dimension_averages.is_empty());
    assert!(report.head_to_head.is_empty());
    assert!(report.question_scores.is_empty());
}

#[test]
fn responses_without_scores_yield_counts_only() {
    let eval_id = Uuid::new_v4();
    let responses = vec![response(eval_id, "Q1", "m1"), response(eval_id, "Q1", "m2")];
    let report = aggregate_scores(&responses, &[]);
    assert_eq!(report.total_responses, 2);
    assert_eq!(report.total_scores, 0);
    assert!(report.model_averages.is_empty());
}

#[test]
fn head_to_head_delta_matches_raw_means_and_is_antisymmetric_in_value() {
    let eval_id = Uuid::new_v4();
    let r1 = response(eval_id, "Q1", "m1");
    let r2 = response(eval_id, "Q1", "m2");
    let u = Uuid::new_v4();

    // Means chosen so the delta needs rounding: 10/3 - 2 = 1.333...
    let scores = vec![
        score(r1.id, u, "depth", 3),
        score(r1.id, u, "depth", 3),
        score(r1.id, u, "depth", 4),
        score(r2.id, u, "depth", 2),
    ];

    let report = aggregate_scores(&[r1, r2], &scores);
    let expected = round2(10.0 / 3.0 - 2.0);
    assert_eq!(report.head_to_head["m1"]["m2"]["depth"], expected);
    assert_eq!(expected, 1.33);
}

#[test]
fn head_to_head_omits_dimension_missing_on_either_side() {
    let eval_id = Uuid::new_v4();
    let r1 = response(eval_id, "Q1", "m1");
    let r2 = response(eval_id, "Q1", "m2");
    let u = Uuid::new_v4();

    let scores = vec![
        score(r1.id, u, "accuracy", 5),
        score(r1.id, u, "clarity", 4),
        score(r2.id, u, "accuracy", 3),
    ];

    let report = aggregate_scores(&[r1, r2], &scores);
    let comparison = &report.head_to_head["m1"]["m2"];
    assert!(comparison.contains_key("accuracy"));
    assert!(!comparison.contains_key("clarity"));
}

#[test]
fn question_scores_are_scoped_per_question() {
    let eval_id = Uuid::new_v4();
    let r1 = response(eval_id, "Q1", "m1");
    let r2 = response(eval_id, "Q2", "m1");
    let u = Uuid::new_v4();

    let scores = vec![
        score(r1.id, u, "accuracy", 5),
        score(r2.id, u, "accuracy", 1),
    ];

    let report = aggregate_scores(&[r1, r2], &scores);
    assert_eq!(report.question_scores["Q1"]["m1"]["accuracy"], 5.0);
    assert_eq!(report.question_scores["Q2"]["m1"]["accuracy"], 1.0);
    // Evaluation-wide mean still flattens both.
    assert_eq!(report.model_overall["m1"], 3.0);
}

#[test]
fn ranks_are_dense_and_descending() {
    let eval_id = Uuid::new_v4();
    let r1 = response(eval_id, "Q1", "m1");
    let r2 = response(eval_id, "Q1", "m2");
    let r3 = response(eval_id, "Q1", "m3");
    let u = Uuid::new_v4();

    let scores = vec![
        score(r1.id, u, "accuracy", 3),
        score(r2.id, u, "accuracy", 5),
        score(r3.id, u, "accuracy", 1),
    ];

    let report = aggregate_scores(&[r1, r2, r3], &scores);
    let rankings = rank_models(&report);

    assert_eq!(rankings.len(), 3);
    assert_eq!(rankings[0].rank, 1);
    assert_eq!(rankings[0].model, "m2");
    assert_eq!(rankings[0].overall_score, 5.0);
    assert_eq!(rankings[2].model, "m3");
    assert!(rankings.windows(2).all(|w| w[0].overall_score >= w[1].overall_score));
    assert!(rankings
        .iter()
        .enumerate()
        .all(|(i, r)| r.rank == i as u32 + 1));
}

#[test]
fn equal_overall_scores_break_ties_by_model_name() {
    let eval_id = Uuid::new_v4();
    let rb = response(eval_id, "Q1", "bravo");
    let ra = response(eval_id, "Q1", "alpha");
    let u = Uuid::new_v4();

    let scores = vec![
        score(rb.id, u, "accuracy", 4),
        score(ra.id, u, "accuracy", 4),
    ];

    let report = aggregate_scores(&[rb, ra], &scores);
    let rankings = rank_models(&report);
    assert_eq!(rankings[0].model, "alpha");
    assert_eq!(rankings[1].model, "bravo");
}

#[test]
fn strengths_and_weaknesses_come_from_own_dimensions() {
    let eval_id = Uuid::new_v4();
    let r1 = response(eval_id, "Q1", "m1");
    let u = Uuid::new_v4();

    let scores = vec![
        score(r1.id, u, "accuracy", 5),
        score(r1.id, u, "clarity", 4),
        score(r1.id, u, "depth", 2),
        score(r1.id, u, "charity", 1),
    ];

    let report = aggregate_scores(&[r1], &scores);
    let sw = identify_strengths_weaknesses(&report);
    let entry = &sw["m1"];

    assert_eq!(entry.strengths.len(), 2);
    assert_eq!(entry.weaknesses.len(), 2);
    assert!(entry.strengths.contains(&"accuracy".to_string()));
    assert!(entry.strengths.contains(&"clarity".to_string()));
    assert!(entry.weaknesses.contains(&"charity".to_string()));
    assert!(entry.weaknesses.contains(&"depth".to_string()));
}

#[test]
fn single_dimension_appears_in_both_lists() {
    let eval_id = Uuid::new_v4();
    let r1 = response(eval_id, "Q1", "m1");
    let u = Uuid::new_v4();

    let scores = vec![score(r1.id, u, "accuracy", 3)];
    let report = aggregate_scores(&[r1], &scores);
    let sw = identify_strengths_weaknesses(&report);
    let entry = &sw["m1"];

    assert_eq!(entry.strengths, vec!["accuracy".to_string()]);
    assert_eq!(entry.weaknesses, vec!["accuracy".to_string()]);
}

#[test]
fn models_without_scores_are_omitted_from_insights() {
    let report = aggregate_scores(&[], &[]);
    assert!(rank_models(&report).is_empty());
    assert!(identify_strengths_weaknesses(&report).is_empty());
}
