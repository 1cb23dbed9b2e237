use conclave_core::model::{
    Evaluation, EvaluationStatus, ResponseRecord, ResponseSource, ReviewMode, ScoreRecord,
};
use conclave_report::aggregate::aggregate_scores;
use conclave_report::insights::{identify_strengths_weaknesses, rank_models};
use conclave_report::render::{build_report_data, render_html, render_markdown};
use uuid::Uuid;

fn sample_evaluation() -> Evaluation {
    Evaluation {
        id: Uuid::new_v4(),
        name: "Pilot Run".into(),
        status: EvaluationStatus::Reviewing,
        perspective: "multi_perspective".into(),
        scoring_dimensions: vec!["accuracy".into(), "clarity".into()],
        model_list: vec!["m1".into(), "m2".into()],
        prompt_template: "default".into(),
        review_mode: ReviewMode::Blind,
        created_by: Uuid::new_v4(),
        created_at: "2026-01-01T00:00:00Z".into(),
        updated_at: "2026-01-01T00:00:00Z".into(),
    }
}

fn sample_rows(eval_id: Uuid) -> (Vec<ResponseRecord>, Vec<ScoreRecord>) {
    let mk_resp = |q: &str, m: &str| ResponseRecord {
        id: Uuid::new_v4(),
        evaluation_id: eval_id,
        question_id: q.into(),
        model_name: m.into(),
        response_text: "text".into(),
        source: ResponseSource::Api,
        metadata: serde_json::Value::Null,
        created_at: "2026-01-01T00:00:00Z".into(),
    };
    let r1 = mk_resp("Q1", "m1");
    let r2 = mk_resp("Q1", "m2");
    let u = Uuid::new_v4();
    let mk_score = |rid: Uuid, dim: &str, v: i64| ScoreRecord {
        id: Uuid::new_v4(),
        response_id: rid,
        user_id: u,
        dimension: dim.into(),
        value: v,
        comment: String::new(),
        scored_at: "2026-01-01T00:00:00Z".into(),
    };
    let scores = vec![
        mk_score(r1.id, "accuracy", 5),
        mk_score(r1.id, "clarity", 4),
        mk_score(r2.id, "accuracy", 3),
        mk_score(r2.id, "clarity", 2),
    ];
    (vec![r1, r2], scores)
}

#[test]
fn canonical_data_merges_report_fields_at_top_level() {
    let evaluation = sample_evaluation();
    let (responses, scores) = sample_rows(evaluation.id);
    let report = aggregate_scores(&responses, &scores);
    let rankings = rank_models(&report);
    let sw = identify_strengths_weaknesses(&report);

    let data = build_report_data(&evaluation, &report, &rankings, &sw).unwrap();

    assert_eq!(data["evaluation"]["name"], "Pilot Run");
    assert_eq!(data["rankings"][0]["model"], "m1");
    assert_eq!(data["total_responses"], 2);
    assert_eq!(data["model_averages"]["m1"]["accuracy"], 5.0);
    assert_eq!(data["head_to_head"]["m1"]["m2"]["accuracy"], 2.0);
    assert!(data["strengths_weaknesses"]["m1"]["strengths"].is_array());
}

#[test]
fn markdown_report_contains_all_sections() {
    let evaluation = sample_evaluation();
    let (responses, scores) = sample_rows(evaluation.id);
    let report = aggregate_scores(&responses, &scores);
    let rankings = rank_models(&report);
    let sw = identify_strengths_weaknesses(&report);

    let md = render_markdown(&evaluation, &report, &rankings, &sw);

    assert!(md.starts_with("# Evaluation Report: Pilot Run"));
    assert!(md.contains("## Rankings"));
    assert!(md.contains("| 1 | m1 | 4.50 |"));
    assert!(md.contains("## Scores by Dimension"));
    assert!(md.contains("## Head-to-Head"));
    assert!(md.contains("### m1 vs m2"));
    assert!(md.contains("| accuracy | +2.00 |"));
    assert!(md.contains("## Per-Question Breakdown"));
    assert!(md.contains("### Q1"));
}

#[test]
fn markdown_for_unscored_evaluation_is_minimal() {
    let evaluation = sample_evaluation();
    let report = aggregate_scores(&[], &[]);
    let md = render_markdown(&evaluation, &report, &[], &Default::default());

    assert!(md.contains("No scores recorded yet."));
    assert!(!md.contains("## Head-to-Head"));
}

#[test]
fn html_report_is_a_full_document() {
    let evaluation = sample_evaluation();
    let (responses, scores) = sample_rows(evaluation.id);
    let report = aggregate_scores(&responses, &scores);
    let rankings = rank_models(&report);
    let sw = identify_strengths_weaknesses(&report);

    let html = render_html(&evaluation, &report, &rankings, &sw);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h1>Evaluation Report: Pilot Run</h1>"));
    assert!(html.contains("<h2>Rankings</h2>"));
    assert!(html.contains("<td class=\"num\">4.50</td>"));
    assert!(html.ends_with("</html>\n"));
}
