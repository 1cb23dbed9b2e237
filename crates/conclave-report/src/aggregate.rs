use conclave_core::model::{ResponseRecord, ScoreRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Aggregated report data for one evaluation. Derived on demand, never
/// persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregatedReport {
    pub model_averages: BTreeMap<String, BTreeMap<String, f64>>,
    pub model_overall: BTreeMap<String, f64>,
    pub dimension_averages: BTreeMap<String, BTreeMap<String, f64>>,
    pub head_to_head: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
    pub question_scores: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
    pub total_responses: u64,
    pub total_scores: u64,
    pub reviewer_count: u64,
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn mean(values: &[i64]) -> f64 {
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

/// Single-pass, in-memory aggregation over one evaluation's responses and
/// scores.
///
/// Rounding happens only at emission; every figure is computed from the raw
/// integer values, never from a previously rounded intermediate.
pub fn aggregate_scores(responses: &[ResponseRecord], scores: &[ScoreRecord]) -> AggregatedReport {
    let mut report = AggregatedReport {
        total_responses: responses.len() as u64,
        ..Default::default()
    };

    if responses.is_empty() {
        return report;
    }

    let response_map: HashMap<_, _> = responses.iter().map(|r| (r.id, r)).collect();

    report.total_scores = scores.len() as u64;
    if scores.is_empty() {
        return report;
    }

    let reviewers: HashSet<_> = scores.iter().map(|s| s.user_id).collect();
    report.reviewer_count = reviewers.len() as u64;

    // Raw values grouped by model -> dimension, with models kept in
    // first-appearance order for head-to-head pair direction.
    let mut model_order: Vec<String> = Vec::new();
    let mut model_dim: HashMap<String, HashMap<String, Vec<i64>>> = HashMap::new();
    let mut question_model_dim: BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<i64>>>> =
        BTreeMap::new();

    for score in scores {
        let Some(resp) = response_map.get(&score.response_id) else {
            continue;
        };
        if !model_order.contains(&resp.model_name) {
            model_order.push(resp.model_name.clone());
        }
        model_dim
            .entry(resp.model_name.clone())
            .or_default()
            .entry(score.dimension.clone())
            .or_default()
            .push(score.value);
        question_model_dim
            .entry(resp.question_id.clone())
            .or_default()
            .entry(resp.model_name.clone())
            .or_default()
            .entry(score.dimension.clone())
            .or_default()
            .push(score.value);
    }

    // Per-model averages by dimension, plus the flattened overall mean.
    for model in &model_order {
        let dims = &model_dim[model];
        let mut per_dim = BTreeMap::new();
        let mut all_values: Vec<i64> = Vec::new();
        for (dim, values) in dims {
            per_dim.insert(dim.clone(), round2(mean(values)));
            all_values.extend_from_slice(values);
        }
        report.model_averages.insert(model.clone(), per_dim);
        if !all_values.is_empty() {
            report
                .model_overall
                .insert(model.clone(), round2(mean(&all_values)));
        }
    }

    // Transposed view: dimension -> model.
    let all_dimensions: BTreeSet<String> = model_dim
        .values()
        .flat_map(|dims| dims.keys().cloned())
        .collect();

    for dim in &all_dimensions {
        let mut per_model = BTreeMap::new();
        for model in &model_order {
            if let Some(values) = model_dim[model].get(dim) {
                per_model.insert(model.clone(), round2(mean(values)));
            }
        }
        report.dimension_averages.insert(dim.clone(), per_model);
    }

    // Head-to-head: one direction per pair, in first-appearance order. A
    // dimension is omitted when either side has no scores on it.
    for (i, model_a) in model_order.iter().enumerate() {
        let mut versus = BTreeMap::new();
        for model_b in model_order.iter().skip(i + 1) {
            let mut comparison = BTreeMap::new();
            for dim in &all_dimensions {
                let a_vals = model_dim[model_a].get(dim);
                let b_vals = model_dim[model_b].get(dim);
                if let (Some(a), Some(b)) = (a_vals, b_vals) {
                    comparison.insert(dim.clone(), round2(mean(a) - mean(b)));
                }
            }
            versus.insert(model_b.clone(), comparison);
        }
        report.head_to_head.insert(model_a.clone(), versus);
    }

    // Per-question breakdown, same mean computation scoped per question.
    for (question_id, models) in &question_model_dim {
        let mut per_model = BTreeMap::new();
        for (model, dims) in models {
            let mut per_dim = BTreeMap::new();
            for (dim, values) in dims {
                per_dim.insert(dim.clone(), round2(mean(values)));
            }
            per_model.insert(model.clone(), per_dim);
        }
        report.question_scores.insert(question_id.clone(), per_model);
    }

    report
}
