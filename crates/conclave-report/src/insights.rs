use crate::aggregate::AggregatedReport;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct RankedModel {
    pub rank: u32,
    pub model: String,
    pub overall_score: f64,
}

/// Rank models by overall average score, rank 1 highest. Exact ties break
/// by model name ascending so the ordering is deterministic.
pub fn rank_models(report: &AggregatedReport) -> Vec<RankedModel> {
    let mut entries: Vec<(&String, &f64)> = report.model_overall.iter().collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (model, score))| RankedModel {
            rank: i as u32 + 1,
            model: model.clone(),
            overall_score: *score,
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StrengthsWeaknesses {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Identify each model's two strongest and two weakest dimensions from its
/// dimension averages. With fewer than two dimensions the same dimension can
/// appear in both lists. Models with no dimension averages are omitted.
pub fn identify_strengths_weaknesses(
    report: &AggregatedReport,
) -> BTreeMap<String, StrengthsWeaknesses> {
    let mut results = BTreeMap::new();

    for (model, dims) in &report.model_averages {
        if dims.is_empty() {
            continue;
        }
        let mut sorted: Vec<(&String, &f64)> = dims.iter().collect();
        sorted.sort_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));

        let take = sorted.len().min(2);
        let strengths = sorted[sorted.len() - take..]
            .iter()
            .map(|(d, _)| (*d).clone())
            .collect();
        let weaknesses = sorted[..take].iter().map(|(d, _)| (*d).clone()).collect();

        results.insert(
            model.clone(),
            StrengthsWeaknesses {
                strengths,
                weaknesses,
            },
        );
    }

    results
}
