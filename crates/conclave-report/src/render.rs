use crate::aggregate::AggregatedReport;
use crate::insights::{RankedModel, StrengthsWeaknesses};
use conclave_core::model::Evaluation;
use std::collections::BTreeMap;

/// The canonical report shape: evaluation summary, rankings,
/// strengths/weaknesses and every aggregate field merged at the top level.
/// The textual formats are renderings of this same data.
pub fn build_report_data(
    evaluation: &Evaluation,
    report: &AggregatedReport,
    rankings: &[RankedModel],
    strengths: &BTreeMap<String, StrengthsWeaknesses>,
) -> anyhow::Result<serde_json::Value> {
    let mut data = serde_json::json!({
        "evaluation": {
            "id": evaluation.id,
            "name": evaluation.name,
            "perspective": evaluation.perspective,
            "review_mode": evaluation.review_mode,
            "model_list": evaluation.model_list,
        },
        "rankings": rankings,
        "strengths_weaknesses": strengths,
    });

    let report_value = serde_json::to_value(report)?;
    if let (Some(map), serde_json::Value::Object(fields)) = (data.as_object_mut(), report_value) {
        map.extend(fields);
    }
    Ok(data)
}

pub fn render_markdown(
    evaluation: &Evaluation,
    report: &AggregatedReport,
    rankings: &[RankedModel],
    strengths: &BTreeMap<String, StrengthsWeaknesses>,
) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Evaluation Report: {}\n\n", evaluation.name));
    md.push_str(&format!("- **Perspective:** {}\n", evaluation.perspective));
    md.push_str(&format!(
        "- **Review mode:** {}\n",
        evaluation.review_mode.as_str()
    ));
    md.push_str(&format!(
        "- **Models:** {}\n",
        evaluation.model_list.join(", ")
    ));
    md.push_str(&format!(
        "- **Responses:** {} | **Scores:** {} | **Reviewers:** {}\n\n",
        report.total_responses, report.total_scores, report.reviewer_count
    ));

    md.push_str("## Rankings\n\n");
    if rankings.is_empty() {
        md.push_str("No scores recorded yet.\n\n");
    } else {
        md.push_str("| Rank | Model | Overall |\n|------|-------|--------:|\n");
        for r in rankings {
            md.push_str(&format!(
                "| {} | {} | {:.2} |\n",
                r.rank, r.model, r.overall_score
            ));
        }
        md.push('\n');
    }

    if !report.dimension_averages.is_empty() {
        md.push_str("## Scores by Dimension\n\n");
        let dimensions: Vec<&String> = report.dimension_averages.keys().collect();
        md.push_str("| Model |");
        for dim in &dimensions {
            md.push_str(&format!(" {} |", dim));
        }
        md.push_str("\n|-------|");
        for _ in &dimensions {
            md.push_str("------:|");
        }
        md.push('\n');
        for (model, dims) in &report.model_averages {
            md.push_str(&format!("| {} |", model));
            for dim in &dimensions {
                match dims.get(*dim) {
                    Some(avg) => md.push_str(&format!(" {:.2} |", avg)),
                    None => md.push_str(" - |"),
                }
            }
            md.push('\n');
        }
        md.push('\n');
    }

    if !strengths.is_empty() {
        md.push_str("## Strengths & Weaknesses\n\n");
        for (model, sw) in strengths {
            md.push_str(&format!(
                "- **{}** — strengths: {}; weaknesses: {}\n",
                model,
                sw.strengths.join(", "),
                sw.weaknesses.join(", ")
            ));
        }
        md.push('\n');
    }

    let pairs: Vec<(&String, &String, &BTreeMap<String, f64>)> = report
        .head_to_head
        .iter()
        .flat_map(|(a, versus)| versus.iter().map(move |(b, cmp)| (a, b, cmp)))
        .filter(|(_, _, cmp)| !cmp.is_empty())
        .collect();
    if !pairs.is_empty() {
        md.push_str("## Head-to-Head\n\n");
        for (a, b, comparison) in pairs {
            md.push_str(&format!(
                "### {} vs {}\n\nPositive values favor {}.\n\n",
                a, b, a
            ));
            md.push_str("| Dimension | Delta |\n|-----------|------:|\n");
            for (dim, delta) in comparison {
                md.push_str(&format!("| {} | {:+.2} |\n", dim, delta));
            }
            md.push('\n');
        }
    }

    if !report.question_scores.is_empty() {
        md.push_str("## Per-Question Breakdown\n\n");
        for (question_id, models) in &report.question_scores {
            md.push_str(&format!("### {}\n\n", question_id));
            md.push_str("| Model | Dimension | Average |\n|-------|-----------|--------:|\n");
            for (model, dims) in models {
                for (dim, avg) in dims {
                    md.push_str(&format!("| {} | {} | {:.2} |\n", model, dim, avg));
                }
            }
            md.push('\n');
        }
    }

    md
}

/// HTML rendering of the same content. Content is server-controlled at
/// render time, so values are written through without escaping.
pub fn render_html(
    evaluation: &Evaluation,
    report: &AggregatedReport,
    rankings: &[RankedModel],
    strengths: &BTreeMap<String, StrengthsWeaknesses>,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>Evaluation Report: {}</title>\n",
        evaluation.name
    ));
    html.push_str(
        "<style>\nbody { font-family: sans-serif; margin: 2rem; }\n\
         table { border-collapse: collapse; margin-bottom: 1.5rem; }\n\
         th, td { border: 1px solid #ccc; padding: 0.35rem 0.75rem; text-align: left; }\n\
         td.num { text-align: right; }\n</style>\n</head>\n<body>\n",
    );

    html.push_str(&format!("<h1>Evaluation Report: {}</h1>\n", evaluation.name));
    html.push_str("<ul>\n");
    html.push_str(&format!(
        "<li><strong>Perspective:</strong> {}</li>\n",
        evaluation.perspective
    ));
    html.push_str(&format!(
        "<li><strong>Review mode:</strong> {}</li>\n",
        evaluation.review_mode.as_str()
    ));
    html.push_str(&format!(
        "<li><strong>Models:</strong> {}</li>\n",
        evaluation.model_list.join(", ")
    ));
    html.push_str(&format!(
        "<li><strong>Responses:</strong> {} &middot; <strong>Scores:</strong> {} &middot; <strong>Reviewers:</strong> {}</li>\n",
        report.total_responses, report.total_scores, report.reviewer_count
    ));
    html.push_str("</ul>\n");

    html.push_str("<h2>Rankings</h2>\n");
    if rankings.is_empty() {
        html.push_str("<p>No scores recorded yet.</p>\n");
    } else {
        html.push_str("<table>\n<tr><th>Rank</th><th>Model</th><th>Overall</th></tr>\n");
        for r in rankings {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td class=\"num\">{:.2}</td></tr>\n",
                r.rank, r.model, r.overall_score
            ));
        }
        html.push_str("</table>\n");
    }

    if !report.dimension_averages.is_empty() {
        html.push_str("<h2>Scores by Dimension</h2>\n<table>\n<tr><th>Model</th>");
        let dimensions: Vec<&String> = report.dimension_averages.keys().collect();
        for dim in &dimensions {
            html.push_str(&format!("<th>{}</th>", dim));
        }
        html.push_str("</tr>\n");
        for (model, dims) in &report.model_averages {
            html.push_str(&format!("<tr><td>{}</td>", model));
            for dim in &dimensions {
                match dims.get(*dim) {
                    Some(avg) => html.push_str(&format!("<td class=\"num\">{:.2}</td>", avg)),
                    None => html.push_str("<td class=\"num\">-</td>"),
                }
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");
    }

    if !strengths.is_empty() {
        html.push_str("<h2>Strengths &amp; Weaknesses</h2>\n<ul>\n");
        for (model, sw) in strengths {
            html.push_str(&format!(
                "<li><strong>{}</strong> — strengths: {}; weaknesses: {}</li>\n",
                model,
                sw.strengths.join(", "),
                sw.weaknesses.join(", ")
            ));
        }
        html.push_str("</ul>\n");
    }

    let pairs: Vec<(&String, &String, &BTreeMap<String, f64>)> = report
        .head_to_head
        .iter()
        .flat_map(|(a, versus)| versus.iter().map(move |(b, cmp)| (a, b, cmp)))
        .filter(|(_, _, cmp)| !cmp.is_empty())
        .collect();
    if !pairs.is_empty() {
        html.push_str("<h2>Head-to-Head</h2>\n");
        for (a, b, comparison) in pairs {
            html.push_str(&format!(
                "<h3>{} vs {}</h3>\n<p>Positive values favor {}.</p>\n",
                a, b, a
            ));
            html.push_str("<table>\n<tr><th>Dimension</th><th>Delta</th></tr>\n");
            for (dim, delta) in comparison {
                html.push_str(&format!(
                    "<tr><td>{}</td><td class=\"num\">{:+.2}</td></tr>\n",
                    dim, delta
                ));
            }
            html.push_str("</table>\n");
        }
    }

    if !report.question_scores.is_empty() {
        html.push_str("<h2>Per-Question Breakdown</h2>\n");
        for (question_id, models) in &report.question_scores {
            html.push_str(&format!("<h3>{}</h3>\n", question_id));
            html.push_str("<table>\n<tr><th>Model</th><th>Dimension</th><th>Average</th></tr>\n");
            for (model, dims) in models {
                for (dim, avg) in dims {
                    html.push_str(&format!(
                        "<tr><td>{}</td><td>{}</td><td class=\"num\">{:.2}</td></tr>\n",
                        model, dim, avg
                    ));
                }
            }
            html.push_str("</table>\n");
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}
