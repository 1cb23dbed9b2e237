use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Theological,
    Factual,
    Interpretive,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Theological => "theological",
            QuestionType::Factual => "factual",
            QuestionType::Interpretive => "interpretive",
        }
    }
}

/// A single evaluation question from the external question bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: String,
    #[serde(default)]
    pub scripture_references: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionFileMetadata {
    pub category: String,
    pub subcategory: String,
}

/// Schema for one question YAML file: a metadata header plus questions.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionFile {
    pub metadata: QuestionFileMetadata,
    pub questions: Vec<Question>,
}

pub fn load_question_file(path: &Path) -> anyhow::Result<QuestionFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
    serde_yaml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))
}

/// Load every question from the question bank directory, recursively.
/// Files that fail to parse are logged and skipped so one broken file does
/// not take down the whole bank.
pub fn load_all_questions(questions_dir: &Path) -> Vec<Question> {
    let mut questions = Vec::new();

    if !questions_dir.exists() {
        tracing::warn!(dir = %questions_dir.display(), "questions directory not found");
        return questions;
    }

    let mut paths = Vec::new();
    collect_yaml_paths(questions_dir, &mut paths);
    paths.sort();

    for path in paths {
        match load_question_file(&path) {
            Ok(qf) => {
                tracing::info!(
                    file = %path.display(),
                    count = qf.questions.len(),
                    "loaded question file"
                );
                questions.extend(qf.questions);
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "failed to load question file");
            }
        }
    }

    tracing::info!(total = questions.len(), "questions loaded");
    questions
}

fn collect_yaml_paths(dir: &Path, out: &mut Vec<std::path::PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_yaml_paths(&path, out);
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        ) {
            out.push(path);
        }
    }
}
