use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Created,
    Collecting,
    Running,
    Reviewing,
    Complete,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Created => "created",
            EvaluationStatus::Collecting => "collecting",
            EvaluationStatus::Running => "running",
            EvaluationStatus::Reviewing => "reviewing",
            EvaluationStatus::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "collecting" => EvaluationStatus::Collecting,
            "running" => EvaluationStatus::Running,
            "reviewing" => EvaluationStatus::Reviewing,
            "complete" => EvaluationStatus::Complete,
            _ => EvaluationStatus::Created,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    Blind,
    Labeled,
}

impl ReviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewMode::Blind => "blind",
            ReviewMode::Labeled => "labeled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "labeled" => ReviewMode::Labeled,
            _ => ReviewMode::Blind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Api,
    Import,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Api => "api",
            ResponseSource::Import => "import",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "import" => ResponseSource::Import,
            _ => ResponseSource::Api,
        }
    }
}

/// One comparative run of several models against the question bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    pub name: String,
    pub status: EvaluationStatus,
    pub perspective: String,
    pub scoring_dimensions: Vec<String>,
    pub model_list: Vec<String>,
    pub prompt_template: String,
    pub review_mode: ReviewMode,
    pub created_by: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

/// Request payload for creating an evaluation run.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationCreate {
    pub name: String,
    #[serde(default = "default_perspective")]
    pub perspective: String,
    #[serde(default)]
    pub scoring_dimensions: Vec<String>,
    pub model_list: Vec<String>,
    #[serde(default = "default_template")]
    pub prompt_template: String,
    #[serde(default = "default_review_mode")]
    pub review_mode: ReviewMode,
}

fn default_perspective() -> String {
    "multi_perspective".to_string()
}

fn default_template() -> String {
    "default".to_string()
}

fn default_review_mode() -> ReviewMode {
    ReviewMode::Blind
}

/// One model's answer to one question within one evaluation. Immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub question_id: String,
    pub model_name: String,
    pub response_text: String,
    pub source: ResponseSource,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewResponse {
    pub evaluation_id: Uuid,
    pub question_id: String,
    pub model_name: String,
    pub response_text: String,
    pub source: ResponseSource,
    pub metadata: serde_json::Value,
}

/// One reviewer's rating of one response on one dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: Uuid,
    pub response_id: Uuid,
    pub user_id: Uuid,
    pub dimension: String,
    pub value: i64,
    pub comment: String,
    pub scored_at: String,
}

#[derive(Debug, Clone)]
pub struct NewScore {
    pub response_id: Uuid,
    pub user_id: Uuid,
    pub dimension: String,
    pub value: i64,
    pub comment: String,
}

/// A single dimension score in a review submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreInput {
    pub dimension: String,
    pub value: i64,
    #[serde(default)]
    pub comment: String,
}

/// Submit one or more dimension scores for a response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSubmission {
    pub response_id: Uuid,
    pub scores: Vec<ScoreInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportedResponse {
    pub question_id: String,
    pub model_name: String,
    pub response_text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A batch of pre-collected responses to import into an evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportBatch {
    pub responses: Vec<ImportedResponse>,
}

/// Application user, linked to the external auth provider by subject id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub auth_provider_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Raw output from one provider call, before it becomes a stored response.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub meta: serde_json::Value,
}

/// Review progress for one reviewer within one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressStats {
    pub total_responses: u64,
    pub scored_by_user: u64,
    pub total_reviewers: u64,
    pub model_count: u64,
    pub question_count: u64,
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
