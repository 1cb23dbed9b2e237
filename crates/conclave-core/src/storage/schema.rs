pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  id TEXT PRIMARY KEY,
  auth_provider_id TEXT NOT NULL UNIQUE,
  email TEXT NOT NULL UNIQUE,
  display_name TEXT,
  role TEXT NOT NULL DEFAULT 'reviewer',
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS evaluations (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  status TEXT NOT NULL DEFAULT 'created',
  perspective TEXT NOT NULL DEFAULT 'multi_perspective',
  scoring_dimensions_json TEXT NOT NULL,
  model_list_json TEXT NOT NULL,
  prompt_template TEXT NOT NULL DEFAULT 'default',
  review_mode TEXT NOT NULL DEFAULT 'blind',
  created_by TEXT NOT NULL REFERENCES users(id),
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS questions (
  id TEXT PRIMARY KEY,
  text TEXT NOT NULL,
  question_type TEXT NOT NULL,
  category TEXT NOT NULL,
  difficulty TEXT NOT NULL,
  metadata_json TEXT
);

CREATE TABLE IF NOT EXISTS responses (
  id TEXT PRIMARY KEY,
  evaluation_id TEXT NOT NULL REFERENCES evaluations(id),
  question_id TEXT NOT NULL REFERENCES questions(id),
  model_name TEXT NOT NULL,
  response_text TEXT NOT NULL,
  source TEXT NOT NULL DEFAULT 'api',
  metadata_json TEXT,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scores (
  id TEXT PRIMARY KEY,
  response_id TEXT NOT NULL REFERENCES responses(id),
  user_id TEXT NOT NULL REFERENCES users(id),
  dimension TEXT NOT NULL,
  value INTEGER NOT NULL,
  comment TEXT NOT NULL DEFAULT '',
  scored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_responses_evaluation ON responses(evaluation_id);
CREATE INDEX IF NOT EXISTS idx_responses_question ON responses(question_id);
CREATE INDEX IF NOT EXISTS idx_scores_response ON scores(response_id);
CREATE INDEX IF NOT EXISTS idx_scores_user ON scores(user_id);
"#;
