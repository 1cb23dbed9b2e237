use crate::model::{
    now_rfc3339, Evaluation, EvaluationStatus, NewResponse, NewScore, ProgressStats,
    ResponseRecord, ResponseSource, ReviewMode, ScoreRecord, User,
};
use crate::questions::Question;
use anyhow::Context;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

/// A question row as synced into storage (the bank remains the source of
/// truth; rows exist so responses have a referential anchor).
#[derive(Debug, Clone)]
pub struct QuestionRow {
    pub id: String,
    pub text: String,
    pub question_type: String,
    pub category: String,
    pub difficulty: String,
    pub metadata: serde_json::Value,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    /// Cheap liveness probe for the readiness endpoint.
    pub fn ping(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        let one: i64 = conn.query_row("SELECT 1", [], |r| r.get(0))?;
        anyhow::ensure!(one == 1, "unexpected ping result");
        Ok(())
    }

    // --- users ---

    pub fn get_user_by_subject(&self, auth_provider_id: &str) -> anyhow::Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, auth_provider_id, email, display_name, role, created_at
             FROM users WHERE auth_provider_id = ?1",
        )?;
        let mut rows = stmt.query(params![auth_provider_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_user(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, auth_provider_id, email, display_name, role, created_at
             FROM users WHERE lower(email) = lower(?1)",
        )?;
        let mut rows = stmt.query(params![email])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_user(row)?)),
            None => Ok(None),
        }
    }

    pub fn insert_user(
        &self,
        auth_provider_id: &str,
        email: &str,
        display_name: Option<&str>,
        role: &str,
    ) -> anyhow::Result<User> {
        let conn = self.conn.lock().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            auth_provider_id: auth_provider_id.to_string(),
            email: email.to_lowercase(),
            display_name: display_name.map(|s| s.to_string()),
            role: role.to_string(),
            created_at: now_rfc3339(),
        };
        conn.execute(
            "INSERT INTO users(id, auth_provider_id, email, display_name, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.auth_provider_id,
                user.email,
                user.display_name,
                user.role,
                user.created_at
            ],
        )
        .context("insert user")?;
        Ok(user)
    }

    pub fn update_user_profile(
        &self,
        id: Uuid,
        email: &str,
        display_name: Option<&str>,
        role: &str,
    ) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET email = ?1, display_name = ?2, role = ?3 WHERE id = ?4",
            params![email.to_lowercase(), display_name, role, id.to_string()],
        )?;
        Ok(())
    }

    // --- evaluations ---

    pub fn create_evaluation(
        &self,
        name: &str,
        perspective: &str,
        scoring_dimensions: &[String],
        model_list: &[String],
        prompt_template: &str,
        review_mode: ReviewMode,
        created_by: Uuid,
    ) -> anyhow::Result<Evaluation> {
        let conn = self.conn.lock().unwrap();
        let now = now_rfc3339();
        let evaluation = Evaluation {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: EvaluationStatus::Created,
            perspective: perspective.to_string(),
            scoring_dimensions: scoring_dimensions.to_vec(),
            model_list: model_list.to_vec(),
            prompt_template: prompt_template.to_string(),
            review_mode,
            created_by,
            created_at: now.clone(),
            updated_at: now,
        };
        conn.execute(
            "INSERT INTO evaluations(id, name, status, perspective, scoring_dimensions_json,
                                     model_list_json, prompt_template, review_mode, created_by,
                                     created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                evaluation.id.to_string(),
                evaluation.name,
                evaluation.status.as_str(),
                evaluation.perspective,
                serde_json::to_string(&evaluation.scoring_dimensions)?,
                serde_json::to_string(&evaluation.model_list)?,
                evaluation.prompt_template,
                evaluation.review_mode.as_str(),
                evaluation.created_by.to_string(),
                evaluation.created_at,
                evaluation.updated_at
            ],
        )
        .context("insert evaluation")?;
        Ok(evaluation)
    }

    pub fn get_evaluation(&self, id: Uuid) -> anyhow::Result<Option<Evaluation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, status, perspective, scoring_dimensions_json, model_list_json,
                    prompt_template, review_mode, created_by, created_at, updated_at
             FROM evaluations WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_evaluation(row)?)),
            None => Ok(None),
        }
    }

    pub fn list_evaluations(&self) -> anyhow::Result<Vec<Evaluation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, status, perspective, scoring_dimensions_json, model_list_json,
                    prompt_template, review_mode, created_by, created_at, updated_at
             FROM evaluations ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_evaluation)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn set_evaluation_status(&self, id: Uuid, status: EvaluationStatus) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE evaluations SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), now_rfc3339(), id.to_string()],
        )?;
        Ok(())
    }

    /// Compare-and-set transition into `collecting`. Only succeeds from
    /// `created` or `collecting`; the update itself is the guard against two
    /// concurrent run triggers both starting a sweep.
    pub fn try_begin_collection(&self, id: Uuid) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE evaluations SET status = 'collecting', updated_at = ?1
             WHERE id = ?2 AND status IN ('created', 'collecting')",
            params![now_rfc3339(), id.to_string()],
        )?;
        Ok(changed == 1)
    }

    /// Explicit cascading delete: scores, then responses, then the
    /// evaluation row, in one transaction.
    pub fn delete_evaluation(&self, id: Uuid) -> anyhow::Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM scores WHERE response_id IN
               (SELECT id FROM responses WHERE evaluation_id = ?1)",
            params![id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM responses WHERE evaluation_id = ?1",
            params![id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM evaluations WHERE id = ?1",
            params![id.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }

    // --- questions ---

    /// Idempotently sync bank questions into storage so responses have a
    /// referential anchor. Existing rows are left untouched.
    pub fn sync_questions(&self, questions: &[Question]) -> anyhow::Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO questions(id, text, question_type, category, difficulty, metadata_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO NOTHING",
            )?;
            for q in questions {
                let metadata = serde_json::json!({
                    "scripture_references": q.scripture_references,
                    "tags": q.tags,
                });
                stmt.execute(params![
                    q.id,
                    q.text,
                    q.question_type.as_str(),
                    q.question_type.as_str(),
                    q.difficulty,
                    serde_json::to_string(&metadata)?
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_question(&self, id: &str) -> anyhow::Result<Option<QuestionRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, text, question_type, category, difficulty, metadata_json
             FROM questions WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => {
                let metadata_str: Option<String> = row.get(5)?;
                Ok(Some(QuestionRow {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    question_type: row.get(2)?,
                    category: row.get(3)?,
                    difficulty: row.get(4)?,
                    metadata: metadata_str
                        .and_then(|s| serde_json::from_str(&s).ok())
                        .unwrap_or(serde_json::Value::Null),
                }))
            }
            None => Ok(None),
        }
    }

    // --- responses ---

    /// Insert a batch of responses in one transaction: the collection sweep
    /// commits once at the end, not per response.
    pub fn insert_responses(&self, batch: &[NewResponse]) -> anyhow::Result<Vec<ResponseRecord>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(batch.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO responses(id, evaluation_id, question_id, model_name, response_text,
                                       source, metadata_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for item in batch {
                let record = ResponseRecord {
                    id: Uuid::new_v4(),
                    evaluation_id: item.evaluation_id,
                    question_id: item.question_id.clone(),
                    model_name: item.model_name.clone(),
                    response_text: item.response_text.clone(),
                    source: item.source,
                    metadata: item.metadata.clone(),
                    created_at: now_rfc3339(),
                };
                stmt.execute(params![
                    record.id.to_string(),
                    record.evaluation_id.to_string(),
                    record.question_id,
                    record.model_name,
                    record.response_text,
                    record.source.as_str(),
                    serde_json::to_string(&record.metadata)?,
                    record.created_at
                ])?;
                created.push(record);
            }
        }
        tx.commit()?;
        Ok(created)
    }

    pub fn get_response(&self, id: Uuid) -> anyhow::Result<Option<ResponseRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, evaluation_id, question_id, model_name, response_text, source,
                    metadata_json, created_at
             FROM responses WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_response(row)?)),
            None => Ok(None),
        }
    }

    pub fn responses_for_evaluation(
        &self,
        evaluation_id: Uuid,
    ) -> anyhow::Result<Vec<ResponseRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, evaluation_id, question_id, model_name, response_text, source,
                    metadata_json, created_at
             FROM responses WHERE evaluation_id = ?1
             ORDER BY question_id, model_name",
        )?;
        let rows = stmt.query_map(params![evaluation_id.to_string()], row_to_response)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Responses in an evaluation the given reviewer has not scored yet,
    /// ordered by question then model.
    pub fn unscored_responses(
        &self,
        evaluation_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<ResponseRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, evaluation_id, question_id, model_name, response_text, source,
                    metadata_json, created_at
             FROM responses
             WHERE evaluation_id = ?1
               AND id NOT IN (SELECT DISTINCT response_id FROM scores WHERE user_id = ?2)
             ORDER BY question_id, model_name",
        )?;
        let rows = stmt.query_map(
            params![evaluation_id.to_string(), user_id.to_string()],
            row_to_response,
        )?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // --- scores ---

    pub fn insert_scores(&self, batch: &[NewScore]) -> anyhow::Result<Vec<ScoreRecord>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut created = Vec::with_capacity(batch.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO scores(id, response_id, user_id, dimension, value, comment, scored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for item in batch {
                let record = ScoreRecord {
                    id: Uuid::new_v4(),
                    response_id: item.response_id,
                    user_id: item.user_id,
                    dimension: item.dimension.clone(),
                    value: item.value,
                    comment: item.comment.clone(),
                    scored_at: now_rfc3339(),
                };
                stmt.execute(params![
                    record.id.to_string(),
                    record.response_id.to_string(),
                    record.user_id.to_string(),
                    record.dimension,
                    record.value,
                    record.comment,
                    record.scored_at
                ])?;
                created.push(record);
            }
        }
        tx.commit()?;
        Ok(created)
    }

    pub fn scores_for_evaluation(&self, evaluation_id: Uuid) -> anyhow::Result<Vec<ScoreRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT s.id, s.response_id, s.user_id, s.dimension, s.value, s.comment, s.scored_at
             FROM scores s
             JOIN responses r ON s.response_id = r.id
             WHERE r.evaluation_id = ?1
             ORDER BY s.scored_at",
        )?;
        let rows = stmt.query_map(params![evaluation_id.to_string()], row_to_score)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // --- progress ---

    pub fn progress(&self, evaluation_id: Uuid, user_id: Uuid) -> anyhow::Result<ProgressStats> {
        let conn = self.conn.lock().unwrap();
        let eval_id = evaluation_id.to_string();

        let total_responses: i64 = conn.query_row(
            "SELECT COUNT(*) FROM responses WHERE evaluation_id = ?1",
            params![eval_id],
            |r| r.get(0),
        )?;
        let scored_by_user: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT s.response_id)
             FROM scores s JOIN responses r ON s.response_id = r.id
             WHERE r.evaluation_id = ?1 AND s.user_id = ?2",
            params![eval_id, user_id.to_string()],
            |r| r.get(0),
        )?;
        let total_reviewers: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT s.user_id)
             FROM scores s JOIN responses r ON s.response_id = r.id
             WHERE r.evaluation_id = ?1",
            params![eval_id],
            |r| r.get(0),
        )?;
        let model_count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT model_name) FROM responses WHERE evaluation_id = ?1",
            params![eval_id],
            |r| r.get(0),
        )?;
        let question_count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT question_id) FROM responses WHERE evaluation_id = ?1",
            params![eval_id],
            |r| r.get(0),
        )?;

        Ok(ProgressStats {
            total_responses: total_responses as u64,
            scored_by_user: scored_by_user as u64,
            total_reviewers: total_reviewers as u64,
            model_count: model_count as u64,
            question_count: question_count as u64,
        })
    }
}

/// True if the error wraps a SQLite uniqueness/constraint violation. Used by
/// first-login user creation to recover by re-query instead of surfacing.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn parse_uuid(idx: usize, s: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(0, row.get(0)?)?,
        auth_provider_id: row.get(1)?,
        email: row.get(2)?,
        display_name: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_evaluation(row: &Row) -> rusqlite::Result<Evaluation> {
    let dimensions_json: String = row.get(4)?;
    let model_list_json: String = row.get(5)?;
    Ok(Evaluation {
        id: parse_uuid(0, row.get(0)?)?,
        name: row.get(1)?,
        status: EvaluationStatus::parse(&row.get::<_, String>(2)?),
        perspective: row.get(3)?,
        scoring_dimensions: serde_json::from_str(&dimensions_json).unwrap_or_default(),
        model_list: serde_json::from_str(&model_list_json).unwrap_or_default(),
        prompt_template: row.get(6)?,
        review_mode: ReviewMode::parse(&row.get::<_, String>(7)?),
        created_by: parse_uuid(8, row.get(8)?)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn row_to_response(row: &Row) -> rusqlite::Result<ResponseRecord> {
    let metadata_str: Option<String> = row.get(6)?;
    Ok(ResponseRecord {
        id: parse_uuid(0, row.get(0)?)?,
        evaluation_id: parse_uuid(1, row.get(1)?)?,
        question_id: row.get(2)?,
        model_name: row.get(3)?,
        response_text: row.get(4)?,
        source: ResponseSource::parse(&row.get::<_, String>(5)?),
        metadata: metadata_str
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or(serde_json::Value::Null),
        created_at: row.get(7)?,
    })
}

fn row_to_score(row: &Row) -> rusqlite::Result<ScoreRecord> {
    Ok(ScoreRecord {
        id: parse_uuid(0, row.get(0)?)?,
        response_id: parse_uuid(1, row.get(1)?)?,
        user_id: parse_uuid(2, row.get(2)?)?,
        dimension: row.get(3)?,
        value: row.get(4)?,
        comment: row.get(5)?,
        scored_at: row.get(6)?,
    })
}
