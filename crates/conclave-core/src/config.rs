use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a single target model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub provider: String,
    pub model_id: String,
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelsFile {
    models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerspectiveConfig {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PerspectivesFile {
    perspectives: Vec<PerspectiveConfig>,
}

/// A named axis of quality being rated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionConfig {
    pub name: String,
    pub label: String,
    pub description: String,
    #[serde(default = "default_min_value")]
    pub min_value: i64,
    #[serde(default = "default_max_value")]
    pub max_value: i64,
}

fn default_min_value() -> i64 {
    1
}

fn default_max_value() -> i64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
struct DimensionsFile {
    dimensions: Vec<DimensionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub template: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TemplatesFile {
    templates: Vec<PromptTemplate>,
}

/// Aggregated application configuration, built once at startup and passed
/// into the components that need it. Not a process-wide singleton.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub models: Vec<ModelConfig>,
    pub perspectives: Vec<PerspectiveConfig>,
    pub dimensions: Vec<DimensionConfig>,
    pub templates: Vec<PromptTemplate>,
}

impl AppConfig {
    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn template(&self, id: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
    serde_yaml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))
}

/// Load all configuration files from the config directory. Missing files are
/// treated as empty sections so a partial deployment still starts.
pub fn load_app_config(config_dir: &Path) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::default();

    let models_path = config_dir.join("models.yaml");
    if models_path.exists() {
        let parsed: ModelsFile = load_yaml(&models_path)?;
        config.models = parsed.models;
    }

    let perspectives_path = config_dir.join("perspectives.yaml");
    if perspectives_path.exists() {
        let parsed: PerspectivesFile = load_yaml(&perspectives_path)?;
        config.perspectives = parsed.perspectives;
    }

    let dimensions_path = config_dir.join("scoring_dimensions.yaml");
    if dimensions_path.exists() {
        let parsed: DimensionsFile = load_yaml(&dimensions_path)?;
        config.dimensions = parsed.dimensions;
    }

    let templates_path = config_dir.join("prompt_templates.yaml");
    if templates_path.exists() {
        let parsed: TemplatesFile = load_yaml(&templates_path)?;
        config.templates = parsed.templates;
    }

    tracing::info!(
        models = config.models.len(),
        perspectives = config.perspectives.len(),
        dimensions = config.dimensions.len(),
        templates = config.templates.len(),
        "loaded app config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_partial_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("models.yaml"),
            r#"
models:
  - name: gpt-4o
    provider: openai
    model_id: gpt-4o
    api_key_env: OPENAI_API_KEY
  - name: claude-sonnet
    provider: anthropic
    model_id: claude-sonnet-4-20250514
    api_key_env: ANTHROPIC_API_KEY
"#,
        )
        .unwrap();

        let cfg = load_app_config(dir.path()).unwrap();
        assert_eq!(cfg.models.len(), 2);
        assert!(cfg.perspectives.is_empty());
        assert_eq!(cfg.model("gpt-4o").unwrap().provider, "openai");
        assert!(cfg.model("missing").is_none());
    }

    #[test]
    fn empty_dir_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_app_config(dir.path()).unwrap();
        assert!(cfg.models.is_empty());
        assert!(cfg.templates.is_empty());
    }
}
