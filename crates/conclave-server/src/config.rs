use std::env;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub auth_secret: Option<String>,
    pub admin_emails: Vec<String>,
    pub commit_sha: Option<String>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            auth_secret: None,
            admin_emails: Vec::new(),
            commit_sha: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("CONCLAVE_BIND") {
            cfg.bind_addr = v;
        }
        if let Ok(v) = env::var("CONCLAVE_AUTH_SECRET") {
            if !v.is_empty() {
                cfg.auth_secret = Some(v);
            }
        }
        if let Ok(v) = env::var("CONCLAVE_ADMIN_EMAILS") {
            cfg.admin_emails = v
                .split(',')
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("COMMIT_SHA") {
            if !v.is_empty() {
                cfg.commit_sha = Some(v);
            }
        }
        if let Ok(v) = env::var("CONCLAVE_LOG") {
            cfg.log_level = v;
        }
        cfg
    }
}
