use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::collections::BTreeMap;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness aggregates a database probe, presence of the auth secret, and
/// at least one resolvable API key per configured model provider. Missing
/// prerequisites degrade the service (still 200); an unreachable database
/// makes it unhealthy (503) so deployment tooling can tell the two apart.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let database_ok = match state.store.ping() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "database probe failed");
            false
        }
    };

    let auth_ok = state.server.auth_secret.is_some();

    // One resolvable key per provider is enough to call its models.
    let mut provider_ok: BTreeMap<String, bool> = BTreeMap::new();
    for model in &state.config.models {
        let has_key = std::env::var(&model.api_key_env).is_ok();
        let entry = provider_ok.entry(model.provider.clone()).or_insert(false);
        *entry = *entry || has_key;
    }
    let missing_providers: Vec<String> = provider_ok
        .iter()
        .filter(|(_, ok)| !**ok)
        .map(|(p, _)| p.clone())
        .collect();
    let llm_keys_ok = missing_providers.is_empty();

    let (status, code) = if !database_ok {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    } else if !auth_ok || !llm_keys_ok {
        ("degraded", StatusCode::OK)
    } else {
        ("healthy", StatusCode::OK)
    };

    let body = serde_json::json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "commit": state.server.commit_sha,
        "checks": {
            "database": { "status": if database_ok { "ok" } else { "error" } },
            "auth": { "status": if auth_ok { "ok" } else { "missing_secret" } },
            "llm_keys": {
                "status": if llm_keys_ok { "ok" } else { "missing" },
                "missing_providers": missing_providers,
            },
        },
    });
    (code, Json(body))
}
