use crate::errors::ServiceError;
use crate::model::User;
use crate::storage::{store::is_constraint_violation, Store};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

/// Decoded bearer token with typed claims.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
    #[allow(dead_code)]
    exp: Option<u64>,
}

/// Verify an HS256-signed bearer token. Returns `None` for an invalid or
/// expired token; a missing `sub` claim also counts as invalid. The caller
/// is responsible for treating a missing secret as an infrastructure
/// failure, not an invalid credential.
pub fn verify_token(secret: &str, token: &str) -> Option<DecodedToken> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let data = match decode::<Claims>(token, &key, &validation) {
        Ok(data) => data,
        Err(e) => {
            tracing::info!(error = %e, "token verification failed");
            return None;
        }
    };

    let sub = match data.claims.sub {
        Some(s) if !s.is_empty() => s,
        _ => {
            tracing::warn!("token missing sub claim");
            return None;
        }
    };

    Some(DecodedToken {
        sub,
        email: data.claims.email,
        name: data.claims.name,
    })
}

/// Resolve the token subject to an application user, creating one on first
/// login when the token carries an email. A commit-time uniqueness violation
/// (two first requests racing) is recovered by re-querying for the winner.
pub fn ensure_user(
    store: &Store,
    decoded: &DecodedToken,
    admin_emails: &[String],
) -> anyhow::Result<User> {
    let email = decoded.email.as_ref().map(|e| e.to_lowercase());
    let is_admin = email
        .as_deref()
        .map(|e| admin_emails.iter().any(|a| a.eq_ignore_ascii_case(e)))
        .unwrap_or(false);

    let mut user = store.get_user_by_subject(&decoded.sub)?;
    if user.is_none() {
        if let Some(e) = email.as_deref() {
            user = store.get_user_by_email(e)?;
        }
    }

    let user = match user {
        Some(u) => u,
        None => {
            let email = email.clone().ok_or_else(|| {
                anyhow::Error::new(ServiceError::Unauthorized(
                    "Email required for account creation".into(),
                ))
            })?;
            let role = if is_admin { "admin" } else { "reviewer" };
            match store.insert_user(&decoded.sub, &email, decoded.name.as_deref(), role) {
                Ok(u) => {
                    tracing::info!(subject = %decoded.sub, email = %email, "created new user");
                    u
                }
                Err(e) if is_constraint_violation(&e) => {
                    // Lost the race; the winning row is authoritative.
                    store
                        .get_user_by_subject(&decoded.sub)?
                        .or(store.get_user_by_email(&email)?)
                        .ok_or_else(|| anyhow::anyhow!("account creation failed: {}", e))?
                }
                Err(e) => return Err(e),
            }
        }
    };

    // Keep profile fields in sync with the token.
    let mut changed = false;
    let mut next_email = user.email.clone();
    let mut next_name = user.display_name.clone();
    let mut next_role = user.role.clone();

    if let Some(e) = email {
        if !user.email.eq_ignore_ascii_case(&e) {
            next_email = e;
            changed = true;
        }
    }
    if let Some(n) = &decoded.name {
        if user.display_name.as_deref() != Some(n.as_str()) {
            next_name = Some(n.clone());
            changed = true;
        }
    }
    if is_admin && user.role != "admin" {
        next_role = "admin".to_string();
        changed = true;
    }

    if changed {
        store.update_user_profile(user.id, &next_email, next_name.as_deref(), &next_role)?;
        return Ok(User {
            email: next_email,
            display_name: next_name,
            role: next_role,
            ..user
        });
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn make_token(secret: &str, claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn verifies_valid_token() {
        let token = make_token(
            SECRET,
            json!({"sub": "user-1", "email": "a@example.com", "name": "A", "exp": future_exp()}),
        );
        let decoded = verify_token(SECRET, &token).unwrap();
        assert_eq!(decoded.sub, "user-1");
        assert_eq!(decoded.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = make_token("other-secret", json!({"sub": "user-1", "exp": future_exp()}));
        assert!(verify_token(SECRET, &token).is_none());
    }

    #[test]
    fn rejects_missing_sub() {
        let token = make_token(SECRET, json!({"email": "a@example.com", "exp": future_exp()}));
        assert!(verify_token(SECRET, &token).is_none());
    }

    #[test]
    fn creates_user_on_first_login() {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();

        let decoded = DecodedToken {
            sub: "sub-1".into(),
            email: Some("New@Example.com".into()),
            name: Some("New User".into()),
        };
        let user = ensure_user(&store, &decoded, &[]).unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.role, "reviewer");

        // Second request resolves to the same row.
        let again = ensure_user(&store, &decoded, &[]).unwrap();
        assert_eq!(again.id, user.id);
    }

    #[test]
    fn admin_email_gets_admin_role() {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();

        let decoded = DecodedToken {
            sub: "sub-admin".into(),
            email: Some("boss@example.com".into()),
            name: None,
        };
        let user = ensure_user(&store, &decoded, &["boss@example.com".into()]).unwrap();
        assert_eq!(user.role, "admin");
    }

    #[test]
    fn reattaches_by_email_when_subject_changes() {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        let existing = store
            .insert_user("old-sub", "same@example.com", None, "reviewer")
            .unwrap();

        let decoded = DecodedToken {
            sub: "new-sub".into(),
            email: Some("same@example.com".into()),
            name: None,
        };
        let user = ensure_user(&store, &decoded, &[]).unwrap();
        assert_eq!(user.id, existing.id);
    }

    #[test]
    fn missing_email_on_first_login_is_unauthorized() {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();

        let decoded = DecodedToken {
            sub: "sub-x".into(),
            email: None,
            name: None,
        };
        let err = ensure_user(&store, &decoded, &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Unauthorized(_))
        ));
    }
}
