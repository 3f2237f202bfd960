// ABOUTME: Session guard with credential discovery precedence chain
// ABOUTME: CLI flag → session file → env var; absence is terminal for the run

use crate::{Error, Result};
use chrono::Utc;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

pub const LOGIN_ROUTE: &str = "/login";
pub const TOKEN_ENV: &str = "LITTLE_PLANS_ACCESS_TOKEN";
pub const USER_ENV: &str = "LITTLE_PLANS_USER_ID";

/// Credentials found on this machine. `user_id` may be missing when only a
/// bearer token was supplied; it is then looked up from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub user_id: Option<String>,
}

/// An authenticated session: everything past the guard runs with one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

#[derive(Deserialize)]
struct StoredSession {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<StoredUser>,
}

#[derive(Deserialize)]
struct StoredUser {
    id: String,
}

pub fn resolve_credentials(
    cli_token: Option<String>,
    cli_user_id: Option<String>,
    session_file: Option<&Path>,
) -> Result<Option<Credentials>> {
    // 1. CLI flag
    if let Some(token) = cli_token {
        return Ok(Some(Credentials {
            access_token: token,
            user_id: cli_user_id,
        }));
    }

    // 2. Stored session
    if let Some(path) = session_file {
        if let Some(creds) = parse_session_file(path)? {
            return Ok(Some(creds));
        }
    }

    // 3. Environment variable
    if let Ok(token) = env::var(TOKEN_ENV) {
        return Ok(Some(Credentials {
            access_token: token,
            user_id: env::var(USER_ENV).ok().or(cli_user_id),
        }));
    }

    Ok(None)
}

fn parse_session_file(path: &Path) -> Result<Option<Credentials>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let stored: StoredSession = serde_json::from_str(&content)?;

    if let Some(expires_at) = stored.expires_at {
        if expires_at <= Utc::now().timestamp() {
            tracing::debug!(path = %path.display(), "stored session has expired");
            return Ok(None);
        }
    }

    Ok(Some(Credentials {
        access_token: stored.access_token,
        user_id: stored.user.map(|u| u.id),
    }))
}

/// Gate for everything else: without a session the run stops here and the
/// user is pointed at the login route.
pub fn require_session(session: Option<Session>) -> Result<Session> {
    session.ok_or_else(|| {
        Error::Auth(format!("no active session; sign in at {}", LOGIN_ROUTE))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_credentials_cli_precedence() {
        let creds = resolve_credentials(Some("cli_token".into()), Some("u1".into()), None)
            .unwrap()
            .unwrap();
        assert_eq!(creds.access_token, "cli_token");
        assert_eq!(creds.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_parse_session_file_valid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        let expires = Utc::now().timestamp() + 3600;
        let content = format!(
            r#"{{"access_token": "abc", "expires_at": {}, "user": {{"id": "user-1"}}}}"#,
            expires
        );
        fs::write(&path, content).unwrap();

        let creds = parse_session_file(&path).unwrap().unwrap();
        assert_eq!(creds.access_token, "abc");
        assert_eq!(creds.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_parse_session_file_expired() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        fs::write(
            &path,
            r#"{"access_token": "abc", "expires_at": 1000, "user": {"id": "user-1"}}"#,
        )
        .unwrap();

        assert!(parse_session_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_parse_session_file_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.json");
        assert!(parse_session_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_session_file_without_user() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        fs::write(&path, r#"{"access_token": "abc"}"#).unwrap();

        let creds = resolve_credentials(None, None, Some(&path)).unwrap().unwrap();
        assert_eq!(creds.access_token, "abc");
        assert!(creds.user_id.is_none());
    }

    #[test]
    fn test_require_session_missing_is_auth_error() {
        let err = require_session(None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("/login"));
    }

    #[test]
    fn test_require_session_present() {
        let session = Session {
            access_token: "t".into(),
            user_id: "u".into(),
        };
        assert_eq!(require_session(Some(session.clone())).unwrap(), session);
    }
}
