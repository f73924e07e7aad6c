//! Credential and token files.
//!
//! Two JSON files, conventionally materialised by the bootstrap step from
//! environment variables:
//!   credentials.json — OAuth client id/secret
//!   token.json       — access/refresh tokens, rewritten on every refresh

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// OAuth client credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// The wrapper Google's console serves when downloading app credentials.
#[derive(Debug, Deserialize)]
struct ConsoleCredentials {
    installed: Option<Credentials>,
    web: Option<Credentials>,
}

/// Stored OAuth tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Refresh slightly before the deadline.
const REFRESH_MARGIN_SECS: i64 = 60;

impl StoredToken {
    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() + Duration::seconds(REFRESH_MARGIN_SECS) >= at,
            None => false,
        }
    }
}

/// Locations of the two secret files.
#[derive(Debug, Clone)]
pub struct TokenStore {
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
}

impl TokenStore {
    pub fn new(credentials_path: PathBuf, token_path: PathBuf) -> Self {
        Self {
            credentials_path,
            token_path,
        }
    }

    pub fn load_credentials(&self) -> Result<Credentials> {
        let path = &self.credentials_path;

        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found at {}.\n\n\
                Create it with:\n\n\
                {{\n  \
                  \"client_id\": \"your-client-id.apps.googleusercontent.com\",\n  \
                  \"client_secret\": \"your-client-secret\"\n\
                }}\n\n\
                See https://console.cloud.google.com/apis/credentials for setup.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        parse_credentials(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))
    }

    /// `Ok(None)` when no token file exists yet.
    pub fn load_token(&self) -> Result<Option<StoredToken>> {
        let path = &self.token_path;
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token from {}", path.display()))?;

        let token: StoredToken = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse token from {}", path.display()))?;

        Ok(Some(token))
    }

    pub fn save_token(&self, token: &StoredToken) -> Result<()> {
        let path = &self.token_path;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create token directory at {}", parent.display())
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(token).context("Failed to serialize token")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write token to {}", path.display()))?;

        Ok(())
    }
}

/// Accepts both the flat form and Google's console-download wrapper.
fn parse_credentials(contents: &str) -> Result<Credentials> {
    if let Ok(flat) = serde_json::from_str::<Credentials>(contents) {
        return Ok(flat);
    }

    let console: ConsoleCredentials = serde_json::from_str(contents)
        .context("expected client_id/client_secret, or an \"installed\" section")?;
    console
        .installed
        .or(console.web)
        .context("credentials file carries neither \"installed\" nor \"web\" section")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_credentials() {
        let creds = parse_credentials(
            r#"{ "client_id": "abc.apps.googleusercontent.com", "client_secret": "s3cret" }"#,
        )
        .expect("should parse");
        assert_eq!(creds.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "s3cret");
    }

    #[test]
    fn test_parse_console_download_form() {
        let creds = parse_credentials(
            r#"{ "installed": { "client_id": "abc", "client_secret": "s", "redirect_uris": ["http://localhost"] } }"#,
        )
        .expect("should parse");
        assert_eq!(creds.client_id, "abc");
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_credentials(r#"{ "nope": true }"#).is_err());
    }

    #[test]
    fn test_token_refresh_deadline() {
        let fresh = StoredToken {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        assert!(!fresh.needs_refresh());

        let stale = StoredToken {
            expires_at: Some(Utc::now() - Duration::minutes(1)),
            ..fresh.clone()
        };
        assert!(stale.needs_refresh());

        let unbounded = StoredToken {
            expires_at: None,
            ..fresh
        };
        assert!(!unbounded.needs_refresh());
    }
}
