//! OAuth session acquisition and refresh.

use std::io::{BufRead, BufReader, IsTerminal, Write};
use std::net::TcpListener;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::Client;
use log::info;

use crate::config::{Credentials, StoredToken, TokenStore};

const REDIRECT_PORT: u16 = 8317;
const REDIRECT_URI: &str = "http://localhost:8317/callback";
const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

/// An authorised Google Calendar session.
///
/// Holds the client credentials and the current tokens, and rewrites
/// `token.json` whenever a refresh happens.
pub struct GoogleSession {
    creds: Credentials,
    token: StoredToken,
    store: TokenStore,
}

impl GoogleSession {
    /// Load or establish an authorised session.
    ///
    /// With no stored token, the interactive consent flow runs only when
    /// stdin is a terminal; unattended runs fail instead of blocking on a
    /// prompt nobody will answer.
    pub async fn acquire(store: TokenStore) -> Result<Self> {
        let creds = store.load_credentials()?;

        let token = match store.load_token()? {
            Some(token) => token,
            None => {
                if !std::io::stdin().is_terminal() {
                    anyhow::bail!(
                        "No token at {} and no terminal to run the consent flow on.\n\
                        Run once interactively to authorise, or materialise token.json.",
                        store.token_path.display()
                    );
                }
                consent(&creds, &store).await?
            }
        };

        let mut session = Self {
            creds,
            token,
            store,
        };
        session.ensure_fresh().await?;
        Ok(session)
    }

    /// Client carrying the current tokens.
    pub fn client(&self) -> Client {
        Client::new(
            self.creds.client_id.clone(),
            self.creds.client_secret.clone(),
            REDIRECT_URI.to_string(),
            self.token.access_token.clone(),
            self.token.refresh_token.clone(),
        )
    }

    /// Refresh the access token when stale, rewriting token.json.
    pub async fn ensure_fresh(&mut self) -> Result<()> {
        if !self.token.needs_refresh() {
            return Ok(());
        }

        info!("Access token expired, refreshing");
        let client = self.client();
        let access_token = client
            .refresh_access_token()
            .await
            .context("Failed to refresh the access token")?;

        // Google typically doesn't return a new refresh_token on refresh
        let refresh_token = if access_token.refresh_token.is_empty() {
            self.token.refresh_token.clone()
        } else {
            access_token.refresh_token
        };

        self.token = StoredToken {
            access_token: access_token.access_token,
            refresh_token,
            expires_at: expires_at(access_token.expires_in),
        };
        self.store.save_token(&self.token)?;
        Ok(())
    }
}

fn expires_at(expires_in: i64) -> Option<DateTime<Utc>> {
    (expires_in > 0).then(|| Utc::now() + Duration::seconds(expires_in))
}

/// Interactive consent: open the provider's consent page, catch the
/// redirect on the loopback listener, exchange the code for tokens.
async fn consent(creds: &Credentials, store: &TokenStore) -> Result<StoredToken> {
    let mut client = Client::new(
        creds.client_id.clone(),
        creds.client_secret.clone(),
        REDIRECT_URI.to_string(),
        String::new(),
        String::new(),
    );

    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();
    let auth_url = client.user_consent_url(&scopes);

    eprintln!("\nOpen this URL in your browser to authorise calendar access:\n");
    eprintln!("{}\n", auth_url);

    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let (code, state) = wait_for_callback()?;

    eprintln!("\nReceived authorization code, exchanging for tokens...");

    let access_token = client
        .get_access_token(&code, &state)
        .await
        .context("Failed to exchange code for tokens")?;

    let token = StoredToken {
        access_token: access_token.access_token,
        refresh_token: access_token.refresh_token,
        expires_at: expires_at(access_token.expires_in),
    };
    store.save_token(&token)?;

    eprintln!("Authorisation successful!");
    Ok(token)
}

/// Start a local HTTP server to receive the OAuth callback
fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", REDIRECT_PORT))
        .with_context(|| format!("Failed to bind to port {}", REDIRECT_PORT))?;

    eprintln!("Waiting for OAuth callback on port {}...", REDIRECT_PORT);

    let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    // Parse the request to get the code and state
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .context("Invalid request")?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let code = url
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
        .context("No code in callback")?;

    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .context("No state in callback")?;

    // Send a response to the browser
    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>Authorisation successful!</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    stream.write_all(response.as_bytes())?;
    stream.flush()?;

    Ok((code, state))
}
