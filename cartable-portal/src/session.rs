//! WebDriver session management.

use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;

/// Options for the browser session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// WebDriver endpoint, e.g. chromedriver's default.
    pub webdriver_url: String,
    /// Show the browser window instead of running headless.
    pub headful: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headful: false,
        }
    }
}

/// Open a browser session against the configured WebDriver endpoint.
pub async fn connect(options: &SessionOptions) -> Result<Client> {
    let mut args = vec![
        "--disable-gpu".to_string(),
        "--window-size=1440,1000".to_string(),
    ];
    if !options.headful {
        args.insert(0, "--headless=new".to_string());
    }

    let mut capabilities = serde_json::map::Map::new();
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

    ClientBuilder::native()
        .capabilities(capabilities)
        .connect(&options.webdriver_url)
        .await
        .with_context(|| {
            format!(
                "Failed to reach WebDriver at {} (is chromedriver running?)",
                options.webdriver_url
            )
        })
}
