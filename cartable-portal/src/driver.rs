//! SSO login and timetable navigation.
//!
//! Every DOM lookup is an ordered fallback probe over the locale's
//! selector lists: the first selector matching at least one element wins
//! and the rest are never evaluated. A missed probe degrades to an empty
//! week rather than aborting; only a failed login or an unreachable
//! timetable application is fatal.

use std::time::Duration;

use anyhow::{Context, Result};
use cartable_core::error::SyncError;
use cartable_core::locale::Locale;
use fantoccini::elements::Element;
use fantoccini::{Client, Locator};
use log::{debug, info, warn};
use tokio::time::{Instant, sleep};

/// WebDriver code point for the Enter key.
const ENTER: &str = "\u{e007}";

const READY_POLL: Duration = Duration::from_millis(250);
const READY_TIMEOUT: Duration = Duration::from_secs(20);

/// Pause after navigation settles, for widgets that render after load.
const SETTLE: Duration = Duration::from_millis(1200);

/// A logged-in browser pointed at the timetable application.
pub struct PortalDriver {
    client: Client,
    locale: Locale,
}

impl PortalDriver {
    pub fn new(client: Client, locale: Locale) -> Self {
        Self { client, locale }
    }

    /// Navigate to the SSO entry point and authenticate.
    pub async fn login(&self, entry_url: &str, user: &str, password: &str) -> Result<()> {
        self.client
            .goto(entry_url)
            .await
            .with_context(|| format!("Failed to open SSO portal at {entry_url}"))?;
        self.wait_for_quiescence().await?;

        let username_field = self.first_match(&self.locale.selectors.username).await?;
        let password_field = self.first_match(&self.locale.selectors.password).await?;

        if username_field.is_none() && password_field.is_none() {
            return Err(SyncError::Authentication(
                "no credential fields found on the SSO page".to_string(),
            )
            .into());
        }

        if let Some(field) = &username_field {
            field.send_keys(user).await.context("Failed to fill username")?;
        }
        if let Some(field) = &password_field {
            field
                .send_keys(password)
                .await
                .context("Failed to fill password")?;
        }

        match self.first_match(&self.locale.selectors.submit).await? {
            Some(submit) => submit.click().await.context("Failed to submit the login form")?,
            None => {
                if let Some(field) = password_field.as_ref().or(username_field.as_ref()) {
                    field
                        .send_keys(ENTER)
                        .await
                        .context("Failed to submit the login form with Enter")?;
                }
            }
        }

        self.wait_for_quiescence().await?;

        // The portal keeps the form on screen when credentials are rejected.
        if self
            .first_match(&self.locale.selectors.password)
            .await?
            .is_some()
        {
            return Err(
                SyncError::Authentication("credentials rejected by the SSO portal".to_string())
                    .into(),
            );
        }

        info!("Logged in at {entry_url}");
        Ok(())
    }

    /// Cross from the SSO portal into the timetable application.
    ///
    /// With a direct URL configured, navigates straight there. Otherwise
    /// probes for the application link and clicks it, adopting the new tab
    /// when the portal opens one.
    pub async fn enter_timetable(&self, direct_url: Option<&str>) -> Result<()> {
        if let Some(url) = direct_url {
            self.client
                .goto(url)
                .await
                .with_context(|| format!("Failed to open the timetable application at {url}"))?;
            self.wait_for_quiescence().await?;
            return Ok(());
        }

        let Some(link) = self
            .first_match(&self.locale.selectors.timetable_link)
            .await?
        else {
            return Err(SyncError::Navigation(
                "no timetable application link found on the portal".to_string(),
            )
            .into());
        };

        let windows_before = self.client.windows().await?.len();
        link.click()
            .await
            .context("Failed to open the timetable application")?;
        sleep(SETTLE).await;
        self.adopt_popup(windows_before).await?;
        self.wait_for_quiescence().await?;
        Ok(())
    }

    /// Open the weekly view behind the localised "school life" tab.
    ///
    /// A missing tab is not fatal: some deployments land on the week view
    /// directly.
    pub async fn open_week_view(&self) -> Result<()> {
        match self
            .first_match(&self.locale.selectors.school_life_tab)
            .await?
        {
            Some(tab) => {
                tab.click().await.context("Failed to open the school life tab")?;
            }
            None => warn!("School life tab not found, assuming the week view is already shown"),
        }
        self.wait_for_quiescence().await?;
        sleep(SETTLE).await;
        Ok(())
    }

    /// Advance the displayed week. Returns whether a control was clicked;
    /// the caller stops walking the window when it was not.
    pub async fn next_week(&self) -> Result<bool> {
        let Some(control) = self.first_match(&self.locale.selectors.next_week).await? else {
            warn!("No next-week control found");
            return Ok(false);
        };
        control
            .click()
            .await
            .context("Failed to click the next-week control")?;
        self.wait_for_quiescence().await?;
        sleep(SETTLE).await;
        Ok(true)
    }

    /// The timetable tile may open in a new tab; follow it there.
    async fn adopt_popup(&self, windows_before: usize) -> Result<()> {
        let windows = self.client.windows().await?;
        if windows.len() > windows_before {
            if let Some(handle) = windows.last() {
                self.client.switch_to_window(handle.clone()).await?;
                debug!("Adopted popup window");
            }
        }
        Ok(())
    }

    /// First selector in the list matching at least one element wins.
    pub(crate) async fn first_match(&self, selectors: &[String]) -> Result<Option<Element>> {
        for selector in selectors {
            if let Some(element) = self.probe(selector).await? {
                debug!("Probe hit: {selector}");
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    /// First element matching one selector, if any.
    pub(crate) async fn probe(&self, selector: &str) -> Result<Option<Element>> {
        let locator = if selector.starts_with("//") {
            Locator::XPath(selector)
        } else {
            Locator::Css(selector)
        };
        let found = self
            .client
            .find_all(locator)
            .await
            .with_context(|| format!("DOM query failed for {selector}"))?;
        Ok(found.into_iter().next())
    }

    /// Wait until the document settles, then pause for late widgets.
    ///
    /// Times out silently: a slow page yields whatever is rendered rather
    /// than aborting the run.
    pub(crate) async fn wait_for_quiescence(&self) -> Result<()> {
        let deadline = Instant::now() + READY_TIMEOUT;
        loop {
            let state = self
                .client
                .execute("return document.readyState;", vec![])
                .await
                .context("Failed to query document readyState")?;
            if state.as_str() == Some("complete") {
                break;
            }
            if Instant::now() >= deadline {
                warn!("Page did not settle within {}s", READY_TIMEOUT.as_secs());
                break;
            }
            sleep(READY_POLL).await;
        }
        sleep(SETTLE).await;
        Ok(())
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Terminate the browser session.
    pub async fn close(self) -> Result<()> {
        self.client
            .close()
            .await
            .context("Failed to close the browser session")
    }
}
