//! cartable — sync a pupil's school timetable into the family calendar.
//!
//! One run: log into the SSO portal, cross into the timetable application,
//! walk the configured window week by week, and upsert one tagged calendar
//! event per lesson. Repeated runs converge on the same event set.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cartable_cli::pipeline::{self, SyncOptions};
use cartable_core::locale::Locale;
use cartable_portal::driver::PortalDriver;
use cartable_portal::session::{self, SessionOptions};
use cartable_provider_google::auth::GoogleSession;
use cartable_provider_google::calendar::GoogleCalendar;
use cartable_provider_google::config::TokenStore;
use chrono_tz::Tz;
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cartable")]
#[command(about = "Sync the school timetable into the shared family calendar", version)]
struct Args {
    /// SSO portal entry page.
    #[arg(long, env = "CARTABLE_SSO_URL")]
    sso_url: String,

    /// Skip the portal tile and open the timetable application directly.
    #[arg(long, env = "CARTABLE_TIMETABLE_URL")]
    timetable_url: Option<String>,

    /// SSO account name.
    #[arg(long, env = "CARTABLE_SSO_USER")]
    sso_user: String,

    /// SSO account password.
    #[arg(long, env = "CARTABLE_SSO_PASSWORD", hide_env_values = true)]
    sso_password: String,

    /// Destination calendar id.
    #[arg(long, env = "CARTABLE_CALENDAR_ID")]
    calendar_id: String,

    /// Number of weeks to sync, starting at the currently displayed one.
    #[arg(long, env = "CARTABLE_WEEKS", default_value_t = 2)]
    weeks: u32,

    /// Show the browser window instead of running headless.
    #[arg(long, env = "CARTABLE_HEADFUL")]
    headful: bool,

    /// Timezone stamped on every event.
    #[arg(long, env = "CARTABLE_TZ", default_value = "Europe/Paris")]
    timezone: String,

    /// WebDriver endpoint started by the bootstrap step.
    #[arg(long, env = "CARTABLE_WEBDRIVER_URL", default_value = "http://localhost:9515")]
    webdriver_url: String,

    /// OAuth client credentials file.
    #[arg(long, env = "CARTABLE_CREDENTIALS", default_value = "credentials.json")]
    credentials: PathBuf,

    /// OAuth token file, rewritten on refresh.
    #[arg(long, env = "CARTABLE_TOKEN", default_value = "token.json")]
    token: PathBuf,

    /// Log what would be written without touching the calendar.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    if args.weeks == 0 {
        anyhow::bail!("--weeks must be a positive integer");
    }
    let timezone: Tz = args
        .timezone
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", args.timezone, e))?;

    let store = TokenStore::new(args.credentials.clone(), args.token.clone());
    let calendar_session = GoogleSession::acquire(store)
        .await
        .context("Could not authorise against the calendar service")?;
    let mut calendar = GoogleCalendar::new(calendar_session, &args.calendar_id);

    let locale = Locale::french();
    let browser = session::connect(&SessionOptions {
        webdriver_url: args.webdriver_url.clone(),
        headful: args.headful,
    })
    .await?;
    let mut portal = PortalDriver::new(browser, locale.clone());

    let navigated = navigate(&portal, &args).await;
    let result = match navigated {
        Ok(()) => {
            let options = SyncOptions {
                weeks_to_fetch: args.weeks,
                timezone,
                dry_run: args.dry_run,
            };
            pipeline::run(&mut portal, &mut calendar, &locale, &options).await
        }
        Err(e) => Err(e),
    };

    // Close the browser whatever happened to the pipeline.
    if let Err(e) = portal.close().await {
        warn!("Browser session did not close cleanly: {e:#}");
    }

    let stats = result?;
    info!(
        "Sync complete: {} created, {} updated, {} skipped",
        stats.created, stats.updated, stats.skipped
    );
    Ok(())
}

/// Login and navigation up to the week view.
async fn navigate(portal: &PortalDriver, args: &Args) -> Result<()> {
    portal
        .login(&args.sso_url, &args.sso_user, &args.sso_password)
        .await?;
    portal.enter_timetable(args.timetable_url.as_deref()).await?;
    portal.open_week_view().await?;
    Ok(())
}
