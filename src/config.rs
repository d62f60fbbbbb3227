use crate::error::{config_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use url::Url;

/// Default public export URL for the calendar feed
pub const DEFAULT_ICS_URL: &str =
    "https://calendar.google.com/calendar/ical/libertyloft%40proton.me/public/basic.ics";

/// Main configuration structure for the cache service
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP query surface listens on
    pub port: u16,
    /// Upstream ICS feed to fetch
    pub ics_url: Url,
    /// Delay between refresh cycles
    pub refresh_interval_ms: u64,
    /// Maximum number of upcoming events retained in the cache
    pub max_events: usize,
    /// Timeout applied to each upstream fetch
    pub fetch_timeout_secs: u64,
    /// Zone used for DTSTART values without a UTC marker.
    /// None means the server's local zone.
    pub timezone: Option<Tz>,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    /// matching the public deployment.
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let port = env_or("CALENDAR_PORT", 3001)?;
        let refresh_interval_ms = env_or("CALENDAR_PREFETCH_INTERVAL_MS", 10_000)?;
        let max_events = env_or("CALENDAR_MAX_EVENTS", 6)?;
        let fetch_timeout_secs = env_or("CALENDAR_FETCH_TIMEOUT_SECS", 15)?;

        if refresh_interval_ms == 0 {
            return Err(config_error("CALENDAR_PREFETCH_INTERVAL_MS must be non-zero"));
        }

        let ics_url = env::var("CALENDAR_ICS_URL").unwrap_or_else(|_| DEFAULT_ICS_URL.to_string());
        let ics_url = Url::parse(&ics_url)
            .map_err(|e| config_error(&format!("Invalid CALENDAR_ICS_URL: {}", e)))?;

        let timezone = match env::var("CALENDAR_TIMEZONE") {
            Ok(name) => Some(
                name.parse::<Tz>()
                    .map_err(|_| config_error(&format!("Unknown CALENDAR_TIMEZONE: {}", name)))?,
            ),
            Err(_) => None,
        };

        Ok(Config {
            port,
            ics_url,
            refresh_interval_ms,
            max_events,
            fetch_timeout_secs,
            timezone,
        })
    }
}

/// Read an environment variable, falling back to a default when unset
fn env_or<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| config_error(&format!("Invalid {} format", name))),
        Err(_) => Ok(default),
    }
}
