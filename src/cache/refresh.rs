//! The fetch-parse-store refresh cycle and the periodic task driving it.

use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{fetch_error, source_error, AppResult};
use crate::ics::{parse_ics, Event};

use super::CacheHandle;

/// A healthy source must contain this marker; anything else is an error
/// page or an empty body, not a calendar.
const VCALENDAR_MARKER: &str = "BEGIN:VCALENDAR";

/// Run one refresh cycle. Failures are recorded in the snapshot and never
/// propagate; the previously stored events keep being served and the next
/// tick retries.
pub async fn refresh_once(cache: &CacheHandle, client: &Client, config: &Config) {
    cache.record_attempt(Utc::now()).await;

    match fetch_events(client, config).await {
        Ok(events) => {
            debug!(events = events.len(), "Calendar cache refreshed");
            cache.store_success(events, Utc::now()).await;
        }
        Err(e) => {
            warn!("Calendar refresh failed: {}", e);
            cache.store_failure(e.to_string()).await;
        }
    }
}

/// Fetch the feed, validate it, and parse it down to the upcoming events
/// worth caching.
async fn fetch_events(client: &Client, config: &Config) -> AppResult<Vec<Event>> {
    let response = client.get(config.ics_url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(&format!(
            "Calendar fetch failed with {}",
            status.as_u16()
        )));
    }

    let text = response.text().await?;
    if !text.contains(VCALENDAR_MARKER) {
        return Err(source_error("Calendar source did not return VCALENDAR data"));
    }

    let outcome = parse_ics(&text, config.timezone);
    if outcome.skipped > 0 {
        debug!(skipped = outcome.skipped, "Dropped malformed event blocks");
    }

    Ok(select_upcoming(outcome.events, Utc::now(), config.max_events))
}

/// Keep events starting at or after `now`, ascending by start time, at
/// most `max`.
pub fn select_upcoming(mut events: Vec<Event>, now: DateTime<Utc>, max: usize) -> Vec<Event> {
    events.retain(|event| event.date >= now);
    events.sort_by_key(|event| event.date);
    events.truncate(max);
    events
}

/// Spawn the periodic refresh task. A single task drives every cycle, so
/// two cycles can never overlap; ticks that fire while a slow cycle is
/// still running are skipped.
pub fn spawn_refresh_loop(
    cache: CacheHandle,
    client: Client,
    config: Arc<Config>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(config.refresh_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The startup refresh already ran; swallow the immediate first tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            refresh_once(&cache, &client, &config).await;
        }
    })
}
