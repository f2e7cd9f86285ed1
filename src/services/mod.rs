// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - API clients and the two daily pipelines.

pub mod commute;
pub mod garmin;
pub mod metric_writer;
pub mod row_locator;
pub mod sheets;
pub mod strava;
pub mod sync;

pub use commute::{CommuteTagger, TagReport};
pub use garmin::{GarminClient, HeartRateSource};
pub use metric_writer::MetricWriter;
pub use row_locator::{locate_row, RowLookup};
pub use sheets::{SheetsClient, Spreadsheet};
pub use strava::{ActivityFeed, StravaClient, StravaService};
pub use sync::{DailySync, SyncOutcome};

use anyhow::Context;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by one API client.
pub(crate) fn http_client(cookie_store: bool) -> crate::error::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .cookie_store(cookie_store)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed building HTTP client")?;
    Ok(client)
}
