// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync yesterday's resting heart rate into the tracking spreadsheet.
//!
//! Fetches the value from Garmin Connect, finds the row whose date cell
//! matches yesterday, and writes it (plus cycling distance from Strava when
//! configured).

use fitness_sheet_sync::{
    config::SyncConfig,
    error::Result,
    services::{
        garmin::GarminEndpoints, sync::SheetLayout, DailySync, GarminClient, SheetsClient,
        StravaService, SyncOutcome,
    },
    time_utils::{yesterday_with_zone, SystemClock},
};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    fitness_sheet_sync::init_logging();

    match run().await {
        Ok(outcome) => {
            tracing::info!(outcome = ?outcome, "Sync finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<SyncOutcome> {
    // Load configuration from environment
    let config = SyncConfig::from_env()?;

    let (date, zone) = yesterday_with_zone(&SystemClock);
    tracing::info!(date = %date, dry_run = config.dry_run, "Starting resting heart rate sync");

    let garmin = GarminClient::login(&config.garmin, &GarminEndpoints::default()).await?;

    tracing::info!("Connecting to Google Sheets");
    let sheets = SheetsClient::connect(&config.sheets).await?;

    let strava = match &config.strava {
        Some(strava_config) if config.sheets.load_column.is_some() => {
            Some(StravaService::connect(strava_config).await?)
        }
        _ => None,
    };

    let mut sync = DailySync::new(&sheets, &garmin, SheetLayout::from(&config.sheets))
        .dry_run(config.dry_run);
    if let Some(strava) = &strava {
        sync = sync.with_rides(strava);
    }

    sync.run(date, zone).await
}
