// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tag yesterday's Strava rides as commutes with the configured bike.
//!
//! Rides already flagged as commutes are left alone, so the tool can run
//! any number of times a day.

use fitness_sheet_sync::{
    config::CommuteConfig,
    error::Result,
    services::{commute::TagOptions, CommuteTagger, StravaService, TagReport},
    time_utils::{past_days, Clock, SystemClock},
};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    fitness_sheet_sync::init_logging();

    match run().await {
        Ok(report) if report.is_clean() => {
            tracing::info!(
                considered = report.considered,
                tagged = report.tagged.len(),
                skipped = report.skipped.len(),
                "Done"
            );
            ExitCode::SUCCESS
        }
        Ok(report) => {
            tracing::error!(
                tagged = report.tagged.len(),
                failed = ?report.failed,
                "Some activities could not be tagged"
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Commute tagging failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<TagReport> {
    // Load configuration from environment
    let config = CommuteConfig::from_env()?;

    let clock = SystemClock;
    let days = past_days(&clock, config.lookback_days);

    tracing::info!(
        gear_id = %config.gear_id,
        device = config.device_name.as_deref().unwrap_or("<any>"),
        days = days.len(),
        dry_run = config.dry_run,
        "Starting commute tagging"
    );

    let strava = StravaService::connect(&config.strava).await?;
    CommuteTagger::new(&strava, TagOptions::from(&config))
        .run(&days, clock.zone())
        .await
}
