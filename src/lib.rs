// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! fitness-sheet-sync: daily fitness bookkeeping.
//!
//! Copies yesterday's resting heart rate (Garmin Connect) and cycling
//! distance (Strava) into a date-indexed Google spreadsheet, and tags
//! yesterday's Strava rides as commutes.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured JSON logging.
///
/// `RUST_LOG` overrides the default of debug for this crate and info for
/// everything else.
pub fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fitness_sheet_sync=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
