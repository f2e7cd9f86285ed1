// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily metric sync.
//!
//! Handles the core workflow:
//! 1. Fetch the day's resting heart rate (and cycling load if enabled)
//! 2. Render the date the way the sheet displays it
//! 3. Find the matching row in the date column
//! 4. Write the metrics in one batch

use crate::config::SheetsConfig;
use crate::error::Result;
use crate::models::{Column, DateKey, DateLocale, MetricRecord};
use crate::services::garmin::HeartRateSource;
use crate::services::metric_writer::MetricWriter;
use crate::services::row_locator::{locate_row, RowLookup};
use crate::services::sheets::Spreadsheet;
use crate::services::strava::ActivityFeed;
use crate::time_utils::day_bounds;
use chrono::TimeZone;

/// Where things live in the sheet.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    pub date_column: Column,
    pub hr_column: Column,
    pub load_column: Option<Column>,
    pub date_locale: DateLocale,
}

impl From<&SheetsConfig> for SheetLayout {
    fn from(config: &SheetsConfig) -> Self {
        Self {
            date_column: config.date_column,
            hr_column: config.hr_column,
            load_column: config.load_column,
            date_locale: config.date_locale,
        }
    }
}

/// How a sync run ended. Everything except an `Err` from [`DailySync::run`]
/// is a normal exit.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Written { row: u32, cells: usize },
    DryRun { row: u32, cells: usize },
    /// No metric available for the day
    NothingToWrite,
    RowNotFound { rendered: String },
    AmbiguousRow { rendered: String, rows: Vec<u32> },
}

/// One day's metric sync.
pub struct DailySync<'a> {
    sheet: &'a dyn Spreadsheet,
    heart_rate: &'a dyn HeartRateSource,
    rides: Option<&'a dyn ActivityFeed>,
    layout: SheetLayout,
    dry_run: bool,
}

impl<'a> DailySync<'a> {
    pub fn new(
        sheet: &'a dyn Spreadsheet,
        heart_rate: &'a dyn HeartRateSource,
        layout: SheetLayout,
    ) -> Self {
        Self {
            sheet,
            heart_rate,
            rides: None,
            layout,
            dry_run: false,
        }
    }

    /// Also compute cycling load from this feed.
    pub fn with_rides(mut self, rides: &'a dyn ActivityFeed) -> Self {
        self.rides = Some(rides);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Gather the day's metrics.
    ///
    /// Heart rate errors are fatal. Cycling load is secondary: a failure is
    /// logged unless it is an authentication error, and the load is left out.
    pub async fn collect<Tz: TimeZone>(&self, date: DateKey, tz: Tz) -> Result<MetricRecord> {
        tracing::info!(date = %date, "Fetching resting heart rate");
        let resting_heart_rate = self.heart_rate.resting_heart_rate(date.date()).await?;
        match resting_heart_rate {
            Some(bpm) => tracing::info!(date = %date, bpm, "Resting heart rate"),
            None => tracing::warn!(date = %date, "No resting heart rate data for this date"),
        }

        let cycling_load = match (self.rides, self.layout.load_column) {
            (Some(feed), Some(_)) => match daily_ride_km(feed, date, &tz).await {
                Ok(km) => {
                    tracing::info!(date = %date, km, "Cycling load");
                    Some(km)
                }
                Err(e) if e.is_auth_error() => return Err(e),
                Err(e) => {
                    tracing::error!(date = %date, error = %e, "Failed to compute cycling load");
                    None
                }
            },
            _ => None,
        };

        Ok(MetricRecord {
            date,
            resting_heart_rate,
            cycling_load,
        })
    }

    /// Collect and write the metrics for `date`, a calendar day in `tz`.
    pub async fn run<Tz: TimeZone>(&self, date: DateKey, tz: Tz) -> Result<SyncOutcome> {
        let record = self.collect(date, tz).await?;
        self.write(&record).await
    }

    /// Write an already collected record into its row.
    pub async fn write(&self, record: &MetricRecord) -> Result<SyncOutcome> {
        let updates = record.cell_updates(self.layout.hr_column, self.layout.load_column);
        if updates.is_empty() {
            tracing::warn!(date = %record.date, "No metrics to write");
            return Ok(SyncOutcome::NothingToWrite);
        }

        let column = self.sheet.read_column(self.layout.date_column).await?;
        let rendered = record.date.render(self.layout.date_locale);

        let row = match locate_row(&column, &rendered) {
            RowLookup::Found(row) => row,
            RowLookup::NotFound => {
                tracing::warn!(
                    date = %record.date,
                    rendered = %rendered,
                    rows = column.len(),
                    "No row found for date, skipping write"
                );
                return Ok(SyncOutcome::RowNotFound { rendered });
            }
            RowLookup::Ambiguous(rows) => {
                tracing::warn!(
                    date = %record.date,
                    rendered = %rendered,
                    rows = ?rows,
                    "Several rows match date, skipping write"
                );
                return Ok(SyncOutcome::AmbiguousRow { rendered, rows });
            }
        };

        tracing::info!(date = %record.date, row, "Found date row");

        if self.dry_run {
            tracing::info!(row, updates = ?updates, "Dry run: not writing");
            return Ok(SyncOutcome::DryRun {
                row,
                cells: updates.len(),
            });
        }

        MetricWriter::new(self.sheet).write(row, &updates).await?;
        Ok(SyncOutcome::Written {
            row,
            cells: updates.len(),
        })
    }
}

/// Total ride distance of a calendar day in `tz`, in kilometres with one
/// decimal.
pub async fn daily_ride_km<Tz: TimeZone>(
    feed: &dyn ActivityFeed,
    date: DateKey,
    tz: &Tz,
) -> Result<f64> {
    let (after, before) = day_bounds(date.date(), tz);
    let meters: f64 = feed
        .activities_between(after, before)
        .await?
        .iter()
        .filter(|a| a.is_ride())
        .map(|a| a.distance_meters)
        .sum();

    Ok((meters / 100.0).round() / 10.0)
}
