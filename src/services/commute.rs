// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Commute tagging.
//!
//! Workflow per day:
//! 1. List the day's activities (local-time window)
//! 2. Keep rides that are not yet commutes
//! 3. Optionally check the recording device on the detailed activity
//! 4. Flag each remaining ride as a commute with the configured bike
//!
//! Each activity is handled independently: a failed update is recorded and
//! the next activity is still processed. Only authentication failures stop
//! the run.

use crate::config::CommuteConfig;
use crate::error::Result;
use crate::models::{Activity, DateKey};
use crate::services::strava::ActivityFeed;
use crate::time_utils::{day_bounds, format_utc_rfc3339};
use chrono::{DateTime, TimeZone, Utc};

/// What the tagger applies and how it filters.
#[derive(Debug, Clone)]
pub struct TagOptions {
    /// Gear to attach to tagged rides
    pub gear_id: String,
    /// Only tag rides recorded by this device
    pub device_name: Option<String>,
    /// Also tag indoor/trainer rides
    pub include_trainer: bool,
    /// Log what would be tagged without updating anything
    pub dry_run: bool,
}

impl From<&CommuteConfig> for TagOptions {
    fn from(config: &CommuteConfig) -> Self {
        Self {
            gear_id: config.gear_id.clone(),
            device_name: config.device_name.clone(),
            include_trainer: config.include_trainer,
            dry_run: config.dry_run,
        }
    }
}

/// Outcome of a tagging run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReport {
    /// Activities seen in the window(s)
    pub considered: usize,
    /// Activities flagged as commutes
    pub tagged: Vec<u64>,
    /// Candidates left alone (device mismatch or dry run)
    pub skipped: Vec<u64>,
    /// Candidates whose detail fetch or update failed
    pub failed: Vec<u64>,
}

impl TagReport {
    pub fn merge(&mut self, other: TagReport) {
        self.considered += other.considered;
        self.tagged.extend(other.tagged);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    /// No activity failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Whether an activity should become a commute.
pub fn is_candidate(
    activity: &Activity,
    after: DateTime<Utc>,
    before: DateTime<Utc>,
    include_trainer: bool,
) -> bool {
    activity.is_ride()
        && !activity.commute
        && (include_trainer || !activity.trainer)
        && activity.start_date >= after
        && activity.start_date < before
}

/// Tags a day's rides as commutes.
pub struct CommuteTagger<'a, F: ActivityFeed + ?Sized> {
    feed: &'a F,
    options: TagOptions,
}

impl<'a, F: ActivityFeed + ?Sized> CommuteTagger<'a, F> {
    pub fn new(feed: &'a F, options: TagOptions) -> Self {
        Self { feed, options }
    }

    /// Tag every listed day, oldest first.
    pub async fn run<Tz: TimeZone>(&self, days: &[DateKey], tz: Tz) -> Result<TagReport> {
        let mut report = TagReport::default();
        for day in days {
            report.merge(self.tag_day(*day, tz.clone()).await?);
        }
        Ok(report)
    }

    /// Tag the rides of one calendar day in `tz`.
    pub async fn tag_day<Tz: TimeZone>(&self, day: DateKey, tz: Tz) -> Result<TagReport> {
        let (after, before) = day_bounds(day.date(), &tz);
        tracing::info!(
            day = %day,
            after = %format_utc_rfc3339(after),
            before = %format_utc_rfc3339(before),
            "Looking for rides to tag as commutes"
        );

        let activities = self.feed.activities_between(after, before).await?;
        let mut report = TagReport {
            considered: activities.len(),
            ..TagReport::default()
        };

        let candidates: Vec<&Activity> = activities
            .iter()
            .filter(|a| is_candidate(a, after, before, self.options.include_trainer))
            .collect();

        if candidates.is_empty() {
            tracing::info!(day = %day, activities = activities.len(), "No untagged rides");
            return Ok(report);
        }

        for activity in candidates {
            match self.tag_one(activity).await {
                Ok(true) => report.tagged.push(activity.id),
                Ok(false) => report.skipped.push(activity.id),
                Err(e) if e.is_auth_error() => return Err(e),
                Err(e) => {
                    tracing::error!(
                        activity_id = activity.id,
                        name = %activity.name,
                        error = %e,
                        "Failed to tag activity as commute"
                    );
                    report.failed.push(activity.id);
                }
            }
        }

        tracing::info!(
            day = %day,
            tagged = report.tagged.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Commute tagging finished for day"
        );
        Ok(report)
    }

    /// Returns `Ok(true)` if the activity was updated, `Ok(false)` if it was
    /// deliberately left alone.
    async fn tag_one(&self, activity: &Activity) -> Result<bool> {
        if let Some(wanted) = &self.options.device_name {
            let detail = self.feed.activity_detail(activity.id).await?;
            if detail.device_name.as_deref() != Some(wanted.as_str()) {
                tracing::info!(
                    activity_id = activity.id,
                    device = detail.device_name.as_deref().unwrap_or("<none>"),
                    "Ride recorded on another device, skipping"
                );
                return Ok(false);
            }
        }

        if self.options.dry_run {
            tracing::info!(
                activity_id = activity.id,
                name = %activity.name,
                gear_id = %self.options.gear_id,
                "Dry run: would tag as commute"
            );
            return Ok(false);
        }

        self.feed
            .mark_commute(activity.id, &self.options.gear_id)
            .await?;

        tracing::info!(
            activity_id = activity.id,
            name = %activity.name,
            gear_id = %self.options.gear_id,
            "Tagged as commute"
        );
        Ok(true)
    }
}
