// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity projection used by the commute tagger.

use chrono::{DateTime, Utc};

/// Legacy Strava activity type shared by all outdoor bike rides
/// (road, gravel, mountain).
pub const CYCLING_TYPE: &str = "Ride";

/// Read-only view of an activity from the athlete's feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Activity name/title
    pub name: String,
    /// Activity type (Ride, Run, VirtualRide, ...)
    pub activity_type: String,
    /// Finer-grained sport type (GravelRide, MountainBikeRide, ...)
    pub sport_type: String,
    /// Start instant
    pub start_date: DateTime<Utc>,
    /// Recorded on an indoor trainer
    pub trainer: bool,
    /// Flagged as a commute
    pub commute: bool,
    /// Gear (bike/shoes) attached to the activity
    pub gear_id: Option<String>,
    /// Recording device, only present on detailed activities
    pub device_name: Option<String>,
    /// Distance in meters
    pub distance_meters: f64,
}

impl Activity {
    pub fn is_ride(&self) -> bool {
        self.activity_type == CYCLING_TYPE
    }
}
