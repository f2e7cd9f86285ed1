// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory stand-ins for the external APIs, shared by integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fitness_sheet_sync::error::{AppError, Result};
use fitness_sheet_sync::models::{Activity, CellUpdate, Column};
use fitness_sheet_sync::services::{ActivityFeed, HeartRateSource, Spreadsheet};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Read a file from `tests/fixtures`.
pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

/// Serve a router on an ephemeral local port and return its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

// ─── Spreadsheet ─────────────────────────────────────────────────────────────

/// Sheet kept as a sparse (row, column) → text map, 1-based like Sheets.
#[derive(Default)]
pub struct InMemorySheet {
    cells: Mutex<BTreeMap<(u32, u32), String>>,
    batch_calls: AtomicUsize,
}

impl InMemorySheet {
    /// Sheet with `dates` in column A, starting at row 1.
    pub fn with_dates(dates: &[&str]) -> Self {
        let sheet = Self::default();
        {
            let mut cells = sheet.cells.lock().unwrap();
            for (i, date) in dates.iter().enumerate() {
                if !date.is_empty() {
                    cells.insert((i as u32 + 1, Column::A.index()), date.to_string());
                }
            }
        }
        sheet
    }

    pub fn cell(&self, row: u32, column: Column) -> Option<String> {
        self.cells
            .lock()
            .unwrap()
            .get(&(row, column.index()))
            .cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<(u32, u32), String> {
        self.cells.lock().unwrap().clone()
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Spreadsheet for InMemorySheet {
    async fn read_column(&self, column: Column) -> Result<Vec<String>> {
        let cells = self.cells.lock().unwrap();
        let last_row = cells
            .keys()
            .filter(|(_, c)| *c == column.index())
            .map(|(r, _)| *r)
            .max()
            .unwrap_or(0);

        Ok((1..=last_row)
            .map(|row| cells.get(&(row, column.index())).cloned().unwrap_or_default())
            .collect())
    }

    async fn batch_update(&self, row: u32, updates: &[CellUpdate]) -> Result<()> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let mut cells = self.cells.lock().unwrap();
        for update in updates {
            cells.insert((row, update.column.index()), update.value.to_string());
        }
        Ok(())
    }
}

// ─── Heart rate ──────────────────────────────────────────────────────────────

pub enum HeartRateReply {
    Value(Option<u32>),
    ApiError,
    Unauthorized,
}

pub struct FakeHeartRate {
    reply: HeartRateReply,
    queried: Mutex<Vec<NaiveDate>>,
}

impl FakeHeartRate {
    pub fn new(reply: HeartRateReply) -> Self {
        Self {
            reply,
            queried: Mutex::new(Vec::new()),
        }
    }

    pub fn bpm(bpm: u32) -> Self {
        Self::new(HeartRateReply::Value(Some(bpm)))
    }

    pub fn queried(&self) -> Vec<NaiveDate> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl HeartRateSource for FakeHeartRate {
    async fn resting_heart_rate(&self, date: NaiveDate) -> Result<Option<u32>> {
        self.queried.lock().unwrap().push(date);
        match &self.reply {
            HeartRateReply::Value(v) => Ok(*v),
            HeartRateReply::ApiError => Err(AppError::GarminApi("HTTP 500".to_string())),
            HeartRateReply::Unauthorized => Err(AppError::Auth("bad password".to_string())),
        }
    }
}

// ─── Activity feed ───────────────────────────────────────────────────────────

/// Build an activity starting at an RFC3339 instant.
pub fn activity(id: u64, activity_type: &str, commute: bool, start: &str) -> Activity {
    Activity {
        id,
        name: format!("Activity {}", id),
        activity_type: activity_type.to_string(),
        sport_type: activity_type.to_string(),
        start_date: DateTime::parse_from_rfc3339(start)
            .unwrap()
            .with_timezone(&Utc),
        trainer: false,
        commute,
        gear_id: None,
        device_name: None,
        distance_meters: 10_000.0,
    }
}

/// Activity feed whose updates mutate its own activities, so repeated runs
/// see the effect of earlier ones.
#[derive(Default)]
pub struct FakeFeed {
    activities: Mutex<Vec<Activity>>,
    devices: HashMap<u64, String>,
    failing: HashSet<u64>,
    unauthorized_updates: bool,
    failing_list: bool,
    updates: Mutex<Vec<(u64, String)>>,
    detail_calls: AtomicUsize,
}

impl FakeFeed {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self {
            activities: Mutex::new(activities),
            ..Self::default()
        }
    }

    /// Updates of this activity fail with an API error.
    pub fn failing_on(mut self, activity_id: u64) -> Self {
        self.failing.insert(activity_id);
        self
    }

    /// Every update fails with an authentication error.
    pub fn unauthorized_updates(mut self) -> Self {
        self.unauthorized_updates = true;
        self
    }

    /// Listing activities fails.
    pub fn failing_list(mut self) -> Self {
        self.failing_list = true;
        self
    }

    /// Detailed view of this activity reports `device`.
    pub fn with_device(mut self, activity_id: u64, device: &str) -> Self {
        self.devices.insert(activity_id, device.to_string());
        self
    }

    pub fn updates(&self) -> Vec<(u64, String)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, activity_id: u64) -> Option<Activity> {
        self.activities
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == activity_id)
            .cloned()
    }
}

#[async_trait]
impl ActivityFeed for FakeFeed {
    async fn activities_between(
        &self,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        if self.failing_list {
            return Err(AppError::StravaApi("HTTP 503: unavailable".to_string()));
        }
        Ok(self
            .activities
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.start_date >= after && a.start_date < before)
            .cloned()
            .collect())
    }

    async fn activity_detail(&self, activity_id: u64) -> Result<Activity> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let mut detail = self
            .get(activity_id)
            .ok_or_else(|| AppError::NotFound(format!("activity {}", activity_id)))?;
        detail.device_name = self.devices.get(&activity_id).cloned();
        Ok(detail)
    }

    async fn mark_commute(&self, activity_id: u64, gear_id: &str) -> Result<()> {
        if self.unauthorized_updates {
            return Err(AppError::Auth("Strava rejected credentials (HTTP 401)".to_string()));
        }
        if self.failing.contains(&activity_id) {
            return Err(AppError::StravaApi("HTTP 500: boom".to_string()));
        }

        let mut activities = self.activities.lock().unwrap();
        let activity = activities
            .iter_mut()
            .find(|a| a.id == activity_id)
            .ok_or_else(|| AppError::NotFound(format!("activity {}", activity_id)))?;
        activity.commute = true;
        activity.gear_id = Some(gear_id.to_string());

        self.updates
            .lock()
            .unwrap()
            .push((activity_id, gear_id.to_string()));
        Ok(())
    }
}
