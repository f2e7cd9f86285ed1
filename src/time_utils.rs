// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! All wall-clock reads go through [`Clock`] so runs can be replayed for a
//! fixed "now". Day boundaries are computed per date in the clock's zone, so
//! a day next to a DST change gets its own 23 or 25 hour window.

use crate::models::DateKey;
use chrono::{
    DateTime, Days, Local, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, TimeZone, Utc,
};

/// Source of the current time in the user's timezone.
pub trait Clock {
    type Zone: TimeZone;

    fn now(&self) -> DateTime<Self::Zone>;

    /// Timezone used to split time into calendar days.
    fn zone(&self) -> Self::Zone {
        self.now().timezone()
    }
}

/// Reads the system clock in the process timezone (`TZ`).
pub struct SystemClock;

impl Clock for SystemClock {
    type Zone = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn zone(&self) -> Local {
        Local
    }
}

/// Always returns the same instant, in the instant's own zone.
pub struct FixedClock<Tz: TimeZone>(pub DateTime<Tz>);

impl<Tz: TimeZone> Clock for FixedClock<Tz> {
    type Zone = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.0.clone()
    }
}

/// The local calendar day before today.
pub fn yesterday<C: Clock + ?Sized>(clock: &C) -> DateKey {
    yesterday_with_zone(clock).0
}

/// Yesterday together with the zone it is a day of, from a single clock
/// read.
pub fn yesterday_with_zone<C: Clock + ?Sized>(clock: &C) -> (DateKey, C::Zone) {
    let now = clock.now();
    (DateKey(now.date_naive() - Days::new(1)), now.timezone())
}

/// The `count` local days before today, oldest first.
pub fn past_days<C: Clock + ?Sized>(clock: &C, count: u32) -> Vec<DateKey> {
    let today = clock.now().date_naive();
    (1..=u64::from(count))
        .rev()
        .map(|back| DateKey(today - Days::new(back)))
        .collect()
}

/// UTC bounds `[start, end)` of a local calendar day in `tz`.
pub fn day_bounds<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        start_of_day(date, tz),
        start_of_day(date + Days::new(1), tz),
    )
}

/// First instant of `date` in `tz`.
fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // Where midnight falls in a DST gap the day starts when the gap ends.
    (0..=4)
        .map(|halves| midnight + TimeDelta::minutes(30 * halves))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}
