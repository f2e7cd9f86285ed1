// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar dates as the spreadsheet displays them.
//!
//! Sheets returns formatted cell text, so matching a row means rendering the
//! target date exactly the way the sheet's locale does. Rendering is a pure
//! function of the date and a [`DateLocale`]; it never consults the process
//! locale.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// French weekday abbreviations, Monday first.
const FR_WEEKDAYS: [&str; 7] = ["lun.", "mar.", "mer.", "jeu.", "ven.", "sam.", "dim."];

/// French month abbreviations. Short month names keep no trailing dot.
const FR_MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

const EN_WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Display format used by the date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLocale {
    /// `mar. 20 janv. 2026`
    French,
    /// `Tue 20 Jan 2026`
    English,
    /// `2026-01-20`
    Iso,
}

impl DateLocale {
    /// Render a date as the sheet displays it.
    pub fn render(&self, date: NaiveDate) -> String {
        let weekday = date.weekday().num_days_from_monday() as usize;
        let month = date.month0() as usize;

        match self {
            DateLocale::French => format!(
                "{} {} {} {}",
                FR_WEEKDAYS[weekday],
                date.day(),
                FR_MONTHS[month],
                date.year()
            ),
            DateLocale::English => format!(
                "{} {} {} {}",
                EN_WEEKDAYS[weekday],
                date.day(),
                EN_MONTHS[month],
                date.year()
            ),
            DateLocale::Iso => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl FromStr for DateLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fr" | "fr_fr" | "french" => Ok(DateLocale::French),
            "en" | "en_gb" | "english" => Ok(DateLocale::English),
            "iso" => Ok(DateLocale::Iso),
            other => Err(format!("unsupported date locale {:?} (fr, en, iso)", other)),
        }
    }
}

/// The day a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateKey(pub NaiveDate);

impl DateKey {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn render(&self, locale: DateLocale) -> String {
        locale.render(self.0)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
