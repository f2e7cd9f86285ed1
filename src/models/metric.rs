// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily metrics and the cell updates they turn into.

use crate::models::DateKey;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Spreadsheet column, stored as a 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column(u32);

impl Column {
    pub const A: Column = Column(1);
    pub const B: Column = Column(2);
    pub const C: Column = Column(3);

    /// Highest column accepted (`ZZZ`).
    const MAX_INDEX: u32 = 26 + 26 * 26 + 26 * 26 * 26;

    /// Build a column from its 1-based index.
    pub fn from_index(index: u32) -> Option<Self> {
        (1..=Self::MAX_INDEX).contains(&index).then_some(Self(index))
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut n = self.0;
        let mut letters = Vec::with_capacity(3);
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().try_for_each(|c| write!(f, "{}", c))
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 3 || !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("expected a column letter like \"B\", got {:?}", s));
        }

        let index = s
            .to_ascii_uppercase()
            .bytes()
            .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1));

        Ok(Column(index))
    }
}

/// Value written into a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// One cell of a row to overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub column: Column,
    pub value: CellValue,
}

/// Metrics gathered for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub date: DateKey,
    /// Resting heart rate (bpm); `None` when the watch reported nothing
    pub resting_heart_rate: Option<u32>,
    /// Cycling distance for the day (km)
    pub cycling_load: Option<f64>,
}

impl MetricRecord {
    /// Cell updates for the metrics that are present.
    ///
    /// Missing metrics produce no update, so an existing cell is never
    /// blanked out.
    pub fn cell_updates(&self, hr_column: Column, load_column: Option<Column>) -> Vec<CellUpdate> {
        let mut updates = Vec::new();

        if let Some(bpm) = self.resting_heart_rate {
            updates.push(CellUpdate {
                column: hr_column,
                value: CellValue::Integer(i64::from(bpm)),
            });
        }

        if let (Some(column), Some(load)) = (load_column, self.cycling_load) {
            updates.push(CellUpdate {
                column,
                value: CellValue::Number(load),
            });
        }

        updates
    }
}
