// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Locate the spreadsheet row for a date.
//!
//! Matching is exact on the displayed text: a different locale, stray
//! whitespace or punctuation means no match.

/// Outcome of looking up a rendered date in the date column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowLookup {
    /// 1-based sheet row.
    Found(u32),
    NotFound,
    /// Several rows display the same date; nothing is written.
    Ambiguous(Vec<u32>),
}

/// Find the 1-based row whose cell text equals `rendered`.
pub fn locate_row<S: AsRef<str>>(column: &[S], rendered: &str) -> RowLookup {
    let rows: Vec<u32> = column
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.as_ref() == rendered)
        .map(|(i, _)| i as u32 + 1)
        .collect();

    match rows.as_slice() {
        [] => RowLookup::NotFound,
        [row] => RowLookup::Found(*row),
        _ => RowLookup::Ambiguous(rows),
    }
}
