// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Writes a day's metrics into its spreadsheet row.

use crate::error::Result;
use crate::models::CellUpdate;
use crate::services::sheets::Spreadsheet;

/// Writes cell updates for one row as a single batch.
pub struct MetricWriter<'a, S: Spreadsheet + ?Sized> {
    sheet: &'a S,
}

impl<'a, S: Spreadsheet + ?Sized> MetricWriter<'a, S> {
    pub fn new(sheet: &'a S) -> Self {
        Self { sheet }
    }

    /// Overwrite `updates` on `row` (1-based).
    ///
    /// Re-running with the same values leaves the sheet unchanged, so a
    /// failed day can simply be run again. An empty update list does nothing.
    pub async fn write(&self, row: u32, updates: &[CellUpdate]) -> Result<()> {
        if updates.is_empty() {
            tracing::debug!(row, "No metric cells to write");
            return Ok(());
        }

        self.sheet.batch_update(row, updates).await?;

        for update in updates {
            tracing::info!(
                row,
                column = %update.column,
                value = %update.value,
                "Metric written"
            );
        }
        Ok(())
    }
}
