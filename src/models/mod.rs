// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod date_key;
pub mod metric;

pub use activity::{Activity, CYCLING_TYPE};
pub use date_key::{DateKey, DateLocale};
pub use metric::{CellUpdate, CellValue, Column, MetricRecord};
