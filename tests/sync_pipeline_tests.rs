// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily sync pipeline against in-memory sheet and fitness sources.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use chrono_tz::Europe::Paris;
use fitness_sheet_sync::models::{CellUpdate, CellValue, Column, DateKey, DateLocale, MetricRecord};
use fitness_sheet_sync::services::sync::SheetLayout;
use fitness_sheet_sync::services::{DailySync, MetricWriter, Spreadsheet, SyncOutcome};
use fitness_sheet_sync::time_utils::{yesterday, yesterday_with_zone, FixedClock};

mod common;
use common::{activity, FakeFeed, FakeHeartRate, HeartRateReply, InMemorySheet};

fn paris() -> FixedOffset {
    FixedOffset::east_opt(3600).unwrap()
}

fn jan_20() -> DateKey {
    DateKey(NaiveDate::from_ymd_opt(2026, 1, 20).unwrap())
}

fn layout() -> SheetLayout {
    SheetLayout {
        date_column: Column::A,
        hr_column: Column::B,
        load_column: None,
        date_locale: DateLocale::French,
    }
}

#[tokio::test]
async fn test_writes_resting_hr_to_matching_row() {
    let sheet = InMemorySheet::with_dates(&["lun. 19 janv. 2026", "mar. 20 janv. 2026"]);
    let garmin = FakeHeartRate::bpm(52);

    let outcome = DailySync::new(&sheet, &garmin, layout())
        .run(jan_20(), paris())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Written { row: 2, cells: 1 });
    assert_eq!(sheet.cell(2, Column::B).as_deref(), Some("52"));
    assert_eq!(sheet.cell(1, Column::B), None);
    assert_eq!(garmin.queried(), vec![jan_20().date()]);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let sheet = InMemorySheet::with_dates(&["Date", "lun. 19 janv. 2026", "mar. 20 janv. 2026"]);
    let garmin = FakeHeartRate::bpm(52);
    let sync = DailySync::new(&sheet, &garmin, layout());

    sync.run(jan_20(), paris()).await.unwrap();
    let after_first = sheet.snapshot();

    sync.run(jan_20(), paris()).await.unwrap();
    assert_eq!(sheet.snapshot(), after_first);
    assert_eq!(sheet.cell(3, Column::B).as_deref(), Some("52"));
}

#[tokio::test]
async fn test_missing_row_skips_write() {
    let sheet = InMemorySheet::with_dates(&["lun. 19 janv. 2026"]);
    let garmin = FakeHeartRate::bpm(52);

    let outcome = DailySync::new(&sheet, &garmin, layout())
        .run(jan_20(), paris())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::RowNotFound {
            rendered: "mar. 20 janv. 2026".to_string()
        }
    );
    assert_eq!(sheet.batch_calls(), 0);
}

#[tokio::test]
async fn test_wrong_locale_is_not_found() {
    let sheet = InMemorySheet::with_dates(&["Tue 20 Jan 2026"]);
    let garmin = FakeHeartRate::bpm(52);

    let outcome = DailySync::new(&sheet, &garmin, layout())
        .run(jan_20(), paris())
        .await
        .unwrap();

    assert!(matches!(outcome, SyncOutcome::RowNotFound { .. }));
    assert_eq!(sheet.batch_calls(), 0);
}

#[tokio::test]
async fn test_duplicate_rows_skip_write() {
    let sheet = InMemorySheet::with_dates(&[
        "mar. 20 janv. 2026",
        "mer. 21 janv. 2026",
        "mar. 20 janv. 2026",
    ]);
    let garmin = FakeHeartRate::bpm(52);

    let outcome = DailySync::new(&sheet, &garmin, layout())
        .run(jan_20(), paris())
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::AmbiguousRow {
            rendered: "mar. 20 janv. 2026".to_string(),
            rows: vec![1, 3],
        }
    );
    assert_eq!(sheet.batch_calls(), 0);
}

#[tokio::test]
async fn test_no_heart_rate_writes_nothing() {
    let sheet = InMemorySheet::with_dates(&["mar. 20 janv. 2026"]);
    let garmin = FakeHeartRate::new(HeartRateReply::Value(None));

    let outcome = DailySync::new(&sheet, &garmin, layout())
        .run(jan_20(), paris())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::NothingToWrite);
    assert_eq!(sheet.cell(1, Column::B), None);
}

#[tokio::test]
async fn test_heart_rate_errors_are_fatal() {
    let sheet = InMemorySheet::with_dates(&["mar. 20 janv. 2026"]);

    let garmin = FakeHeartRate::new(HeartRateReply::ApiError);
    let err = DailySync::new(&sheet, &garmin, layout())
        .run(jan_20(), paris())
        .await
        .unwrap_err();
    assert!(!err.is_auth_error());

    let garmin = FakeHeartRate::new(HeartRateReply::Unauthorized);
    let err = DailySync::new(&sheet, &garmin, layout())
        .run(jan_20(), paris())
        .await
        .unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(sheet.batch_calls(), 0);
}

#[tokio::test]
async fn test_cycling_load_written_in_same_batch() {
    let sheet = InMemorySheet::with_dates(&["lun. 19 janv. 2026", "mar. 20 janv. 2026"]);
    let garmin = FakeHeartRate::bpm(48);

    let mut morning = activity(1, "Ride", true, "2026-01-20T07:45:00Z");
    morning.distance_meters = 8234.6;
    let mut evening = activity(2, "Ride", true, "2026-01-20T17:30:00Z");
    evening.distance_meters = 8120.3;
    let mut run = activity(3, "Run", false, "2026-01-20T12:00:00Z");
    run.distance_meters = 5000.0;
    let mut previous_day = activity(4, "Ride", false, "2026-01-19T12:00:00Z");
    previous_day.distance_meters = 30_000.0;
    let strava = FakeFeed::new(vec![morning, evening, run, previous_day]);

    let outcome = DailySync::new(
        &sheet,
        &garmin,
        SheetLayout {
            load_column: Some(Column::C),
            ..layout()
        },
    )
    .with_rides(&strava)
    .run(jan_20(), paris())
    .await
    .unwrap();

    assert_eq!(outcome, SyncOutcome::Written { row: 2, cells: 2 });
    assert_eq!(sheet.batch_calls(), 1);
    assert_eq!(sheet.cell(2, Column::B).as_deref(), Some("48"));
    assert_eq!(sheet.cell(2, Column::C).as_deref(), Some("16.4"));
}

#[tokio::test]
async fn test_cycling_load_failure_still_writes_heart_rate() {
    let sheet = InMemorySheet::with_dates(&["mar. 20 janv. 2026"]);
    let garmin = FakeHeartRate::bpm(50);
    let strava = FakeFeed::new(vec![]).failing_list();

    let outcome = DailySync::new(
        &sheet,
        &garmin,
        SheetLayout {
            load_column: Some(Column::C),
            ..layout()
        },
    )
    .with_rides(&strava)
    .run(jan_20(), paris())
    .await
    .unwrap();

    assert_eq!(outcome, SyncOutcome::Written { row: 1, cells: 1 });
    assert_eq!(sheet.cell(1, Column::B).as_deref(), Some("50"));
    assert_eq!(sheet.cell(1, Column::C), None);
}

#[tokio::test]
async fn test_dry_run_does_not_write() {
    let sheet = InMemorySheet::with_dates(&["mar. 20 janv. 2026"]);
    let garmin = FakeHeartRate::bpm(52);

    let outcome = DailySync::new(&sheet, &garmin, layout())
        .dry_run(true)
        .run(jan_20(), paris())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::DryRun { row: 1, cells: 1 });
    assert_eq!(sheet.batch_calls(), 0);
}

#[tokio::test]
async fn test_yesterday_from_fixed_clock() {
    let clock = FixedClock(DateTime::parse_from_rfc3339("2026-01-21T06:00:00+01:00").unwrap());
    let sheet = InMemorySheet::with_dates(&["lun. 19 janv. 2026", "mar. 20 janv. 2026"]);
    let garmin = FakeHeartRate::bpm(55);

    let outcome = DailySync::new(&sheet, &garmin, layout())
        .run(yesterday(&clock), paris())
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Written { row: 2, cells: 1 });
}

#[tokio::test]
async fn test_cycling_load_uses_local_day_after_dst_change() {
    let sheet = InMemorySheet::with_dates(&["sam. 28 mars 2026", "dim. 29 mars 2026"]);
    let garmin = FakeHeartRate::bpm(51);

    let mut saturday_night = activity(1, "Ride", false, "2026-03-28T22:30:00Z");
    saturday_night.distance_meters = 12_000.0;
    let mut sunday_night = activity(2, "Ride", false, "2026-03-29T21:30:00Z");
    sunday_night.distance_meters = 7_450.0;
    let strava = FakeFeed::new(vec![saturday_night, sunday_night]);

    let clock = FixedClock(Paris.with_ymd_and_hms(2026, 3, 30, 7, 0, 0).unwrap());
    let (date, zone) = yesterday_with_zone(&clock);

    let outcome = DailySync::new(
        &sheet,
        &garmin,
        SheetLayout {
            load_column: Some(Column::C),
            ..layout()
        },
    )
    .with_rides(&strava)
    .run(date, zone)
    .await
    .unwrap();

    assert_eq!(outcome, SyncOutcome::Written { row: 2, cells: 2 });
    assert_eq!(sheet.cell(2, Column::C).as_deref(), Some("7.5"));
}

#[tokio::test]
async fn test_metric_writer_touches_only_targeted_cells() {
    let sheet = InMemorySheet::with_dates(&["a", "b", "c"]);
    sheet
        .batch_update(
            1,
            &[CellUpdate {
                column: Column::B,
                value: CellValue::Integer(60),
            }],
        )
        .await
        .unwrap();

    let writer = MetricWriter::new(&sheet);
    writer
        .write(
            2,
            &[CellUpdate {
                column: Column::B,
                value: CellValue::Integer(52),
            }],
        )
        .await
        .unwrap();
    writer.write(3, &[]).await.unwrap();

    assert_eq!(sheet.cell(1, Column::B).as_deref(), Some("60"));
    assert_eq!(sheet.cell(2, Column::B).as_deref(), Some("52"));
    assert_eq!(sheet.cell(3, Column::B), None);
    assert_eq!(sheet.cell(2, Column::A).as_deref(), Some("b"));
    // The empty write made no API call.
    assert_eq!(sheet.batch_calls(), 2);
}

#[tokio::test]
async fn test_write_precollected_record() {
    let sheet = InMemorySheet::with_dates(&["mar. 20 janv. 2026"]);
    let garmin = FakeHeartRate::bpm(0);
    let sync = DailySync::new(&sheet, &garmin, layout());

    let record = MetricRecord {
        date: jan_20(),
        resting_heart_rate: Some(52),
        cycling_load: None,
    };

    assert_eq!(
        sync.write(&record).await.unwrap(),
        SyncOutcome::Written { row: 1, cells: 1 }
    );
    assert!(garmin.queried().is_empty());
}
