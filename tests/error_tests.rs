// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use fitness_sheet_sync::config::ConfigError;
use fitness_sheet_sync::error::AppError;
use fitness_sheet_sync::models::Column;
use fitness_sheet_sync::services::{SheetsClient, Spreadsheet};

mod common;
use common::serve;

#[test]
fn test_is_auth_error() {
    assert!(AppError::Auth("Strava rejected credentials (HTTP 401)".to_string()).is_auth_error());

    assert!(!AppError::StravaApi("HTTP 500: boom".to_string()).is_auth_error());
    assert!(!AppError::GarminApi("HTTP 401 in body text".to_string()).is_auth_error());
    assert!(!AppError::NotFound("activity 1".to_string()).is_auth_error());
    assert!(!AppError::Config(ConfigError::Missing("GOOGLE_SHEET_ID")).is_auth_error());
}

#[test]
fn test_is_rate_limited() {
    let err = AppError::StravaApi(AppError::RATE_LIMIT.to_string());
    assert!(err.is_rate_limited());

    let err = AppError::SheetsApi(AppError::RATE_LIMIT.to_string());
    assert!(err.is_rate_limited());

    let err = AppError::StravaApi("HTTP 503: unavailable".to_string());
    assert!(!err.is_rate_limited());

    let err = AppError::Auth(AppError::RATE_LIMIT.to_string());
    assert!(!err.is_rate_limited());
}

#[test]
fn test_config_error_message_names_variable() {
    let err: AppError = ConfigError::Missing("STRAVA_GEAR_ID").into();
    assert_eq!(
        err.to_string(),
        "Configuration error: Missing required environment variable: STRAVA_GEAR_ID"
    );
}

#[tokio::test]
async fn test_http_status_mapping() {
    let router = Router::new()
        .route(
            "/limited/{id}/values/{range}",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        )
        .route(
            "/forbidden/{id}/values/{range}",
            get(|| async { (StatusCode::FORBIDDEN, "no access") }),
        )
        .route(
            "/broken/{id}/values/{range}",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
    let base = serve(router).await;

    let client = |prefix: &str| {
        SheetsClient::with_token(format!("{}/{}", base, prefix), "sheet", None, "t").unwrap()
    };

    let err = client("limited").read_column(Column::A).await.unwrap_err();
    assert!(err.is_rate_limited());
    assert!(!err.is_auth_error());

    let err = client("forbidden").read_column(Column::A).await.unwrap_err();
    assert!(err.is_auth_error());

    let err = client("broken").read_column(Column::A).await.unwrap_err();
    assert!(!err.is_rate_limited());
    assert!(err.to_string().contains("502"));
    assert!(err.to_string().contains("upstream down"));
}
