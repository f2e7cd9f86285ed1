// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by both binaries.

use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Garmin API error: {0}")]
    GarminApi(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Google Sheets API error: {0}")]
    SheetsApi(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when an upstream API answers 429.
    pub const RATE_LIMIT: &'static str = "Rate limit exceeded";

    /// Whether this error means the run cannot continue with its credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }

    /// Whether an upstream API rejected the call for rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            AppError::GarminApi(msg) | AppError::StravaApi(msg) | AppError::SheetsApi(msg) => {
                msg == Self::RATE_LIMIT
            }
            _ => false,
        }
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;

/// Map a non-success HTTP response to an [`AppError`].
///
/// 401/403 become [`AppError::Auth`] regardless of the upstream, since the
/// whole run depends on those credentials.
pub(crate) async fn error_for_response(
    response: reqwest::Response,
    api_error: fn(String) -> AppError,
    service: &str,
) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 | 403 => AppError::Auth(format!("{} rejected credentials (HTTP {})", service, status)),
        429 => {
            tracing::warn!(service, "Rate limit hit (429)");
            api_error(AppError::RATE_LIMIT.to_string())
        }
        _ => api_error(format!("HTTP {}: {}", status, body)),
    }
}
