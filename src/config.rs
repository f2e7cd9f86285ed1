// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Each binary builds its config once at startup and passes it down by
//! reference. A `.env` file is honored for local runs.

use crate::models::{Column, DateLocale};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::env;

/// Google Sheets access and layout.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Spreadsheet ID (from the sheet URL)
    pub sheet_id: String,
    /// Service account key, as raw JSON
    pub service_account_json: String,
    /// Tab name; `None` targets the first sheet
    pub sheet_name: Option<String>,
    /// Column holding the rendered dates
    pub date_column: Column,
    /// Column receiving resting heart rate
    pub hr_column: Column,
    /// Column receiving cycling load, if it should be written
    pub load_column: Option<Column>,
    /// Locale the sheet renders its dates in
    pub date_locale: DateLocale,
}

/// How to open a Garmin Connect session.
#[derive(Debug, Clone)]
pub enum GarminAuth {
    /// Pre-issued OAuth2 bearer token.
    Token(String),
    /// Email/password through the SSO ticket flow.
    Credentials { email: String, password: String },
}

#[derive(Debug, Clone)]
pub struct GarminConfig {
    pub auth: GarminAuth,
}

/// Strava OAuth application and the athlete's long-lived refresh token.
#[derive(Debug, Clone)]
pub struct StravaConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Configuration for `sync-resting-hr`.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub sheets: SheetsConfig,
    pub garmin: GarminConfig,
    /// Present only when cycling load should be computed.
    pub strava: Option<StravaConfig>,
    pub dry_run: bool,
}

/// Configuration for `tag-commutes`.
#[derive(Debug, Clone)]
pub struct CommuteConfig {
    pub strava: StravaConfig,
    /// Gear (bike) to attach to tagged commutes, e.g. `b6207119`
    pub gear_id: String,
    /// Only tag activities recorded by this device
    pub device_name: Option<String>,
    /// Number of past days to scan, 1 = yesterday only
    pub lookback_days: u32,
    /// Also tag indoor/trainer rides
    pub include_trainer: bool,
    pub dry_run: bool,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let strava = if vars.optional("STRAVA_REFRESH_TOKEN").is_some() {
            Some(StravaConfig::from_vars(&vars)?)
        } else {
            None
        };

        let sheets = SheetsConfig::from_vars(&vars)?;
        if sheets.load_column.is_some() && strava.is_none() {
            tracing::warn!("SHEET_LOAD_COLUMN set without Strava credentials, cycling load will not be written");
        }

        Ok(Self {
            sheets,
            garmin: GarminConfig::from_vars(&vars)?,
            strava,
            dry_run: vars.flag("DRY_RUN")?,
        })
    }
}

impl CommuteConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let lookback_days = match vars.optional("COMMUTE_LOOKBACK_DAYS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|days| *days >= 1)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "COMMUTE_LOOKBACK_DAYS",
                    reason: format!("expected a positive integer, got {:?}", raw),
                })?,
            None => 1,
        };

        Ok(Self {
            strava: StravaConfig::from_vars(&vars)?,
            gear_id: vars.required("STRAVA_GEAR_ID")?,
            device_name: vars.optional("STRAVA_DEVICE_NAME"),
            lookback_days,
            include_trainer: vars.flag("COMMUTE_INCLUDE_TRAINER")?,
            dry_run: vars.flag("DRY_RUN")?,
        })
    }
}

impl SheetsConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        let raw_key = vars.required("GOOGLE_SERVICE_ACCOUNT_JSON")?;

        Ok(Self {
            sheet_id: vars.required("GOOGLE_SHEET_ID")?,
            service_account_json: decode_service_account(&raw_key)?,
            sheet_name: vars.optional("GOOGLE_SHEET_NAME"),
            date_column: vars.column("SHEET_DATE_COLUMN")?.unwrap_or(Column::A),
            hr_column: vars.column("SHEET_HR_COLUMN")?.unwrap_or(Column::B),
            load_column: vars.column("SHEET_LOAD_COLUMN")?,
            date_locale: match vars.optional("SHEET_DATE_LOCALE") {
                Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                    name: "SHEET_DATE_LOCALE",
                    reason,
                })?,
                None => DateLocale::French,
            },
        })
    }
}

impl GarminConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        if let Some(token) = vars.optional("GARMIN_ACCESS_TOKEN") {
            return Ok(Self {
                auth: GarminAuth::Token(token),
            });
        }

        Ok(Self {
            auth: GarminAuth::Credentials {
                email: vars.required("GARMIN_EMAIL")?,
                password: vars.required("GARMIN_PASSWORD")?,
            },
        })
    }
}

impl StravaConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: vars.required("STRAVA_CLIENT_ID")?,
            client_secret: vars.required("STRAVA_CLIENT_SECRET")?,
            refresh_token: vars.required("STRAVA_REFRESH_TOKEN")?,
        })
    }
}

/// Typed accessors over a key/value lookup. Values are trimmed and empty
/// values count as unset.
struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn flag(&self, name: &'static str) -> Result<bool, ConfigError> {
        match self.optional(name).as_deref().map(str::to_ascii_lowercase) {
            None => Ok(false),
            Some(v) => match v.as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    name,
                    reason: format!("expected a boolean, got {:?}", v),
                }),
            },
        }
    }

    fn column(&self, name: &'static str) -> Result<Option<Column>, ConfigError> {
        self.optional(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|reason| ConfigError::Invalid { name, reason })
            })
            .transpose()
    }
}

/// Accept the service account key either base64-encoded (CI secrets) or as
/// plain JSON (local testing).
fn decode_service_account(raw: &str) -> Result<String, ConfigError> {
    if let Ok(bytes) = BASE64.decode(raw) {
        if let Ok(json) = String::from_utf8(bytes) {
            if serde_json::from_str::<serde_json::Value>(&json).is_ok() {
                return Ok(json);
            }
        }
    }

    serde_json::from_str::<serde_json::Value>(raw)
        .map(|_| raw.to_string())
        .map_err(|e| ConfigError::Invalid {
            name: "GOOGLE_SERVICE_ACCOUNT_JSON",
            reason: format!("neither base64 nor JSON: {}", e),
        })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
