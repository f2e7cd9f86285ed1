// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Sheets client authenticated with a service account.
//!
//! Only two calls are needed: read one column as displayed text, and
//! batch-update cells of one row.

use crate::config::SheetsConfig;
use crate::error::{error_for_response, AppError, Result};
use crate::models::{CellUpdate, CellValue, Column};
use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Spreadsheet operations the pipelines rely on.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// All displayed values of a column, top to bottom. Blank cells inside
    /// the used range come back as empty strings.
    async fn read_column(&self, column: Column) -> Result<Vec<String>>;

    /// Overwrite the given cells of one row in a single request.
    async fn batch_update(&self, row: u32, updates: &[CellUpdate]) -> Result<()>;
}

/// Service account key file, as downloaded from the Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AppError::Auth(format!("Invalid service account key: {}", e)))
    }
}

/// JWT claims for the OAuth2 JWT-bearer grant.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange a signed service account assertion for a bearer token.
pub async fn fetch_access_token(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
    now: i64,
) -> Result<String> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SHEETS_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| AppError::Auth(format!("Invalid service account private key: {}", e)))?;

    let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|e| AppError::Auth(format!("Failed to sign assertion: {}", e)))?;

    let response = http
        .post(&key.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AppError::Auth(format!("Token request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "Service account token exchange failed");
        return Err(AppError::Auth(format!(
            "Service account token exchange failed with status {}",
            status
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))?;

    tracing::debug!(client_email = %key.client_email, "Service account token acquired");
    Ok(token.access_token)
}

/// Sheets API v4 client bound to one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    sheet_id: String,
    sheet_name: Option<String>,
    access_token: String,
}

impl SheetsClient {
    /// Authenticate with the configured service account.
    pub async fn connect(config: &SheetsConfig) -> Result<Self> {
        let http = super::http_client(false)?;
        let key = ServiceAccountKey::from_json(&config.service_account_json)?;
        let access_token = fetch_access_token(&http, &key, chrono::Utc::now().timestamp()).await?;

        Ok(Self {
            http,
            base_url: SHEETS_BASE_URL.to_string(),
            sheet_id: config.sheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            access_token,
        })
    }

    /// Build a client with an existing token against an arbitrary endpoint.
    pub fn with_token(
        base_url: impl Into<String>,
        sheet_id: impl Into<String>,
        sheet_name: Option<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            http: super::http_client(false)?,
            base_url: base_url.into(),
            sheet_id: sheet_id.into(),
            sheet_name,
            access_token: access_token.into(),
        })
    }

    /// Qualify an A1 range with the sheet name, if one is configured.
    pub fn range(&self, a1: &str) -> String {
        match &self.sheet_name {
            Some(name) => format!("'{}'!{}", name.replace('\'', "''"), a1),
            None => a1.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest<'a> {
    value_input_option: &'a str,
    data: Vec<RangeValues>,
}

#[derive(Debug, Serialize)]
struct RangeValues {
    range: String,
    values: Vec<Vec<CellValue>>,
}

#[async_trait]
impl Spreadsheet for SheetsClient {
    async fn read_column(&self, column: Column) -> Result<Vec<String>> {
        let range = self.range(&format!("{0}:{0}", column));
        let url = format!(
            "{}/{}/values/{}",
            self.base_url,
            self.sheet_id,
            urlencoding::encode(&range)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("majorDimension", "COLUMNS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()
            .await
            .map_err(|e| AppError::SheetsApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_response(response, AppError::SheetsApi, "Google Sheets").await);
        }

        let body: ValueRange = response
            .json()
            .await
            .context("parsing Sheets values response")?;

        Ok(body.values.into_iter().next().unwrap_or_default())
    }

    async fn batch_update(&self, row: u32, updates: &[CellUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let request = BatchUpdateRequest {
            value_input_option: "USER_ENTERED",
            data: updates
                .iter()
                .map(|u| RangeValues {
                    range: self.range(&format!("{}{}", u.column, row)),
                    values: vec![vec![u.value.clone()]],
                })
                .collect(),
        };

        let url = format!("{}/{}/values:batchUpdate", self.base_url, self.sheet_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::SheetsApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_response(response, AppError::SheetsApi, "Google Sheets").await);
        }

        tracing::debug!(row, cells = updates.len(), "Sheet cells updated");
        Ok(())
    }
}
