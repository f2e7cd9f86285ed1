// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Connect client for daily wellness summaries.
//!
//! Two ways in:
//! - a pre-issued OAuth2 bearer token, sent to `connectapi`;
//! - email/password through the SSO widget, which yields a service ticket
//!   that is redeemed for a Connect web session (cookies). Accounts with MFA
//!   enabled cannot use this path.

use crate::config::{GarminAuth, GarminConfig};
use crate::error::{error_for_response, AppError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use serde::Deserialize;

const DAILY_SUMMARY_PATH: &str = "/usersummary-service/usersummary/daily";

/// Source of resting heart rate per calendar day.
#[async_trait]
pub trait HeartRateSource: Send + Sync {
    /// Resting heart rate for `date`, or `None` if the device recorded none.
    async fn resting_heart_rate(&self, date: NaiveDate) -> Result<Option<u32>>;
}

/// Base URLs of the Garmin services.
#[derive(Debug, Clone)]
pub struct GarminEndpoints {
    pub sso_url: String,
    pub connect_url: String,
    pub connectapi_url: String,
}

impl Default for GarminEndpoints {
    fn default() -> Self {
        Self {
            sso_url: "https://sso.garmin.com".to_string(),
            connect_url: "https://connect.garmin.com".to_string(),
            connectapi_url: "https://connectapi.garmin.com".to_string(),
        }
    }
}

/// Daily summary, reduced to the fields we read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub calendar_date: Option<String>,
    pub resting_heart_rate: Option<u32>,
}

/// Authenticated Garmin Connect client.
#[derive(Clone)]
pub struct GarminClient {
    http: reqwest::Client,
    /// Prefix for API paths (`connectapi` host or the web proxy)
    api_base: String,
    /// Bearer token; `None` when the session lives in the cookie store
    bearer: Option<String>,
}

impl GarminClient {
    /// Open a session using the configured credentials.
    pub async fn login(config: &GarminConfig, endpoints: &GarminEndpoints) -> Result<Self> {
        match &config.auth {
            GarminAuth::Token(token) => Ok(Self {
                http: super::http_client(false)?,
                api_base: endpoints.connectapi_url.clone(),
                bearer: Some(token.clone()),
            }),
            GarminAuth::Credentials { email, password } => {
                let http = super::http_client(true)?;
                let ticket = sso_ticket(&http, endpoints, email, password).await?;
                redeem_ticket(&http, endpoints, &ticket).await?;
                tracing::info!("Garmin Connect session established");

                Ok(Self {
                    http,
                    api_base: format!("{}/modern/proxy", endpoints.connect_url),
                    bearer: None,
                })
            }
        }
    }

    /// Fetch the daily summary for a date.
    pub async fn daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        let url = format!("{}{}", self.api_base, DAILY_SUMMARY_PATH);
        let calendar_date = date.format("%Y-%m-%d").to_string();

        let mut request = self
            .http
            .get(&url)
            .query(&[("calendarDate", calendar_date.as_str())])
            .header("NK", "NT");
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::GarminApi(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_response(response, AppError::GarminApi, "Garmin Connect").await);
        }

        // No data for the day comes back as 204 or an empty body.
        let body = response
            .text()
            .await
            .map_err(|e| AppError::GarminApi(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| AppError::GarminApi(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl HeartRateSource for GarminClient {
    async fn resting_heart_rate(&self, date: NaiveDate) -> Result<Option<u32>> {
        let summary = self.daily_summary(date).await?;
        Ok(summary.and_then(|s| s.resting_heart_rate))
    }
}

/// Query parameters shared by the SSO sign-in requests.
fn signin_params(endpoints: &GarminEndpoints) -> Vec<(&'static str, String)> {
    let embed = format!("{}/sso/embed", endpoints.sso_url);
    vec![
        ("id", "gauth-widget".to_string()),
        ("embedWidget", "true".to_string()),
        ("gauthHost", embed.clone()),
        ("service", embed.clone()),
        ("source", embed.clone()),
        ("redirectAfterAccountLoginUrl", embed.clone()),
        ("redirectAfterAccountCreationUrl", embed),
    ]
}

/// Run the SSO widget sign-in and return the service ticket.
async fn sso_ticket(
    http: &reqwest::Client,
    endpoints: &GarminEndpoints,
    email: &str,
    password: &str,
) -> Result<String> {
    let embed_url = format!("{}/sso/embed", endpoints.sso_url);
    let signin_url = format!("{}/sso/signin", endpoints.sso_url);
    let gauth_host = format!("{}/sso", endpoints.sso_url);
    let params = signin_params(endpoints);

    // Sets the initial SSO cookies.
    http.get(&embed_url)
        .query(&[
            ("id", "gauth-widget"),
            ("embedWidget", "true"),
            ("gauthHost", gauth_host.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AppError::Auth(format!("Garmin SSO unreachable: {}", e)))?;

    let signin_page = http
        .get(&signin_url)
        .query(&params)
        .send()
        .await
        .map_err(|e| AppError::Auth(format!("Garmin SSO sign-in page failed: {}", e)))?
        .text()
        .await
        .map_err(|e| AppError::Auth(e.to_string()))?;

    let csrf = extract_csrf(&signin_page)
        .ok_or_else(|| AppError::Auth("Garmin SSO page has no CSRF token".to_string()))?;

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&signin_url) {
        Ok(referer) => {
            headers.insert(REFERER, referer);
        }
        Err(e) => tracing::debug!(
            url = %signin_url,
            error = %e,
            "Sign-in URL is not a valid Referer, posting credentials without it"
        ),
    }

    let response = http
        .post(&signin_url)
        .query(&params)
        .headers(headers)
        .form(&[
            ("username", email),
            ("password", password),
            ("embed", "true"),
            ("_csrf", csrf.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AppError::Auth(format!("Garmin SSO sign-in failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::Auth(format!(
            "Garmin SSO sign-in returned HTTP {}",
            response.status()
        )));
    }

    let page = response
        .text()
        .await
        .map_err(|e| AppError::Auth(e.to_string()))?;

    if !page.contains("<title>Success</title>") {
        let reason = if page.contains("MFA") || page.contains("verifyMFA") {
            "multi-factor authentication is not supported"
        } else {
            "invalid email or password"
        };
        return Err(AppError::Auth(format!("Garmin SSO sign-in rejected: {}", reason)));
    }

    extract_ticket(&page)
        .ok_or_else(|| AppError::Auth("Garmin SSO response has no service ticket".to_string()))
}

/// Trade the service ticket for Connect session cookies.
async fn redeem_ticket(
    http: &reqwest::Client,
    endpoints: &GarminEndpoints,
    ticket: &str,
) -> Result<()> {
    let response = http
        .get(format!("{}/modern/", endpoints.connect_url))
        .query(&[("ticket", ticket)])
        .send()
        .await
        .map_err(|e| AppError::Auth(format!("Garmin ticket exchange failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::Auth(format!(
            "Garmin ticket exchange returned HTTP {}",
            response.status()
        )));
    }
    Ok(())
}

/// Text between `start` and the next `end`, searching from `marker`.
fn slice_after<'a>(html: &'a str, marker: &str, start: &str, end: &str) -> Option<&'a str> {
    let from = html.find(marker)?;
    let rest = &html[from..];
    let begin = rest.find(start)? + start.len();
    let len = rest[begin..].find(end)?;
    Some(&rest[begin..begin + len]).filter(|s| !s.is_empty())
}

fn extract_csrf(html: &str) -> Option<String> {
    slice_after(html, "name=\"_csrf\"", "value=\"", "\"").map(str::to_string)
}

fn extract_ticket(html: &str) -> Option<String> {
    slice_after(html, "embed?ticket=", "ticket=", "\"").map(str::to_string)
}
