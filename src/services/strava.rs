// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for listing and updating activities.
//!
//! Handles:
//! - Access token refresh from the athlete's long-lived refresh token
//! - Activity listing for a time window (paginated)
//! - Detailed activity fetch (for `device_name`)
//! - Commute flag and gear updates

use crate::config::StravaConfig;
use crate::error::{error_for_response, AppError, Result};
use crate::models::Activity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Page size for the activity list endpoint (Strava maximum is 200).
const PER_PAGE: u32 = 100;
/// Safety stop for pagination; one day never spans this many pages.
const MAX_PAGES: u32 = 10;

/// Activity operations the commute tagger and the sync rely on.
#[async_trait]
pub trait ActivityFeed: Send + Sync {
    /// Activities that started in `[after, before)`.
    async fn activities_between(
        &self,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<Vec<Activity>>;

    /// Detailed view of one activity, including `device_name`.
    async fn activity_detail(&self, activity_id: u64) -> Result<Activity>;

    /// Flag an activity as a commute ridden with `gear_id`.
    async fn mark_commute(&self, activity_id: u64, gear_id: &str) -> Result<()>;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Result<Self> {
        Self::with_base_urls(
            "https://www.strava.com/api/v3",
            "https://www.strava.com/oauth",
            client_id,
            client_secret,
        )
    }

    /// Create a client against arbitrary API and OAuth roots.
    pub fn with_base_urls(
        base_url: impl Into<String>,
        oauth_url: impl Into<String>,
        client_id: String,
        client_secret: String,
    ) -> Result<Self> {
        Ok(Self {
            http: super::http_client(false)?,
            base_url: base_url.into(),
            oauth_url: oauth_url.into(),
            client_id,
            client_secret,
        })
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<StravaActivity> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);
        self.get_json(&url, access_token).await
    }

    /// Set the commute flag and gear of an activity.
    pub async fn update_commute(
        &self,
        access_token: &str,
        activity_id: u64,
        gear_id: &str,
    ) -> Result<()> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);

        let body = serde_json::json!({
            "commute": true,
            "gear_id": gear_id
        });

        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response(response).await
    }

    /// List one page of activities in a time window.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64, // Unix timestamp
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("before", before.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Exchange the refresh token for a fresh access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Strava token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token refresh failed");
            return Err(AppError::Auth(format!(
                "Strava token refresh failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(error_for_response(response, AppError::StravaApi, "Strava").await)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(error_for_response(response, AppError::StravaApi, "Strava").await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Detailed Strava activity response.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivity {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub sport_type: String,
    pub start_date: DateTime<Utc>,
    pub distance: f64,
    #[serde(default)]
    pub trainer: bool,
    #[serde(default)]
    pub commute: bool,
    pub gear_id: Option<String>,
    pub device_name: Option<String>,
}

/// Summary activity for list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub sport_type: String,
    pub start_date: DateTime<Utc>,
    pub distance: f64,
    #[serde(default)]
    pub trainer: bool,
    #[serde(default)]
    pub commute: bool,
    pub gear_id: Option<String>,
}

impl From<StravaActivity> for Activity {
    fn from(a: StravaActivity) -> Self {
        Activity {
            id: a.id,
            name: a.name,
            activity_type: a.activity_type,
            sport_type: a.sport_type,
            start_date: a.start_date,
            trainer: a.trainer,
            commute: a.commute,
            gear_id: a.gear_id,
            device_name: a.device_name,
            distance_meters: a.distance,
        }
    }
}

impl From<StravaActivitySummary> for Activity {
    fn from(a: StravaActivitySummary) -> Self {
        Activity {
            id: a.id,
            name: a.name,
            activity_type: a.activity_type,
            sport_type: a.sport_type,
            start_date: a.start_date,
            trainer: a.trainer,
            commute: a.commute,
            gear_id: a.gear_id,
            device_name: None,
            distance_meters: a.distance,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - client bound to one athlete's access token
// ─────────────────────────────────────────────────────────────────────────────

/// Strava client holding a valid access token for the run.
///
/// A run is short-lived, so the token is refreshed once at startup and
/// never cached across invocations.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    access_token: String,
}

impl StravaService {
    /// Refresh the access token and bind it to a new service.
    pub async fn connect(config: &StravaConfig) -> Result<Self> {
        let client = StravaClient::new(config.client_id.clone(), config.client_secret.clone())?;
        Self::from_client(client, &config.refresh_token).await
    }

    /// Refresh the access token using an existing client.
    pub async fn from_client(client: StravaClient, refresh_token: &str) -> Result<Self> {
        let tokens = client.refresh_token(refresh_token).await?;

        if tokens.refresh_token != refresh_token {
            // Strava rotates refresh tokens occasionally; the old one keeps
            // working until the new one is used, but the stored secret
            // should be updated.
            tracing::warn!("Strava issued a new refresh token, update STRAVA_REFRESH_TOKEN");
        }

        tracing::info!(expires_at = tokens.expires_at, "Strava access token refreshed");
        Ok(Self {
            client,
            access_token: tokens.access_token,
        })
    }
}

#[async_trait]
impl ActivityFeed for StravaService {
    async fn activities_between(
        &self,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        let mut activities = Vec::new();
        let mut complete = false;

        for page in 1..=MAX_PAGES {
            let batch = self
                .client
                .list_activities(
                    &self.access_token,
                    after.timestamp() - 1,
                    before.timestamp(),
                    page,
                    PER_PAGE,
                )
                .await?;

            let last_page = batch.len() < PER_PAGE as usize;
            activities.extend(batch.into_iter().map(Activity::from));
            if last_page {
                complete = true;
                break;
            }
        }

        if !complete {
            tracing::warn!(
                pages = MAX_PAGES,
                fetched = activities.len(),
                "Activity list truncated at page limit"
            );
        }

        // Strava's bounds are exclusive; the window above is widened by a second.
        activities.retain(|a| a.start_date >= after && a.start_date < before);
        Ok(activities)
    }

    async fn activity_detail(&self, activity_id: u64) -> Result<Activity> {
        let detail = self
            .client
            .get_activity(&self.access_token, activity_id)
            .await?;
        Ok(detail.into())
    }

    async fn mark_commute(&self, activity_id: u64, gear_id: &str) -> Result<()> {
        self.client
            .update_commute(&self.access_token, activity_id, gear_id)
            .await
    }
}
