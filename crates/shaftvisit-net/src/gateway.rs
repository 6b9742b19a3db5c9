//! The remote write contract.
//!
//! The backend is a black box: three `POST` routes accepting JSON, where any
//! 2xx answer is success and nothing in the response body is parsed.  The
//! [`VisitGateway`] trait keeps the sync engine testable without a network;
//! [`HttpGateway`] is the reqwest implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use shaftvisit_shared::constants::{
    REQUEST_TIMEOUT_SECS, ROUTE_ENROLLMENT, ROUTE_VISIT_DETAILS, ROUTE_VISIT_HEADER,
};
use shaftvisit_shared::{DeviceIdentity, VisitDetail, VisitHeader};

use crate::error::GatewayError;

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// Enrollment record as the backend expects it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentPayload {
    pub first_name: String,
    pub last_name: String,
    pub employee_code: String,
    pub designation: String,
    pub date_enrolled: DateTime<Utc>,
    /// Reachability at the moment of enrollment.
    pub status: bool,
    pub last_sync: Option<DateTime<Utc>>,
}

impl From<&DeviceIdentity> for EnrollmentPayload {
    fn from(identity: &DeviceIdentity) -> Self {
        Self {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            employee_code: identity.employee_code.clone(),
            designation: identity.designation.clone(),
            date_enrolled: identity.date_enrolled,
            status: identity.connection_status_at_enrollment,
            last_sync: identity.last_sync,
        }
    }
}

/// One visit detail line, flattened to the strings the backend stores.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPayload {
    pub category: String,
    pub priority: String,
    pub shaft: String,
    pub location: String,
    pub full_comment: String,
    pub image_path: String,
    pub transaction_date: DateTime<Utc>,
    pub employee_code: String,
}

impl From<&VisitDetail> for DetailPayload {
    fn from(detail: &VisitDetail) -> Self {
        Self {
            category: catalog_str(detail.category.map(|v| v.as_str())),
            priority: catalog_str(detail.priority.map(|v| v.as_str())),
            shaft: catalog_str(detail.shaft.map(|v| v.as_str())),
            location: catalog_str(detail.location.map(|v| v.as_str())),
            full_comment: detail.full_comment.clone(),
            image_path: detail.image_path.clone(),
            transaction_date: detail.transaction_date,
            employee_code: detail.employee_code.clone(),
        }
    }
}

/// Visit header, flattened.  The local draft id is not part of the payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderPayload {
    pub device_id: String,
    pub visit_date: Option<DateTime<Utc>>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub comment: String,
    pub transaction_date: DateTime<Utc>,
    pub is_sync: bool,
    pub date_sync: Option<DateTime<Utc>>,
    pub employee_code: String,
}

impl HeaderPayload {
    /// Build the payload sent once all detail writes are acknowledged.
    pub fn from_header(header: &VisitHeader, now: DateTime<Utc>) -> Self {
        Self {
            device_id: header.device_id.clone(),
            visit_date: header.visit_date,
            entry_time: header.entry_time,
            exit_time: header.exit_time,
            comment: header.comment.clone(),
            transaction_date: now,
            is_sync: true,
            date_sync: Some(now),
            employee_code: header.employee_code.clone(),
        }
    }
}

fn catalog_str(v: Option<&'static str>) -> String {
    v.unwrap_or("").to_string()
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Remote write operations the client components depend on.
#[async_trait]
pub trait VisitGateway: Send + Sync {
    /// `POST /api/DeviceUserEnrollment`.
    async fn enroll_device(&self, payload: &EnrollmentPayload) -> Result<(), GatewayError>;

    /// `POST /api/VisitDetails`, the whole batch in one call; success means
    /// every detail is acknowledged.
    async fn submit_details(&self, payloads: &[DetailPayload]) -> Result<(), GatewayError>;

    /// `POST /api/VisitHeader`, only ever called after the details of the
    /// same visit were acknowledged.
    async fn submit_header(&self, payload: &HeaderPayload) -> Result<(), GatewayError>;
}

/// Gateway configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Backend base URL, no trailing slash.
    /// Env: `SHAFTVISIT_API_URL`
    /// Default: `http://localhost:5295`
    pub base_url: String,

    /// Bound applied to every remote write.
    /// Env: `SHAFTVISIT_TIMEOUT_SECS`
    /// Default: 10 seconds.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5295".to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SHAFTVISIT_API_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(val) = std::env::var("SHAFTVISIT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.timeout = Duration::from_secs(secs);
            } else {
                tracing::warn!(value = %val, "Invalid SHAFTVISIT_TIMEOUT_SECS, using default");
            }
        }

        config
    }
}

/// reqwest-backed [`VisitGateway`].
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        route: &str,
        body: &T,
    ) -> Result<(), GatewayError> {
        let url = format!("{}{}", self.base_url, route);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "remote write rejected");
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        tracing::debug!(%url, status = status.as_u16(), "remote write acknowledged");
        Ok(())
    }
}

#[async_trait]
impl VisitGateway for HttpGateway {
    async fn enroll_device(&self, payload: &EnrollmentPayload) -> Result<(), GatewayError> {
        self.post_json(ROUTE_ENROLLMENT, payload).await
    }

    async fn submit_details(&self, payloads: &[DetailPayload]) -> Result<(), GatewayError> {
        self.post_json(ROUTE_VISIT_DETAILS, payloads).await
    }

    async fn submit_header(&self, payload: &HeaderPayload) -> Result<(), GatewayError> {
        self.post_json(ROUTE_VISIT_HEADER, payload).await
    }
}
