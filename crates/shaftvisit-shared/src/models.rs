//! Domain model structs for enrollment and visit capture.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names; the same encoding is used for the local key-value store and as the
//! base of the wire payloads, so a queued record can be replayed as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::HISTORY_DATE_FORMAT;
use crate::types::{Category, Location, Priority, Shaft};

// ---------------------------------------------------------------------------
// DeviceIdentity
// ---------------------------------------------------------------------------

/// The one-time association of this installation with an employee.
///
/// At most one record exists per installation.  Once written it never
/// changes except for `last_sync`; "clear enrollment" deletes it outright.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    /// Stable generated id, `DEV-{millis}-{random}`.
    pub device_id: String,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub designation: String,
    /// When enrollment completed locally.
    pub date_enrolled: DateTime<Utc>,
    /// Last successful sync against the backend, if any.
    pub last_sync: Option<DateTime<Utc>>,
    /// Whether the device was reachable at the moment of enrollment.
    pub connection_status_at_enrollment: bool,
}

// ---------------------------------------------------------------------------
// VisitHeader / VisitDetail
// ---------------------------------------------------------------------------

/// One visit record: a header plus at least one detail line.
///
/// A header is submittable only when `employee_code`, `device_id`,
/// `visit_date` and `entry_time` are all present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VisitHeader {
    /// Locally generated draft id.  Never sent to the backend.
    pub id: Uuid,
    pub employee_code: String,
    pub device_id: String,
    pub visit_date: Option<DateTime<Utc>>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    /// Free-text comment, empty when the user left it blank.
    pub comment: String,
    /// Whether the remote write of this header has been acknowledged.
    pub is_sync: bool,
    /// Set when `is_sync` flips to true.
    pub date_sync: Option<DateTime<Utc>>,
    /// Ordered detail lines, length >= 1.
    pub visit_details: Vec<VisitDetail>,
}

/// One detail line of a visit.
///
/// Submittable only when `category`, `priority`, `shaft` and `location`
/// are all selected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetail {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub shaft: Option<Shaft>,
    pub location: Option<Location>,
    /// Free text, empty when blank.
    pub full_comment: String,
    /// Local file reference to an attached photo, empty when none.
    pub image_path: String,
    /// Refreshed to "now" immediately before each remote write attempt so it
    /// reflects transmission time, not draft-creation time.
    pub transaction_date: DateTime<Utc>,
    /// Inherited from the parent header unless overridden.
    pub employee_code: String,
}

impl VisitDetail {
    /// A blank detail line inheriting the header's employee code.
    pub fn blank(employee_code: &str, now: DateTime<Utc>) -> Self {
        Self {
            category: None,
            priority: None,
            shaft: None,
            location: None,
            full_comment: String::new(),
            image_path: String::new(),
            transaction_date: now,
            employee_code: employee_code.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryEntry
// ---------------------------------------------------------------------------

/// Flattened, display-only projection of a processed [`VisitHeader`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Visit date formatted `DD/MM/YYYY`, empty when the draft had none.
    pub visit_date: String,
    /// One-line summary of the first detail,
    /// `Visit to {location}, {shaft}, {priority}`.
    pub summary: String,
    pub is_sync: bool,
}

impl HistoryEntry {
    /// Project a header into its display row.
    pub fn project(header: &VisitHeader) -> Self {
        let visit_date = header
            .visit_date
            .map(|d| d.format(HISTORY_DATE_FORMAT).to_string())
            .unwrap_or_default();

        let summary = match header.visit_details.first() {
            Some(detail) => format!(
                "Visit to {}, {}, {}",
                opt_str(detail.location.map(|v| v.as_str())),
                opt_str(detail.shaft.map(|v| v.as_str())),
                opt_str(detail.priority.map(|v| v.as_str())),
            ),
            None => String::new(),
        };

        Self {
            id: header.id,
            visit_date,
            summary,
            is_sync: header.is_sync,
        }
    }
}

fn opt_str(v: Option<&'static str>) -> &'static str {
    v.unwrap_or("-")
}
