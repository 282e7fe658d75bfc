//! Core form types for service logs.
//!
//! This module defines the value object carried by both drafts and submitted
//! service-log records, plus the partial patch applied by field-level edits.

use serde::{Deserialize, Serialize};

use crate::dates::{next_day, today_iso};

/// The kind of service a log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Scheduled maintenance.
    #[default]
    Planned,
    /// Unscheduled but non-urgent work.
    Unplanned,
    /// Urgent, unplanned intervention.
    Emergency,
}

impl ServiceType {
    /// All service types, in display order.
    pub const ALL: [Self; 3] = [Self::Planned, Self::Unplanned, Self::Emergency];
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::Unplanned => write!(f, "unplanned"),
            Self::Emergency => write!(f, "emergency"),
        }
    }
}

/// The field values of a service-log form.
///
/// Invariant: `end_date` is always `start_date + 1` calendar day. The
/// autosave controller re-derives it on every `start_date` edit and
/// validation checks it again before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLogFormData {
    /// Identifier of the service provider.
    pub provider_id: String,
    /// Work-order reference for the service.
    pub service_order: String,
    /// Identifier of the serviced vehicle.
    pub car_id: String,
    /// Odometer reading in miles, if recorded.
    pub odometer_mi: Option<f64>,
    /// Engine hours, if recorded.
    pub engine_hours: Option<f64>,
    /// Service start date (`YYYY-MM-DD`).
    pub start_date: String,
    /// Service end date (`YYYY-MM-DD`), derived as `start_date + 1` day.
    pub end_date: String,
    /// The kind of service.
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    /// Free-text description of the work.
    pub service_description: String,
}

impl ServiceLogFormData {
    /// Default form values with the given start date.
    ///
    /// `end_date` is derived as the next calendar day; when `start_date`
    /// does not parse it is carried over unchanged.
    #[must_use]
    pub fn with_start_date(start_date: impl Into<String>) -> Self {
        let start_date = start_date.into();
        let end_date = next_day(&start_date).unwrap_or_else(|| start_date.clone());

        Self {
            provider_id: String::new(),
            service_order: String::new(),
            car_id: String::new(),
            odometer_mi: None,
            engine_hours: None,
            start_date,
            end_date,
            service_type: ServiceType::Planned,
            service_description: String::new(),
        }
    }

    /// Default form values for a new draft: empty fields, today's date.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::with_start_date(today_iso())
    }

    /// Merge a partial patch into this form data.
    pub fn apply(&mut self, patch: &FormPatch) {
        if let Some(value) = &patch.provider_id {
            self.provider_id.clone_from(value);
        }
        if let Some(value) = &patch.service_order {
            self.service_order.clone_from(value);
        }
        if let Some(value) = &patch.car_id {
            self.car_id.clone_from(value);
        }
        if let Some(value) = patch.odometer_mi {
            self.odometer_mi = value;
        }
        if let Some(value) = patch.engine_hours {
            self.engine_hours = value;
        }
        if let Some(value) = &patch.start_date {
            self.start_date.clone_from(value);
        }
        if let Some(value) = &patch.end_date {
            self.end_date.clone_from(value);
        }
        if let Some(value) = patch.service_type {
            self.service_type = value;
        }
        if let Some(value) = &patch.service_description {
            self.service_description.clone_from(value);
        }
    }

    /// The form data as it is submitted: text fields trimmed and `end_date`
    /// re-derived from `start_date`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        out.provider_id = out.provider_id.trim().to_string();
        out.service_order = out.service_order.trim().to_string();
        out.car_id = out.car_id.trim().to_string();
        out.service_description = out.service_description.trim().to_string();
        if let Some(end_date) = next_day(&out.start_date) {
            out.end_date = end_date;
        }
        out
    }

    /// Lowercased concatenation of the textual fields, used by the free-text
    /// filter query. Numeric fields are not searchable.
    #[must_use]
    pub fn search_text(&self) -> String {
        [
            self.provider_id.as_str(),
            self.service_order.as_str(),
            self.car_id.as_str(),
            self.service_description.as_str(),
            &self.service_type.to_string(),
            self.start_date.as_str(),
            self.end_date.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// A partial update to [`ServiceLogFormData`].
///
/// Every field is optional; the two nullable numeric fields are doubly
/// optional so a patch can distinguish "leave unchanged" (`None`) from
/// "clear the value" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPatch {
    /// New provider id, if changed.
    pub provider_id: Option<String>,
    /// New service order, if changed.
    pub service_order: Option<String>,
    /// New car id, if changed.
    pub car_id: Option<String>,
    /// New odometer reading, if changed (`Some(None)` clears it).
    pub odometer_mi: Option<Option<f64>>,
    /// New engine hours, if changed (`Some(None)` clears it).
    pub engine_hours: Option<Option<f64>>,
    /// New start date, if changed.
    pub start_date: Option<String>,
    /// New end date, if changed.
    pub end_date: Option<String>,
    /// New service type, if changed.
    pub service_type: Option<ServiceType>,
    /// New description, if changed.
    pub service_description: Option<String>,
}

impl FormPatch {
    /// Check whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
