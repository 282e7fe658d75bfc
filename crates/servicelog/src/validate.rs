//! Declarative field-level validation for service-log forms.
//!
//! Validation never fails as an error: it produces a [`ValidationErrors`]
//! value mapping fields to human-readable messages. Callers run it on every
//! change and gate submission on the result being empty.

use std::collections::BTreeMap;

use crate::dates::next_day;
use crate::form::ServiceLogFormData;

const PROVIDER_ID_REQUIRED: &str = "Provider ID is required";
const SERVICE_ORDER_REQUIRED: &str = "Service order is required";
const CAR_ID_REQUIRED: &str = "Car ID is required";
const DESCRIPTION_REQUIRED: &str = "Description is required";
const ODOMETER_NEGATIVE: &str = "Odometer cannot be negative";
const ENGINE_HOURS_NEGATIVE: &str = "Engine hours cannot be negative";
const START_DATE_REQUIRED: &str = "Start date is required";
const END_DATE_REQUIRED: &str = "End date is required";
const END_DATE_MISMATCH: &str = "End date must be start date + 1 day";

/// A field of the service-log form, as keyed by the form collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    /// `providerId`
    ProviderId,
    /// `serviceOrder`
    ServiceOrder,
    /// `carId`
    CarId,
    /// `odometerMi`
    OdometerMi,
    /// `engineHours`
    EngineHours,
    /// `startDate`
    StartDate,
    /// `endDate`
    EndDate,
    /// `serviceDescription`
    ServiceDescription,
}

impl FormField {
    /// The field key used by the form collaborator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProviderId => "providerId",
            Self::ServiceOrder => "serviceOrder",
            Self::CarId => "carId",
            Self::OdometerMi => "odometerMi",
            Self::EngineHours => "engineHours",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::ServiceDescription => "serviceDescription",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation messages.
///
/// Empty means the form is valid. This is a plain value: it is attached to
/// fields by the form collaborator and blocks submission, but it is never
/// raised as an error and never touches store state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<FormField, String>,
}

impl ValidationErrors {
    /// Check whether validation passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn message(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Iterate over failing fields and their messages.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn insert(&mut self, field: FormField, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Normalize raw numeric text input from the form collaborator.
///
/// Empty or non-numeric input coerces to `None` (the field is unset rather
/// than invalid); parseable finite numbers pass through and are range-checked
/// by [`validate`].
#[must_use]
pub fn normalize_number_input(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// Validate form data against the field schema.
///
/// - `provider_id`, `service_order`, `car_id`, `service_description`:
///   required, trimmed, non-empty.
/// - `odometer_mi`, `engine_hours`: optional; when present must be ≥ 0.
/// - `start_date`, `end_date`: both required; `end_date` must equal
///   `start_date + 1` day exactly, compared as ISO strings.
///
/// The service type is an enum and cannot hold an out-of-range value.
#[must_use]
pub fn validate(data: &ServiceLogFormData) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if data.provider_id.trim().is_empty() {
        errors.insert(FormField::ProviderId, PROVIDER_ID_REQUIRED);
    }
    if data.service_order.trim().is_empty() {
        errors.insert(FormField::ServiceOrder, SERVICE_ORDER_REQUIRED);
    }
    if data.car_id.trim().is_empty() {
        errors.insert(FormField::CarId, CAR_ID_REQUIRED);
    }
    if data.service_description.trim().is_empty() {
        errors.insert(FormField::ServiceDescription, DESCRIPTION_REQUIRED);
    }

    if let Some(value) = data.odometer_mi {
        if value < 0.0 {
            errors.insert(FormField::OdometerMi, ODOMETER_NEGATIVE);
        }
    }
    if let Some(value) = data.engine_hours {
        if value < 0.0 {
            errors.insert(FormField::EngineHours, ENGINE_HOURS_NEGATIVE);
        }
    }

    let start_missing = data.start_date.trim().is_empty();
    let end_missing = data.end_date.trim().is_empty();
    if start_missing {
        errors.insert(FormField::StartDate, START_DATE_REQUIRED);
    }
    if end_missing {
        errors.insert(FormField::EndDate, END_DATE_REQUIRED);
    }
    if !start_missing && !end_missing {
        match next_day(&data.start_date) {
            Some(expected) if data.end_date == expected => {}
            _ => errors.insert(FormField::EndDate, END_DATE_MISMATCH),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_data() -> ServiceLogFormData {
        let mut data = ServiceLogFormData::with_start_date("2024-05-01");
        data.provider_id = "ACME".to_string();
        data.service_order = "SO-42".to_string();
        data.car_id = "CAR-7".to_string();
        data.service_description = "Oil change".to_string();
        data
    }

    #[test]
    fn test_valid_data_passes() {
        let errors = validate(&valid_data());
        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);
    }

    #[test]
    fn test_required_fields() {
        let data = ServiceLogFormData::with_start_date("2024-05-01");
        let errors = validate(&data);

        assert_eq!(
            errors.message(FormField::ProviderId),
            Some(PROVIDER_ID_REQUIRED)
        );
        assert_eq!(
            errors.message(FormField::ServiceOrder),
            Some(SERVICE_ORDER_REQUIRED)
        );
        assert_eq!(errors.message(FormField::CarId), Some(CAR_ID_REQUIRED));
        assert_eq!(
            errors.message(FormField::ServiceDescription),
            Some(DESCRIPTION_REQUIRED)
        );
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_whitespace_only_is_required_failure() {
        let mut data = valid_data();
        data.car_id = "   ".to_string();

        let errors = validate(&data);
        assert_eq!(errors.message(FormField::CarId), Some(CAR_ID_REQUIRED));
    }

    #[test]
    fn test_negative_numbers_fail() {
        let mut data = valid_data();
        data.odometer_mi = Some(-1.0);
        data.engine_hours = Some(-0.5);

        let errors = validate(&data);
        assert_eq!(errors.message(FormField::OdometerMi), Some(ODOMETER_NEGATIVE));
        assert_eq!(
            errors.message(FormField::EngineHours),
            Some(ENGINE_HOURS_NEGATIVE)
        );
    }

    #[test]
    fn test_zero_and_absent_numbers_pass() {
        let mut data = valid_data();
        data.odometer_mi = Some(0.0);
        data.engine_hours = None;

        assert!(validate(&data).is_empty());
    }

    #[test]
    fn test_normalize_number_input() {
        assert_eq!(normalize_number_input(""), None);
        assert_eq!(normalize_number_input("   "), None);
        assert_eq!(normalize_number_input("abc"), None);
        assert_eq!(normalize_number_input("inf"), None);
        assert_eq!(normalize_number_input("120"), Some(120.0));
        assert_eq!(normalize_number_input(" 3.5 "), Some(3.5));
        assert_eq!(normalize_number_input("-1"), Some(-1.0));
    }

    #[test]
    fn test_empty_number_input_passes_validation() {
        let mut data = valid_data();
        data.odometer_mi = normalize_number_input("");

        assert_eq!(data.odometer_mi, None);
        assert!(validate(&data).is_empty());
    }

    #[test]
    fn test_end_date_mismatch() {
        let mut data = valid_data();
        data.end_date = "2024-05-03".to_string();

        let errors = validate(&data);
        assert_eq!(errors.message(FormField::EndDate), Some(END_DATE_MISMATCH));
    }

    #[test]
    fn test_missing_dates_report_required_not_mismatch() {
        let mut data = valid_data();
        data.start_date = String::new();
        data.end_date = String::new();

        let errors = validate(&data);
        assert_eq!(errors.message(FormField::StartDate), Some(START_DATE_REQUIRED));
        assert_eq!(errors.message(FormField::EndDate), Some(END_DATE_REQUIRED));
    }

    #[test]
    fn test_unparsable_start_date_is_mismatch() {
        let mut data = valid_data();
        data.start_date = "garbage".to_string();
        data.end_date = "2024-05-02".to_string();

        let errors = validate(&data);
        assert_eq!(errors.message(FormField::EndDate), Some(END_DATE_MISMATCH));
    }

    #[test]
    fn test_errors_display() {
        let data = ServiceLogFormData::with_start_date("2024-05-01");
        let errors = validate(&data);
        let rendered = errors.to_string();

        assert!(rendered.contains("providerId"));
        assert!(rendered.contains(PROVIDER_ID_REQUIRED));
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(FormField::ProviderId.as_str(), "providerId");
        assert_eq!(FormField::OdometerMi.as_str(), "odometerMi");
        assert_eq!(FormField::ServiceDescription.to_string(), "serviceDescription");
    }
}
