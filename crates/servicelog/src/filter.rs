//! Read-only filter queries over submitted service logs.
//!
//! Filtering is pure: it never mutates the store and preserves store order
//! (most recently added first).

use serde::{Deserialize, Serialize};

use crate::form::ServiceType;
use crate::logbook::ServiceLog;

/// A filter over the log list.
///
/// The default filter matches everything. An empty query and absent (or
/// empty-string) bounds are unbounded; `service_type: None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Free-text query, matched case-insensitively against the textual
    /// fields of each log.
    pub query: String,
    /// Restrict to a single service type; `None` matches all.
    pub service_type: Option<ServiceType>,
    /// Inclusive lower bound on `start_date` (ISO string).
    pub start_from: Option<String>,
    /// Inclusive upper bound on `start_date` (ISO string).
    pub start_to: Option<String>,
}

impl LogFilter {
    /// Check whether a log passes this filter.
    #[must_use]
    pub fn matches(&self, log: &ServiceLog) -> bool {
        let data = &log.data;

        if let Some(service_type) = self.service_type {
            if data.service_type != service_type {
                return false;
            }
        }

        if let Some(from) = bound(self.start_from.as_deref()) {
            if data.start_date.as_str() < from {
                return false;
            }
        }
        if let Some(to) = bound(self.start_to.as_deref()) {
            if data.start_date.as_str() > to {
                return false;
            }
        }

        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        data.search_text().contains(&query)
    }
}

/// An empty-string bound is unbounded.
fn bound(value: Option<&str>) -> Option<&str> {
    value.filter(|bound| !bound.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ServiceLogFormData;
    use crate::logbook::LogStore;

    fn store_with(entries: &[(&str, ServiceType, &str)]) -> LogStore {
        let mut store = LogStore::new();
        for (car_id, service_type, start_date) in entries {
            let mut data = ServiceLogFormData::with_start_date(*start_date);
            data.car_id = (*car_id).to_string();
            data.service_type = *service_type;
            data.provider_id = "ACME".to_string();
            data.service_order = "SO-1".to_string();
            data.service_description = "Routine check".to_string();
            store.add_log(data);
        }
        store
    }

    fn car_ids(logs: &[&ServiceLog]) -> Vec<String> {
        logs.iter().map(|log| log.data.car_id.clone()).collect()
    }

    #[test]
    fn test_default_filter_matches_all_in_order() {
        let store = store_with(&[
            ("CAR-1", ServiceType::Planned, "2024-05-01"),
            ("CAR-2", ServiceType::Emergency, "2024-05-02"),
        ]);

        let logs = store.filtered(&LogFilter::default());
        assert_eq!(car_ids(&logs), vec!["CAR-2", "CAR-1"]);
    }

    #[test]
    fn test_type_filter() {
        let store = store_with(&[
            ("CAR-1", ServiceType::Planned, "2024-05-01"),
            ("CAR-2", ServiceType::Emergency, "2024-05-02"),
            ("CAR-3", ServiceType::Planned, "2024-05-03"),
        ]);

        let filter = LogFilter {
            service_type: Some(ServiceType::Planned),
            ..LogFilter::default()
        };
        let logs = store.filtered(&filter);
        assert_eq!(car_ids(&logs), vec!["CAR-3", "CAR-1"]);
    }

    #[test]
    fn test_date_bounds_are_closed() {
        let store = store_with(&[
            ("CAR-1", ServiceType::Planned, "2024-05-01"),
            ("CAR-2", ServiceType::Planned, "2024-05-10"),
            ("CAR-3", ServiceType::Planned, "2024-05-20"),
        ]);

        let filter = LogFilter {
            start_from: Some("2024-05-10".to_string()),
            start_to: Some("2024-05-20".to_string()),
            ..LogFilter::default()
        };
        let logs = store.filtered(&filter);
        assert_eq!(car_ids(&logs), vec!["CAR-3", "CAR-2"]);
    }

    #[test]
    fn test_empty_bound_is_unbounded() {
        let store = store_with(&[
            ("CAR-1", ServiceType::Planned, "2024-05-01"),
            ("CAR-2", ServiceType::Planned, "2024-06-01"),
        ]);

        let filter = LogFilter {
            start_from: Some(String::new()),
            start_to: Some("2024-05-31".to_string()),
            ..LogFilter::default()
        };
        let logs = store.filtered(&filter);
        assert_eq!(car_ids(&logs), vec!["CAR-1"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let store = store_with(&[
            ("CAR-1", ServiceType::Planned, "2024-05-01"),
            ("TRUCK-2", ServiceType::Planned, "2024-05-02"),
        ]);

        let filter = LogFilter {
            query: "  TRUCK ".to_string(),
            ..LogFilter::default()
        };
        let logs = store.filtered(&filter);
        assert_eq!(car_ids(&logs), vec!["TRUCK-2"]);
    }

    #[test]
    fn test_query_searches_description_and_type() {
        let mut store = LogStore::new();
        let mut data = ServiceLogFormData::with_start_date("2024-05-01");
        data.car_id = "CAR-1".to_string();
        data.service_description = "Brake pad replacement".to_string();
        data.service_type = ServiceType::Emergency;
        store.add_log(data);

        let by_description = LogFilter {
            query: "brake".to_string(),
            ..LogFilter::default()
        };
        assert_eq!(store.filtered(&by_description).len(), 1);

        let by_type = LogFilter {
            query: "emergency".to_string(),
            ..LogFilter::default()
        };
        assert_eq!(store.filtered(&by_type).len(), 1);
    }

    #[test]
    fn test_query_does_not_match_numeric_fields() {
        let mut store = LogStore::new();
        let mut data = ServiceLogFormData::with_start_date("2024-05-01");
        data.car_id = "CAR-1".to_string();
        data.odometer_mi = Some(98_765.0);
        store.add_log(data);

        let filter = LogFilter {
            query: "98765".to_string(),
            ..LogFilter::default()
        };
        assert!(store.filtered(&filter).is_empty());
    }

    #[test]
    fn test_combined_filters() {
        let store = store_with(&[
            ("CAR-1", ServiceType::Planned, "2024-05-01"),
            ("CAR-2", ServiceType::Emergency, "2024-05-02"),
            ("CAR-3", ServiceType::Emergency, "2024-07-01"),
        ]);

        let filter = LogFilter {
            query: "car".to_string(),
            service_type: Some(ServiceType::Emergency),
            start_from: Some("2024-05-01".to_string()),
            start_to: Some("2024-05-31".to_string()),
        };
        let logs = store.filtered(&filter);
        assert_eq!(car_ids(&logs), vec!["CAR-2"]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let store = store_with(&[("CAR-1", ServiceType::Planned, "2024-05-01")]);

        let filter = LogFilter {
            query: "nonexistent".to_string(),
            ..LogFilter::default()
        };
        assert!(store.filtered(&filter).is_empty());
    }
}
