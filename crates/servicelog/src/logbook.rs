//! Log store for submitted service-log records.
//!
//! Submitted logs are the durable record; drafts are working copies. The
//! store keeps a map keyed by id plus an explicit order list (most recently
//! added first), mirroring the draft store's arena + index-list layout.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::filter::LogFilter;
use crate::form::ServiceLogFormData;

/// A submitted, persisted service-log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLog {
    /// Opaque unique identifier.
    pub id: String,
    /// The submitted form field values.
    pub data: ServiceLogFormData,
    /// When the log was submitted.
    pub created_at: DateTime<Utc>,
    /// When the log was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Plain-serializable state of the log store, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsSnapshot {
    /// Logs keyed by id.
    pub logs: HashMap<String, ServiceLog>,
    /// Log ids, most recently added first.
    pub order: Vec<String>,
}

/// In-memory store of submitted service logs.
#[derive(Debug, Default)]
pub struct LogStore {
    logs: HashMap<String, ServiceLog>,
    order: Vec<String>,
}

impl LogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted snapshot, dropping order entries
    /// without a backing record.
    #[must_use]
    pub fn from_snapshot(snapshot: LogsSnapshot) -> Self {
        let LogsSnapshot { logs, mut order } = snapshot;
        order.retain(|id| logs.contains_key(id));
        Self { logs, order }
    }

    /// The plain-serializable state of this store.
    #[must_use]
    pub fn snapshot(&self) -> LogsSnapshot {
        LogsSnapshot {
            logs: self.logs.clone(),
            order: self.order.clone(),
        }
    }

    /// Add a new log at the front of the order list.
    ///
    /// Returns the new log's id.
    pub fn add_log(&mut self, data: ServiceLogFormData) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        self.logs.insert(
            id.clone(),
            ServiceLog {
                id: id.clone(),
                data,
                created_at: now,
                updated_at: now,
            },
        );
        self.order.insert(0, id.clone());

        debug!(log_id = %id, "added service log");
        id
    }

    /// Replace a log's data wholesale, if the id exists.
    pub fn update_log(&mut self, id: &str, data: ServiceLogFormData) {
        if let Some(log) = self.logs.get_mut(id) {
            log.data = data;
            log.updated_at = Utc::now();
            debug!(log_id = %id, "updated service log");
        }
    }

    /// Remove a log and its order entry; no-op if absent.
    pub fn delete_log(&mut self, id: &str) {
        if self.logs.remove(id).is_none() {
            return;
        }
        self.order.retain(|entry| entry != id);
        debug!(log_id = %id, "deleted service log");
    }

    /// Remove every log.
    pub fn clear_all_logs(&mut self) {
        self.logs.clear();
        self.order.clear();
    }

    /// Look up a log by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ServiceLog> {
        self.logs.get(id)
    }

    /// Log ids, most recently added first.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// All logs in store order (most recently added first).
    #[must_use]
    pub fn ordered(&self) -> Vec<&ServiceLog> {
        self.order
            .iter()
            .filter_map(|id| self.logs.get(id))
            .collect()
    }

    /// The ordered subsequence of logs matching `filter`.
    ///
    /// Pure and order-preserving; store order is kept.
    #[must_use]
    pub fn filtered(&self, filter: &LogFilter) -> Vec<&ServiceLog> {
        self.ordered()
            .into_iter()
            .filter(|log| filter.matches(log))
            .collect()
    }

    /// Number of logs in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check whether the store holds no logs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
