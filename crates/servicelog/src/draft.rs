//! Draft store for in-progress service-log forms.
//!
//! Drafts live in a map keyed by id with a separate explicit order list
//! (most recently created first); map iteration order is never relied on.
//! At most one draft is active at a time.
//!
//! All mutations addressed at a nonexistent id, or issued with no active
//! draft, are soft no-ops rather than errors: callers only issue them for
//! entities the presentation layer just rendered.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::form::{FormPatch, ServiceLogFormData};

/// Autosave status of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    /// Edited since the last save.
    Dirty,
    /// A save is in flight.
    Saving,
    /// Persisted and unchanged since.
    Saved,
    /// The last save failed.
    Error,
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dirty => write!(f, "dirty"),
            Self::Saving => write!(f, "saving"),
            Self::Saved => write!(f, "saved"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// An editable, unsubmitted working copy of a service-log form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Opaque unique identifier.
    pub id: String,
    /// Current form field values.
    pub data: ServiceLogFormData,
    /// Autosave status.
    pub status: DraftStatus,
    /// When the draft was created.
    pub created_at: DateTime<Utc>,
    /// When the draft was last mutated.
    pub updated_at: DateTime<Utc>,
}

/// Plain-serializable state of the draft store, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftsSnapshot {
    /// Drafts keyed by id.
    pub drafts: HashMap<String, Draft>,
    /// Draft ids, most recently created first.
    pub order: Vec<String>,
    /// The active draft id, if any.
    pub active_id: Option<String>,
}

/// In-memory store of drafts with an explicit order list and active id.
#[derive(Debug, Default)]
pub struct DraftStore {
    drafts: HashMap<String, Draft>,
    order: Vec<String>,
    active_id: Option<String>,
}

impl DraftStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted snapshot.
    ///
    /// Order entries without a backing draft are dropped, and an active id
    /// that no longer resolves is cleared, so a damaged snapshot degrades
    /// instead of corrupting the store.
    #[must_use]
    pub fn from_snapshot(snapshot: DraftsSnapshot) -> Self {
        let DraftsSnapshot {
            drafts,
            mut order,
            active_id,
        } = snapshot;

        order.retain(|id| drafts.contains_key(id));
        let active_id = active_id.filter(|id| drafts.contains_key(id));

        Self {
            drafts,
            order,
            active_id,
        }
    }

    /// The plain-serializable state of this store.
    #[must_use]
    pub fn snapshot(&self) -> DraftsSnapshot {
        DraftsSnapshot {
            drafts: self.drafts.clone(),
            order: self.order.clone(),
            active_id: self.active_id.clone(),
        }
    }

    /// Create a new draft from defaults merged with `overrides`, prepend it
    /// to the order list, and make it active with status `saved`.
    ///
    /// Returns the new draft's id.
    pub fn create_draft(&mut self, overrides: Option<FormPatch>) -> String {
        let id = Uuid::new_v4().to_string();
        let mut data = ServiceLogFormData::with_defaults();
        if let Some(patch) = overrides {
            data.apply(&patch);
        }

        let now = Utc::now();
        self.drafts.insert(
            id.clone(),
            Draft {
                id: id.clone(),
                data,
                status: DraftStatus::Saved,
                created_at: now,
                updated_at: now,
            },
        );
        self.order.insert(0, id.clone());
        self.active_id = Some(id.clone());

        debug!(draft_id = %id, "created draft");
        id
    }

    /// Make the draft with `id` active, if it exists.
    pub fn select_draft(&mut self, id: &str) {
        if self.drafts.contains_key(id) {
            self.active_id = Some(id.to_string());
        }
    }

    /// Remove a draft. If it was active, the new head of the order list (if
    /// any) becomes active.
    pub fn delete_draft(&mut self, id: &str) {
        if self.drafts.remove(id).is_none() {
            return;
        }
        self.order.retain(|entry| entry != id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.order.first().cloned();
        }
        debug!(draft_id = %id, "deleted draft");
    }

    /// Remove every draft and clear the active id.
    pub fn clear_all_drafts(&mut self) {
        self.drafts.clear();
        self.order.clear();
        self.active_id = None;
    }

    /// Merge `patch` into the active draft's data, marking it dirty.
    pub fn patch_active_draft_data(&mut self, patch: &FormPatch) {
        if let Some(draft) = self.active_draft_mut() {
            draft.data.apply(patch);
            draft.status = DraftStatus::Dirty;
            draft.updated_at = Utc::now();
        }
    }

    /// Replace the active draft's data wholesale, marking it dirty.
    pub fn set_active_draft_data(&mut self, data: ServiceLogFormData) {
        if let Some(draft) = self.active_draft_mut() {
            draft.data = data;
            draft.status = DraftStatus::Dirty;
            draft.updated_at = Utc::now();
        }
    }

    /// Overwrite the active draft's status.
    pub fn set_active_draft_status(&mut self, status: DraftStatus) {
        if let Some(draft) = self.active_draft_mut() {
            draft.status = status;
            draft.updated_at = Utc::now();
            debug!(draft_id = %draft.id, %status, "draft status changed");
        }
    }

    /// Look up a draft by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Draft> {
        self.drafts.get(id)
    }

    /// Draft ids, most recently created first.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// The active draft's id, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// The active draft, if any.
    #[must_use]
    pub fn active(&self) -> Option<&Draft> {
        self.active_id.as_deref().and_then(|id| self.drafts.get(id))
    }

    /// Number of drafts in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check whether the store holds no drafts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn active_draft_mut(&mut self) -> Option<&mut Draft> {
        match &self.active_id {
            Some(id) => self.drafts.get_mut(id),
            None => None,
        }
    }
}
