//! Application session: store lifecycle and the submit flow.
//!
//! A [`Session`] owns the draft and log stores plus the persistence layer,
//! making the global store lifecycle explicit: state is rehydrated from the
//! persisted snapshot once at startup and flushed back after every mutation
//! issued through the session. There is no ambient global state.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::config::Config;
use crate::draft::{DraftStatus, DraftStore};
use crate::error::Result;
use crate::filter::LogFilter;
use crate::form::{FormPatch, ServiceLogFormData};
use crate::logbook::{LogStore, ServiceLog};
use crate::storage::{Snapshot, Storage};
use crate::validate::{validate, ValidationErrors};

/// The result of a submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The draft was valid; a log was created with this id.
    Submitted(String),
    /// Validation failed; nothing changed.
    Invalid(ValidationErrors),
    /// There is no active draft to submit.
    NoActiveDraft,
}

/// Owns the application state and its persistence.
///
/// The draft store is held behind a shared handle so an
/// [`AutosaveController`](crate::autosave::AutosaveController) can be
/// attached to the same store via [`drafts_handle`](Session::drafts_handle).
#[derive(Debug)]
pub struct Session {
    drafts: Arc<Mutex<DraftStore>>,
    logs: Arc<Mutex<LogStore>>,
    storage: Storage,
}

impl Session {
    /// Open storage at the configured path and rehydrate state from the
    /// persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or read.
    pub fn load(config: &Config) -> Result<Self> {
        Self::with_storage(Storage::open(config.database_path())?)
    }

    /// Rehydrate state from an already-open storage instance.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the snapshot fails.
    pub fn with_storage(storage: Storage) -> Result<Self> {
        let (drafts, logs) = match storage.load_snapshot()? {
            Some(snapshot) => {
                info!(
                    drafts = snapshot.drafts.order.len(),
                    logs = snapshot.logs.order.len(),
                    "rehydrated persisted state"
                );
                (
                    DraftStore::from_snapshot(snapshot.drafts),
                    LogStore::from_snapshot(snapshot.logs),
                )
            }
            None => (DraftStore::new(), LogStore::new()),
        };

        Ok(Self {
            drafts: Arc::new(Mutex::new(drafts)),
            logs: Arc::new(Mutex::new(logs)),
            storage,
        })
    }

    /// An in-memory session, for tests and ephemeral use.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn in_memory() -> Result<Self> {
        Self::with_storage(Storage::open_in_memory()?)
    }

    /// Shared handle to the draft store, for attaching an autosave
    /// controller.
    #[must_use]
    pub fn drafts_handle(&self) -> Arc<Mutex<DraftStore>> {
        Arc::clone(&self.drafts)
    }

    /// Write the current state back to storage.
    ///
    /// Mutations issued through the session flush automatically; call this
    /// at shutdown to capture mutations applied through the shared draft
    /// handle (autosave status changes).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database write fails.
    pub fn flush(&self) -> Result<()> {
        let snapshot = Snapshot {
            drafts: self.drafts.lock().snapshot(),
            logs: self.logs.lock().snapshot(),
        };
        self.storage.save_snapshot(&snapshot)
    }

    // === Draft operations ===

    /// Create a new active draft. See [`DraftStore::create_draft`].
    ///
    /// # Errors
    ///
    /// Returns an error if flushing to storage fails.
    pub fn create_draft(&self, overrides: Option<FormPatch>) -> Result<String> {
        let id = self.drafts.lock().create_draft(overrides);
        self.flush()?;
        Ok(id)
    }

    /// Select a draft by id. See [`DraftStore::select_draft`].
    ///
    /// # Errors
    ///
    /// Returns an error if flushing to storage fails.
    pub fn select_draft(&self, id: &str) -> Result<()> {
        self.drafts.lock().select_draft(id);
        self.flush()
    }

    /// Delete a draft by id. See [`DraftStore::delete_draft`].
    ///
    /// # Errors
    ///
    /// Returns an error if flushing to storage fails.
    pub fn delete_draft(&self, id: &str) -> Result<()> {
        self.drafts.lock().delete_draft(id);
        self.flush()
    }

    /// Delete every draft.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing to storage fails.
    pub fn clear_all_drafts(&self) -> Result<()> {
        self.drafts.lock().clear_all_drafts();
        self.flush()
    }

    /// The active draft, cloned out of the store.
    #[must_use]
    pub fn active_draft(&self) -> Option<crate::draft::Draft> {
        self.drafts.lock().active().cloned()
    }

    /// Draft ids, most recently created first.
    #[must_use]
    pub fn draft_order(&self) -> Vec<String> {
        self.drafts.lock().order().to_vec()
    }

    /// Validate the active draft's data as the form collaborator would on
    /// each change; `None` when no draft is active.
    #[must_use]
    pub fn validate_active_draft(&self) -> Option<ValidationErrors> {
        self.drafts
            .lock()
            .active()
            .map(|draft| validate(&draft.data))
    }

    // === Log operations ===

    /// Add a submitted log directly. See [`LogStore::add_log`].
    ///
    /// # Errors
    ///
    /// Returns an error if flushing to storage fails.
    pub fn add_log(&self, data: ServiceLogFormData) -> Result<String> {
        let id = self.logs.lock().add_log(data);
        self.flush()?;
        Ok(id)
    }

    /// Replace a log's data by id. See [`LogStore::update_log`].
    ///
    /// # Errors
    ///
    /// Returns an error if flushing to storage fails.
    pub fn update_log(&self, id: &str, data: ServiceLogFormData) -> Result<()> {
        self.logs.lock().update_log(id, data);
        self.flush()
    }

    /// Delete a log by id. See [`LogStore::delete_log`].
    ///
    /// # Errors
    ///
    /// Returns an error if flushing to storage fails.
    pub fn delete_log(&self, id: &str) -> Result<()> {
        self.logs.lock().delete_log(id);
        self.flush()
    }

    /// Delete every log.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing to storage fails.
    pub fn clear_all_logs(&self) -> Result<()> {
        self.logs.lock().clear_all_logs();
        self.flush()
    }

    /// Look up a log by id, cloned out of the store.
    #[must_use]
    pub fn log(&self, id: &str) -> Option<ServiceLog> {
        self.logs.lock().get(id).cloned()
    }

    /// The ordered subsequence of logs matching `filter`, cloned out of the
    /// store (most recently added first).
    #[must_use]
    pub fn filtered_logs(&self, filter: &LogFilter) -> Vec<ServiceLog> {
        self.logs
            .lock()
            .filtered(filter)
            .into_iter()
            .cloned()
            .collect()
    }

    // === Submission ===

    /// Submit the active draft as a new service log.
    ///
    /// The draft's data is normalized (text fields trimmed, `end_date`
    /// re-derived) and validated. On success a log is created, the
    /// normalized data is written back to the draft, and the draft is
    /// marked `saved`. On validation failure nothing changes and the
    /// per-field messages are returned as a value.
    ///
    /// # Errors
    ///
    /// Returns an error only if flushing to storage fails; validation
    /// failures are an [`Ok`] outcome.
    pub fn submit_active_draft(&self) -> Result<SubmitOutcome> {
        let normalized = {
            let drafts = self.drafts.lock();
            match drafts.active() {
                Some(draft) => draft.data.normalized(),
                None => return Ok(SubmitOutcome::NoActiveDraft),
            }
        };

        let errors = validate(&normalized);
        if !errors.is_empty() {
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let log_id = self.logs.lock().add_log(normalized.clone());
        {
            let mut drafts = self.drafts.lock();
            drafts.set_active_draft_data(normalized);
            drafts.set_active_draft_status(DraftStatus::Saved);
        }
        self.flush()?;

        info!(log_id = %log_id, "submitted service log");
        Ok(SubmitOutcome::Submitted(log_id))
    }
}
