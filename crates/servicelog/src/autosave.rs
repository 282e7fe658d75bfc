//! Debounced autosave for the active draft.
//!
//! Every field change is applied to the draft store immediately (status
//! `dirty`) and restarts a trailing-edge debounce timer. Once the draft has
//! been stable for the debounce window the status moves to `saving`, the
//! save sink runs, and its outcome drives `saved` or `error`. A new edit at
//! any point, including mid-save, returns the draft to `dirty` and restarts
//! the whole sequence.
//!
//! Cancellation is exact: rebinding or detaching the controller invalidates
//! the pending sequence, and an invalidated sequence never applies a status
//! change. The generation counter is checked under the store lock before
//! every deferred effect; aborting the task is only the wake-up cut.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;
use crate::dates::next_day;
use crate::draft::{DraftStatus, DraftStore};
use crate::form::{FormPatch, ServiceLogFormData};

/// A draft save failure, surfaced by a [`SaveSink`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("save failed: {message}")]
pub struct SaveError {
    /// Description of what went wrong.
    pub message: String,
}

impl SaveError {
    /// Create a new save error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Where drafts are saved once the debounce window closes.
///
/// This is the seam a real persistence round-trip would plug into; the
/// default [`SimulatedSink`] only sleeps for a fixed delay and succeeds.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Persist the draft's data.
    ///
    /// # Errors
    ///
    /// Returns an error when the save fails; the controller maps it to the
    /// draft status `error`.
    async fn persist(&self, draft_id: &str, data: &ServiceLogFormData) -> Result<(), SaveError>;
}

/// A save sink that simulates a persistence round-trip with a fixed delay
/// and always succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedSink {
    delay: Duration,
}

impl SimulatedSink {
    /// Create a simulated sink with the given round-trip delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl SaveSink for SimulatedSink {
    async fn persist(&self, _draft_id: &str, _data: &ServiceLogFormData) -> Result<(), SaveError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Autosave timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveTiming {
    /// Debounce window: the draft must be stable this long before a save
    /// starts.
    pub debounce: Duration,
    /// Simulated persistence round-trip duration.
    pub save_delay: Duration,
}

impl Default for AutosaveTiming {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            save_delay: Duration::from_millis(200),
        }
    }
}

impl From<&Config> for AutosaveTiming {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            save_delay: config.save_delay(),
        }
    }
}

/// Drives the autosave state machine for the active draft of a shared
/// [`DraftStore`].
///
/// The controller must run inside a tokio runtime: the debounce/save
/// sequence is a spawned task.
///
/// A freshly constructed (or rebound) controller is armed to skip exactly
/// one change: the synthetic initial change the form collaborator emits
/// right after a draft is created or selected. Call [`rebind`] on every
/// draft switch to re-arm the flag and cancel any pending save.
///
/// [`rebind`]: AutosaveController::rebind
pub struct AutosaveController {
    drafts: Arc<Mutex<DraftStore>>,
    sink: Arc<dyn SaveSink>,
    debounce: Duration,
    skip_next_change: bool,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for AutosaveController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutosaveController")
            .field("debounce", &self.debounce)
            .field("skip_next_change", &self.skip_next_change)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl AutosaveController {
    /// Create a controller over a shared draft store with a custom sink.
    #[must_use]
    pub fn new(drafts: Arc<Mutex<DraftStore>>, sink: Arc<dyn SaveSink>, debounce: Duration) -> Self {
        Self {
            drafts,
            sink,
            debounce,
            skip_next_change: true,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Create a controller with the simulated sink and the given timing.
    #[must_use]
    pub fn simulated(drafts: Arc<Mutex<DraftStore>>, timing: AutosaveTiming) -> Self {
        Self::new(
            drafts,
            Arc::new(SimulatedSink::new(timing.save_delay)),
            timing.debounce,
        )
    }

    /// Re-arm the controller after the active draft changed (created,
    /// selected, or deleted): cancels any pending save and suppresses the
    /// next synthetic change.
    pub fn rebind(&mut self) {
        self.cancel_pending();
        self.skip_next_change = true;
    }

    /// Detach from the form (unmount): cancels any pending save without
    /// applying a status change.
    pub fn detach(&mut self) {
        self.cancel_pending();
    }

    /// Handle a field-level change to the active draft.
    ///
    /// Applies the change to the store immediately (status `dirty`) and
    /// restarts the debounce timer. The derived-field rule runs first: when
    /// the patch moves `start_date`, `end_date` is recomputed as the next
    /// calendar day if it would differ.
    ///
    /// No-op when no draft is active, and consumes (without applying) the
    /// one synthetic change after a rebind.
    pub fn field_changed(&mut self, mut patch: FormPatch) {
        let (draft_id, current_end) = {
            let store = self.drafts.lock();
            match store.active() {
                Some(draft) => (draft.id.clone(), draft.data.end_date.clone()),
                None => return,
            }
        };

        if self.skip_next_change {
            self.skip_next_change = false;
            return;
        }

        if let Some(start) = patch.start_date.as_deref() {
            if let Some(computed) = next_day(start) {
                let effective_end = patch.end_date.as_deref().unwrap_or(current_end.as_str());
                if effective_end != computed {
                    patch.end_date = Some(computed);
                }
            }
        }

        self.drafts.lock().patch_active_draft_data(&patch);
        self.schedule_save(&draft_id);
    }

    /// Check whether a save sequence is scheduled or in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn schedule_save(&mut self, draft_id: &str) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let drafts = Arc::clone(&self.drafts);
        let sink = Arc::clone(&self.sink);
        let counter = Arc::clone(&self.generation);
        let debounce = self.debounce;
        let draft_id = draft_id.to_string();

        debug!(draft_id = %draft_id, "autosave debounce restarted");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let data = {
                let mut store = drafts.lock();
                if counter.load(Ordering::SeqCst) != generation {
                    return;
                }
                store.set_active_draft_status(DraftStatus::Saving);
                match store.active() {
                    Some(draft) => draft.data.clone(),
                    None => return,
                }
            };

            let result = sink.persist(&draft_id, &data).await;

            let mut store = drafts.lock();
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }
            match result {
                Ok(()) => store.set_active_draft_status(DraftStatus::Saved),
                Err(err) => {
                    warn!(draft_id = %draft_id, error = %err, "draft save failed");
                    store.set_active_draft_status(DraftStatus::Error);
                }
            }
        }));
    }

    fn cancel_pending(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for AutosaveController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
