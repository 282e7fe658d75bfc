//! `servicelog` - drafting, autosave, and records core for vehicle service logs
//!
//! This library implements the state core of a service-log recording
//! application: editable drafts with debounced autosave, validated
//! submission into an ordered list of records, pure filter queries over
//! that list, and snapshot persistence to local key-value storage.
//! Rendering is left to a presentation layer; this crate exposes the data
//! it consumes and accepts the events it emits.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod autosave;
pub mod config;
pub mod dates;
pub mod draft;
pub mod error;
pub mod filter;
pub mod form;
pub mod logbook;
pub mod logging;
pub mod session;
pub mod storage;
pub mod validate;

pub use autosave::{AutosaveController, AutosaveTiming, SaveSink, SimulatedSink};
pub use config::Config;
pub use draft::{Draft, DraftStatus, DraftStore};
pub use error::{Error, Result};
pub use filter::LogFilter;
pub use form::{FormPatch, ServiceLogFormData, ServiceType};
pub use logbook::{LogStore, ServiceLog};
pub use logging::init_logging;
pub use session::{Session, SubmitOutcome};
pub use storage::{Snapshot, Storage};
pub use validate::{validate, ValidationErrors};
