//! Transport-agnostic application state.
//!
//! `CoreState` is built once at startup and shared behind an `Arc` by every
//! HTTP handler. The classifier and the reference cohort are read-only after
//! load; the session cache is the only mutable part and sits behind a
//! `RwLock`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use uuid::Uuid;

use crate::config::{AppConfig, ConfigError};
use crate::models::patient::PatientForm;
use crate::models::prediction::HistoryEntry;
use crate::pipeline::classifier::{Classifier, LoadedModel, ModelError};
use crate::pipeline::processor::{self, Outcome};
use crate::pipeline::reference::{DatasetError, ReferenceStats};
use crate::session_cache::SessionCache;

// ═══════════════════════════════════════════════════════════
// CoreState: shared by every handler
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: AppConfig,
    /// Loaded once; never swapped while serving.
    classifier: Arc<dyn Classifier>,
    reference: ReferenceStats,
    /// Per-browser-session prediction history.
    sessions: RwLock<SessionCache>,
    /// Successful predictions since startup, all sessions.
    predictions_served: AtomicU64,
}

impl CoreState {
    pub fn new(
        config: AppConfig,
        classifier: Arc<dyn Classifier>,
        reference: ReferenceStats,
    ) -> Self {
        let sessions = SessionCache::new(
            config.history_limit,
            Duration::from_secs(config.session_idle_timeout_secs),
        );
        Self {
            config,
            classifier,
            reference,
            sessions: RwLock::new(sessions),
            predictions_served: AtomicU64::new(0),
        }
    }

    /// Load the model artifact and the reference cohort named in `config`.
    ///
    /// Either file missing or malformed is fatal: nothing can be served.
    pub fn load(config: AppConfig) -> Result<Self, StartupError> {
        let model = LoadedModel::load(&config.model_path)?;
        let reference = ReferenceStats::load(&config.dataset_path)?;
        Ok(Self::new(config, Arc::new(model), reference))
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn reference(&self) -> &ReferenceStats {
        &self.reference
    }

    pub fn predictions_served(&self) -> u64 {
        self.predictions_served.load(Ordering::Relaxed)
    }

    // ── Session cache access ────────────────────────────────

    pub fn read_sessions(&self) -> Result<RwLockReadGuard<'_, SessionCache>, CoreError> {
        self.sessions.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_sessions(&self) -> Result<RwLockWriteGuard<'_, SessionCache>, CoreError> {
        self.sessions.write().map_err(|_| CoreError::LockPoisoned)
    }

    /// Run one form submission for a session.
    ///
    /// The outer `Result` only fails on lock poisoning. Bad input and
    /// inference failures come back as `Outcome::Failure`.
    pub fn submit(&self, session_id: Uuid, form: &PatientForm) -> Result<Outcome, CoreError> {
        let outcome = {
            let mut sessions = self.write_sessions()?;
            let history = sessions.history_mut(session_id);
            processor::process_submission(self.classifier(), &self.reference, history, form)
        };
        if outcome.is_success() {
            self.predictions_served.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(session = %session_id, "Prediction served");
        }
        Ok(outcome)
    }

    /// Snapshot of a session's history, oldest first. Empty for unknown sessions.
    pub fn history(&self, session_id: &Uuid) -> Result<Vec<HistoryEntry>, CoreError> {
        let sessions = self.read_sessions()?;
        Ok(sessions
            .history(session_id)
            .map(|h| h.all().to_vec())
            .unwrap_or_default())
    }

    /// Mark a session as active.
    pub fn touch(&self, session_id: &Uuid) -> Result<(), CoreError> {
        self.write_sessions()?.touch(session_id);
        Ok(())
    }

    /// Drop sessions idle past the configured timeout.
    pub fn sweep_idle_sessions(&self) -> Result<usize, CoreError> {
        let evicted = self.write_sessions()?.evict_idle();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle sessions");
        }
        Ok(evicted)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Failures that stop the service before it can take a request.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    /// Static message shown to the operator before exiting.
    pub fn user_message(&self) -> String {
        match self {
            Self::Model(ModelError::NotFound(path)) => format!(
                "Stroke model file not found! Make sure '{}' exists.",
                path.display()
            ),
            Self::Dataset(DatasetError::NotFound(path)) => format!(
                "Dataset file not found! Make sure '{}' exists.",
                path.display()
            ),
            other => other.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Test fixtures
// ═══════════════════════════════════════════════════════════
