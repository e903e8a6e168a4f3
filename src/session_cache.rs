//! Per-session prediction history.
//!
//! Each browser session owns an append-only list of past predictions. The
//! cache is keyed by session id so sessions never see each other's entries.
//!
//! Key properties:
//! - History exists only in memory, never persisted
//! - Entries are never edited or removed individually
//! - Idle sessions are evicted wholesale after the configured timeout

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::models::prediction::HistoryEntry;

// ═══════════════════════════════════════════════════════════
// SessionHistory: one session's entries
// ═══════════════════════════════════════════════════════════

/// Append-only, ordered history of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    /// Keep at most this many entries, dropping the oldest. `None` = unbounded.
    limit: Option<usize>,
}

impl SessionHistory {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
            }
        }
    }

    /// All entries, oldest first.
    pub fn all(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// CachedSession: one browser session
// ═══════════════════════════════════════════════════════════

pub struct CachedSession {
    history: SessionHistory,
    last_seen: Instant,
}

impl CachedSession {
    fn new(history_limit: Option<usize>) -> Self {
        Self {
            history: SessionHistory::new(history_limit),
            last_seen: Instant::now(),
        }
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }
}

// ═══════════════════════════════════════════════════════════
// SessionCache: all live sessions
// ═══════════════════════════════════════════════════════════

pub struct SessionCache {
    sessions: HashMap<Uuid, CachedSession>,
    history_limit: Option<usize>,
    idle_timeout: Duration,
}

impl SessionCache {
    pub fn new(history_limit: Option<usize>, idle_timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            history_limit,
            idle_timeout,
        }
    }

    /// Mutable history for a session, creating the session on first use.
    /// Marks the session as active.
    pub fn history_mut(&mut self, session_id: Uuid) -> &mut SessionHistory {
        let limit = self.history_limit;
        let session = self
            .sessions
            .entry(session_id)
            .or_insert_with(|| CachedSession::new(limit));
        session.last_seen = Instant::now();
        &mut session.history
    }

    /// History of a session, if it has one.
    pub fn history(&self, session_id: &Uuid) -> Option<&SessionHistory> {
        self.sessions.get(session_id).map(CachedSession::history)
    }

    /// Mark a session as active without touching its history.
    pub fn touch(&mut self, session_id: &Uuid) {
        if let Some(session) = self.sessions.get_mut(session_id) {
            session.last_seen = Instant::now();
        }
    }

    /// Drop sessions idle longer than the timeout. Returns how many were dropped.
    pub fn evict_idle(&mut self) -> usize {
        let timeout = self.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.idle_for() <= timeout);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
