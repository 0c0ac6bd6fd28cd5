//! In-memory sessions between ingest and finalize.
//!
//! A host that lets a user review extracted metadata before rendering keeps
//! the ingested diagram here. Sessions expire after a fixed time-to-live;
//! every operation takes the current instant so expiry is deterministic.

use std::{
    collections::HashMap,
    fmt,
    time::{Duration, Instant},
};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use sopwright_core::graph::ProcessGraph;

use crate::synthesize::UserEdits;

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An ingested diagram and the edits collected for it so far.
#[derive(Debug, Clone)]
pub struct Session {
    markup: String,
    graph: ProcessGraph,
    edits: UserEdits,
    touched: Instant,
}

impl Session {
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn graph(&self) -> &ProcessGraph {
        &self.graph
    }

    pub fn edits(&self) -> &UserEdits {
        &self.edits
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} does not exist")]
    NotFound(SessionId),

    #[error("session {0} has expired")]
    Expired(SessionId),
}

/// Sessions keyed by [`SessionId`].
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    /// Sessions untouched for longer than `ttl` expire.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: HashMap::new(),
        }
    }

    /// Stores an ingested diagram and returns its id.
    pub fn open(&mut self, markup: impl Into<String>, graph: ProcessGraph, now: Instant) -> SessionId {
        let id = SessionId::generate();
        self.sessions.insert(
            id,
            Session {
                markup: markup.into(),
                graph,
                edits: UserEdits::default(),
                touched: now,
            },
        );
        debug!(session:% = id, open = self.sessions.len(); "Session opened");
        id
    }

    /// Looks up a live session and refreshes its expiry.
    pub fn get(&mut self, id: SessionId, now: Instant) -> Result<&Session, SessionError> {
        self.live(id, now).map(|session| &*session)
    }

    /// Merges `edits` into the session's edits.
    pub fn update_edits(
        &mut self,
        id: SessionId,
        edits: UserEdits,
        now: Instant,
    ) -> Result<&Session, SessionError> {
        let session = self.live(id, now)?;
        session.edits.merge(edits);
        Ok(session)
    }

    /// Removes a session, returning it if it existed.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    /// Drops every expired session and returns how many were dropped.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions
            .retain(|_, session| now.saturating_duration_since(session.touched) <= ttl);
        let purged = before - self.sessions.len();
        if purged > 0 {
            debug!(purged, open = self.sessions.len(); "Expired sessions purged");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn live(&mut self, id: SessionId, now: Instant) -> Result<&mut Session, SessionError> {
        let ttl = self.ttl;
        let expired = self
            .sessions
            .get(&id)
            .map(|session| now.saturating_duration_since(session.touched) > ttl)
            .ok_or(SessionError::NotFound(id))?;
        if expired {
            self.sessions.remove(&id);
            return Err(SessionError::Expired(id));
        }
        let session = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.touched = now;
        Ok(session)
    }
}
