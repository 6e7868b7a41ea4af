//! Per-browser sessions for the web UI.
//!
//! A session owns at most one API credential. Terminating a session drops
//! that credential; other sessions and the process environment are
//! unaffected. Idle sessions expire, and the registry never holds more than
//! `max_sessions` entries.

use crate::config::GatewayConfig;
use crate::error::InputError;
use crate::llm::SessionCredential;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug)]
struct Session {
    credential: Option<SessionCredential>,
    revoked: bool,
    created_at: DateTime<Utc>,
    last_used: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant, idle_ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_used) >= idle_ttl
    }
}

/// Outcome of looking up a session's credential.
#[derive(Debug)]
pub enum SessionLookup {
    Active(SessionCredential),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self::from(&GatewayConfig::default())
    }
}

impl From<&GatewayConfig> for SessionLimits {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            idle_ttl: Duration::from_secs(config.session_ttl_secs),
            max_sessions: config.max_sessions.max(1),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Session>>,
    default_credential: Option<SessionCredential>,
    limits: SessionLimits,
}

impl SessionRegistry {
    /// New sessions start with a copy of `default_credential`, if any.
    pub fn new(default_credential: Option<SessionCredential>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            default_credential,
            limits: SessionLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = SessionLimits {
            max_sessions: limits.max_sessions.max(1),
            ..limits
        };
        self
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    /// Open a session, first dropping expired ones and, at capacity, the
    /// least recently used.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.lock();
        self.prune(&mut sessions, now);
        sessions.insert(
            id,
            Session {
                credential: self.default_credential.clone(),
                revoked: false,
                created_at: Utc::now(),
                last_used: now,
            },
        );
        tracing::debug!(session = %id, live = sessions.len(), "session created");
        id
    }

    /// Mark a live session as used. Returns `false` for unknown or expired
    /// sessions; an expired one is removed.
    pub fn touch(&self, id: Uuid) -> bool {
        let now = Instant::now();
        let mut sessions = self.lock();
        match sessions.get_mut(&id) {
            Some(session) if !session.is_expired(now, self.limits.idle_ttl) => {
                session.last_used = now;
                true
            }
            Some(_) => {
                sessions.remove(&id);
                tracing::debug!(session = %id, "session expired");
                false
            }
            None => false,
        }
    }

    /// The credential a run in this session should use.
    pub fn credential(&self, id: Uuid) -> Result<SessionLookup, InputError> {
        if !self.touch(id) {
            return Ok(SessionLookup::Unknown);
        }
        let sessions = self.lock();
        let Some(session) = sessions.get(&id) else {
            return Ok(SessionLookup::Unknown);
        };
        if session.revoked {
            return Err(InputError::CredentialRevoked);
        }
        session
            .credential
            .clone()
            .map(SessionLookup::Active)
            .ok_or(InputError::MissingCredential {
                var: crate::llm::credentials::CREDENTIAL_ENV_VARS[1],
            })
    }

    /// Drop the session's credential. Returns `false` for unknown sessions.
    ///
    /// A run already in flight keeps the copy its provider was built with
    /// and finishes with it; later runs in this session are refused.
    pub fn revoke(&self, id: Uuid) -> bool {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(&id) else {
            return false;
        };
        session.credential = None;
        session.revoked = true;
        tracing::info!(
            session = %id,
            age_secs = (Utc::now() - session.created_at).num_seconds(),
            "session credential revoked"
        );
        true
    }

    pub fn is_revoked(&self, id: Uuid) -> bool {
        self.lock().get(&id).is_some_and(|session| session.revoked)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, self.limits.idle_ttl));

        // Room for one more; revoked sessions hold no key and go first.
        let overflow = (sessions.len() + 1).saturating_sub(self.limits.max_sessions);
        if overflow > 0 {
            let mut victims: Vec<(bool, Instant, Uuid)> = sessions
                .iter()
                .map(|(id, session)| (!session.revoked, session.last_used, *id))
                .collect();
            victims.sort_unstable();
            for (_, _, id) in victims.into_iter().take(overflow) {
                sessions.remove(&id);
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, live = sessions.len(), "sessions pruned");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
