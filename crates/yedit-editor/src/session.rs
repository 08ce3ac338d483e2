//! # Editor Session State Machine
//!
//! Tracks the lifecycle of one editing session and the generation counter
//! used to discard stale asynchronous results.
//!
//! ## States
//!
//! ```text
//! Unmounted ──▶ Mounted ──▶ ConfigChanging ──▶ Mounted
//!                  │  ◀──────────────────────────┘
//!                  └──▶ Unmounted
//! ```
//!
//! ## Generations
//!
//! The generation increases on mount, on every applied reconfiguration and
//! on unmount. Work started for one generation carries a
//! [`ValidationTicket`]; its result is applied only while the session is
//! mounted at that same generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use yedit_core::{SessionError, SessionId};

// ─── Session State ───────────────────────────────────────────────────

/// The lifecycle state of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// No live surface.
    Unmounted,
    /// A live surface is attached and editable per its read-only flag.
    Mounted,
    /// A new diagnostics configuration is being applied.
    ConfigChanging,
}

impl SessionState {
    /// Whether a live surface is attached.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Mounted | Self::ConfigChanging)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unmounted => "UNMOUNTED",
            Self::Mounted => "MOUNTED",
            Self::ConfigChanging => "CONFIG_CHANGING",
        };
        f.write_str(s)
    }
}

// ─── Transition Records ──────────────────────────────────────────────

/// Record of a session state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTransitionRecord {
    /// State before the transition.
    pub from_state: SessionState,
    /// State after the transition.
    pub to_state: SessionState,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
    /// Reason for the transition.
    pub reason: String,
}

/// Identifies the session generation a piece of work was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationTicket {
    /// The session.
    pub session: SessionId,
    /// Its generation when the work started.
    pub generation: u64,
}

// ─── Session ─────────────────────────────────────────────────────────

/// One editing session's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    state: SessionState,
    generation: u64,
    transitions: Vec<SessionTransitionRecord>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A new, unmounted session.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Unmounted,
            generation: 0,
            transitions: Vec::new(),
        }
    }

    /// Session identity.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ordered log of all transitions.
    pub fn transitions(&self) -> &[SessionTransitionRecord] {
        &self.transitions
    }

    /// Ticket for work started now.
    pub fn ticket(&self) -> ValidationTicket {
        ValidationTicket {
            session: self.id,
            generation: self.generation,
        }
    }

    /// Whether a result carrying `ticket` may still be applied.
    pub fn accepts(&self, ticket: &ValidationTicket) -> bool {
        self.state == SessionState::Mounted
            && ticket.session == self.id
            && ticket.generation == self.generation
    }

    /// `Unmounted → Mounted`.
    pub fn mount(&mut self, reason: &str) -> Result<(), SessionError> {
        self.require_state(SessionState::Unmounted, SessionState::Mounted)?;
        self.generation += 1;
        self.do_transition(SessionState::Mounted, reason);
        Ok(())
    }

    /// `Mounted → ConfigChanging`.
    pub fn begin_reconfigure(&mut self, reason: &str) -> Result<(), SessionError> {
        self.require_state(SessionState::Mounted, SessionState::ConfigChanging)?;
        self.do_transition(SessionState::ConfigChanging, reason);
        Ok(())
    }

    /// `ConfigChanging → Mounted`. The generation advances only when the
    /// new configuration was applied.
    pub fn finish_reconfigure(&mut self, applied: bool, reason: &str) -> Result<(), SessionError> {
        self.require_state(SessionState::ConfigChanging, SessionState::Mounted)?;
        if applied {
            self.generation += 1;
        }
        self.do_transition(SessionState::Mounted, reason);
        Ok(())
    }

    /// `Mounted → Unmounted`.
    pub fn unmount(&mut self, reason: &str) -> Result<(), SessionError> {
        self.require_state(SessionState::Mounted, SessionState::Unmounted)?;
        self.generation += 1;
        self.do_transition(SessionState::Unmounted, reason);
        Ok(())
    }

    /// Fail unless the session is in `expected`.
    pub fn require_state(
        &self,
        expected: SessionState,
        target: SessionState,
    ) -> Result<(), SessionError> {
        if self.state != expected {
            return Err(SessionError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: SessionState, reason: &str) {
        self.transitions.push(SessionTransitionRecord {
            from_state: self.state,
            to_state: to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.state = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> Session {
        let mut s = Session::new();
        s.mount("mount").unwrap();
        s
    }

    #[test]
    fn test_new_session_is_unmounted() {
        let s = Session::new();
        assert_eq!(s.state(), SessionState::Unmounted);
        assert_eq!(s.generation(), 0);
        assert!(s.transitions().is_empty());
        assert!(!s.state().is_live());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut s = mounted();
        s.begin_reconfigure("props changed").unwrap();
        assert!(s.state().is_live());
        s.finish_reconfigure(true, "configuration applied").unwrap();
        s.unmount("host removed editor").unwrap();

        let path: Vec<(SessionState, SessionState)> = s
            .transitions()
            .iter()
            .map(|t| (t.from_state, t.to_state))
            .collect();
        assert_eq!(
            path,
            vec![
                (SessionState::Unmounted, SessionState::Mounted),
                (SessionState::Mounted, SessionState::ConfigChanging),
                (SessionState::ConfigChanging, SessionState::Mounted),
                (SessionState::Mounted, SessionState::Unmounted),
            ]
        );
        assert_eq!(s.transitions()[1].reason, "props changed");
        assert_eq!(s.generation(), 3);
    }

    #[test]
    fn test_rejected_reconfigure_keeps_generation() {
        let mut s = mounted();
        let before = s.generation();
        s.begin_reconfigure("props changed").unwrap();
        s.finish_reconfigure(false, "configuration rejected").unwrap();
        assert_eq!(s.generation(), before);
        assert_eq!(s.state(), SessionState::Mounted);
    }

    #[test]
    fn test_cannot_mount_twice() {
        let mut s = mounted();
        let err = s.mount("again").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                from: "MOUNTED".to_string(),
                to: "MOUNTED".to_string(),
            }
        );
    }

    #[test]
    fn test_cannot_unmount_while_config_changing() {
        let mut s = mounted();
        s.begin_reconfigure("props changed").unwrap();
        assert!(s.unmount("gone").is_err());
        assert!(s.begin_reconfigure("again").is_err());
    }

    #[test]
    fn test_cannot_reconfigure_unmounted() {
        let mut s = Session::new();
        assert!(s.begin_reconfigure("props changed").is_err());
        assert!(s.finish_reconfigure(true, "x").is_err());
        assert!(s.unmount("x").is_err());
    }

    #[test]
    fn test_tickets_expire_on_generation_change() {
        let mut s = mounted();
        let ticket = s.ticket();
        assert!(s.accepts(&ticket));

        s.begin_reconfigure("props changed").unwrap();
        assert!(!s.accepts(&ticket));
        s.finish_reconfigure(true, "applied").unwrap();
        assert!(!s.accepts(&ticket));
        assert!(s.accepts(&s.ticket()));

        let late = s.ticket();
        s.unmount("gone").unwrap();
        assert!(!s.accepts(&late));
    }

    #[test]
    fn test_ticket_from_other_session_rejected() {
        let a = mounted();
        let b = mounted();
        assert!(!a.accepts(&b.ticket()));
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Unmounted.to_string(), "UNMOUNTED");
        assert_eq!(SessionState::Mounted.to_string(), "MOUNTED");
        assert_eq!(SessionState::ConfigChanging.to_string(), "CONFIG_CHANGING");
    }

    #[test]
    fn test_session_serialization() {
        let s = mounted();
        let json = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), s.id());
        assert_eq!(back.transitions(), s.transitions());
    }
}
