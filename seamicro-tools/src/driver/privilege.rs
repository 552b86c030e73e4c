//! Session lifecycle state.

use std::fmt;

use crate::error::{DriverError, Result};

/// Lifecycle of a chassis session.
///
/// Transitions only move forward: `Unauthenticated → Authenticated →
/// Elevated → Closed`. `Closed` can be entered from any state and is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    /// No transport yet.
    Unauthenticated,

    /// Logged in, unprivileged shell.
    Authenticated,

    /// `enable` succeeded.
    Elevated,

    /// Transport and channel released.
    Closed,
}

impl SessionState {
    /// Name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated => "authenticated",
            SessionState::Elevated => "elevated",
            SessionState::Closed => "closed",
        }
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Unauthenticated, Authenticated)
                | (Authenticated, Elevated)
                | (Unauthenticated | Authenticated | Elevated, Closed)
        )
    }

    /// Move to `next`, failing if the transition is not allowed.
    pub fn advance(&mut self, next: SessionState, operation: &'static str) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(DriverError::InvalidState {
                operation,
                state: self.as_str(),
            }
            .into());
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    #[test]
    fn test_forward_transitions() {
        let mut state = Unauthenticated;
        state.advance(Authenticated, "authenticate").unwrap();
        state.advance(Elevated, "elevate").unwrap();
        state.advance(Closed, "close").unwrap();
        assert_eq!(state, Closed);
    }

    #[test]
    fn test_closed_reachable_from_everywhere() {
        for state in [Unauthenticated, Authenticated, Elevated] {
            assert!(state.can_transition_to(Closed));
        }
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        assert!(!Elevated.can_transition_to(Authenticated));
        assert!(!Elevated.can_transition_to(Elevated));
        assert!(!Unauthenticated.can_transition_to(Elevated));
        assert!(!Closed.can_transition_to(Authenticated));
        assert!(!Closed.can_transition_to(Closed));
    }

    #[test]
    fn test_advance_reports_state() {
        let mut state = Closed;
        let err = state.advance(Elevated, "elevate").unwrap_err();
        assert!(err.to_string().contains("Cannot elevate while session is closed"));
        assert_eq!(state, Closed);
    }
}
