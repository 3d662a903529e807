//! Session lifecycle states and the pure transition function

use serde::Serialize;
use std::fmt;

/// Editor code reported when the session credential has expired
pub const CREDENTIAL_EXPIRED_CODE: i64 = 5101;
/// Editor code reported when the session is corrupted beyond repair
pub const SESSION_CORRUPTED_CODE: i64 = 5102;

/// Lifecycle state of one editor session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Active,
    Refreshing,
    /// Terminal; the session must be recreated
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Active => "active",
            SessionState::Refreshing => "refreshing",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A first token request was started
    TokenRequested,
    /// The auth service issued a credential
    TokenIssued,
    /// The auth service failed or rejected the request
    TokenRejected,
    /// Editor code 5101
    CredentialExpired,
    /// Editor code 5102
    SessionCorrupted,
    /// Any other editor code; logged and ignored
    Unrecognized(i64),
}

impl SessionEvent {
    /// Map an editor error code to an event
    pub fn from_code(code: i64) -> Self {
        match code {
            CREDENTIAL_EXPIRED_CODE => SessionEvent::CredentialExpired,
            SESSION_CORRUPTED_CODE => SessionEvent::SessionCorrupted,
            other => SessionEvent::Unrecognized(other),
        }
    }
}

/// Next state for `state` after `event`.
///
/// Pairs not listed leave the state unchanged. `Failed` absorbs everything.
pub fn transition(state: SessionState, event: SessionEvent) -> SessionState {
    use SessionEvent as E;
    use SessionState as S;

    match (state, event) {
        (S::Failed, _) => S::Failed,
        (_, E::SessionCorrupted) => S::Failed,

        (S::Unauthenticated, E::TokenRequested) => S::Authenticating,
        (S::Authenticating, E::TokenIssued) => S::Active,
        (S::Authenticating, E::TokenRejected) => S::Failed,

        (S::Active, E::CredentialExpired) => S::Refreshing,
        (S::Refreshing, E::TokenIssued) => S::Active,
        (S::Refreshing, E::TokenRejected) => S::Failed,

        (state, _) => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let s = transition(SessionState::Unauthenticated, SessionEvent::TokenRequested);
        assert_eq!(s, SessionState::Authenticating);
        let s = transition(s, SessionEvent::TokenIssued);
        assert_eq!(s, SessionState::Active);
        let s = transition(s, SessionEvent::from_code(5101));
        assert_eq!(s, SessionState::Refreshing);
        let s = transition(s, SessionEvent::TokenIssued);
        assert_eq!(s, SessionState::Active);
    }

    #[test]
    fn test_corruption_is_terminal() {
        let s = transition(SessionState::Active, SessionEvent::from_code(5102));
        assert_eq!(s, SessionState::Failed);
        for event in [
            SessionEvent::TokenRequested,
            SessionEvent::TokenIssued,
            SessionEvent::CredentialExpired,
        ] {
            assert_eq!(transition(s, event), SessionState::Failed);
        }
    }

    #[test]
    fn test_failed_refresh() {
        assert_eq!(
            transition(SessionState::Refreshing, SessionEvent::TokenRejected),
            SessionState::Failed
        );
        assert_eq!(
            transition(SessionState::Authenticating, SessionEvent::TokenRejected),
            SessionState::Failed
        );
    }

    #[test]
    fn test_unrecognized_codes_are_ignored() {
        assert_eq!(SessionEvent::from_code(1000), SessionEvent::Unrecognized(1000));
        assert_eq!(
            transition(SessionState::Active, SessionEvent::from_code(1000)),
            SessionState::Active
        );
        // no credential yet, nothing to refresh
        assert_eq!(
            transition(SessionState::Unauthenticated, SessionEvent::CredentialExpired),
            SessionState::Unauthenticated
        );
        // a second expiry while refreshing joins the refresh in flight
        assert_eq!(
            transition(SessionState::Refreshing, SessionEvent::CredentialExpired),
            SessionState::Refreshing
        );
    }

    #[test]
    fn test_state_wire_names() {
        assert_eq!(
            serde_json::to_value(SessionState::Refreshing).unwrap(),
            serde_json::json!("refreshing")
        );
        assert_eq!(SessionState::Unauthenticated.to_string(), "unauthenticated");
    }
}
