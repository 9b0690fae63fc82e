//! Usage: Session guard state machine (Unauthenticated / Authenticated) for protected views.

use crate::domain::session::{SessionStore, TokenSet};
use crate::shared::security::mask_token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(TokenSet),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn into_token_set(self) -> Option<TokenSet> {
        match self {
            Self::Authenticated(tokens) => Some(tokens),
            Self::Unauthenticated => None,
        }
    }
}

/// Read the store and classify the session. Presence of a token set is the only criterion:
/// `expires_at` is not consulted, and an unreadable store counts as no session.
pub fn check(store: &dyn SessionStore) -> SessionState {
    match store.load() {
        Ok(Some(tokens)) => {
            tracing::debug!(
                access_token = %mask_token(tokens.access_token()),
                "session guard admitted request"
            );
            SessionState::Authenticated(tokens)
        }
        Ok(None) => SessionState::Unauthenticated,
        Err(err) => {
            tracing::warn!("session store read failed; treating as unauthenticated: {}", err);
            SessionState::Unauthenticated
        }
    }
}
