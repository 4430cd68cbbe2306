//! Session marker: the signed-in user's identifier kept under one fixed key.
//!
//! There is no session object, token or expiry. The marker is either absent
//! or holds a single string, and each operation maps onto exactly one store
//! call.

use std::sync::Arc;

use tracing::debug;

use crate::errors::StoreError;
use crate::storage::KvStore;

/// Key the marker lives under. Other readers of the same store rely on it.
pub const USER_KEY: &str = "user";

/// Observable marker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Absent,
    Present(String),
}

impl From<Option<String>> for SessionState {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(user) => SessionState::Present(user),
            None => SessionState::Absent,
        }
    }
}

/// Records, clears and reads the signed-in user in an injected store.
#[derive(Clone)]
pub struct SessionMarker {
    store: Arc<dyn KvStore>,
}

impl SessionMarker {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Mark `user` as signed in, replacing any previous marker.
    /// The value is stored verbatim; empty strings are accepted.
    pub fn sign_in(&self, user: &str) -> Result<(), StoreError> {
        debug!(key = USER_KEY, "sign in");
        self.store.set(USER_KEY, user)
    }

    /// Clear the marker. A no-op when nobody is signed in.
    pub fn sign_out(&self) -> Result<(), StoreError> {
        debug!(key = USER_KEY, "sign out");
        self.store.remove(USER_KEY)
    }

    /// The currently signed-in user, or `None`.
    pub fn authenticated_user(&self) -> Result<Option<String>, StoreError> {
        self.store.get(USER_KEY)
    }

    pub fn state(&self) -> Result<SessionState, StoreError> {
        self.authenticated_user().map(SessionState::from)
    }

    pub fn is_signed_in(&self) -> Result<bool, StoreError> {
        Ok(self.authenticated_user()?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn marker() -> (Arc<MemoryStore>, SessionMarker) {
        let store = Arc::new(MemoryStore::new());
        let marker = SessionMarker::new(store.clone());
        (store, marker)
    }

    #[test]
    fn sign_in_then_read_returns_exact_value() -> Result<(), anyhow::Error> {
        let (_, marker) = marker();
        for user in ["alice", "", "  spaced  ", "ユーザー", "a\"b\\c\n"] {
            marker.sign_in(user)?;
            assert_eq!(marker.authenticated_user()?.as_deref(), Some(user));
        }
        Ok(())
    }

    #[test]
    fn later_sign_in_overwrites() -> Result<(), anyhow::Error> {
        let (store, marker) = marker();
        marker.sign_in("alice")?;
        marker.sign_in("bob")?;
        assert_eq!(marker.authenticated_user()?.as_deref(), Some("bob"));
        assert_eq!(store.len()?, 1);
        Ok(())
    }

    #[test]
    fn sign_out_when_absent_is_noop() -> Result<(), anyhow::Error> {
        let (_, marker) = marker();
        marker.sign_out()?;
        marker.sign_out()?;
        assert_eq!(marker.state()?, SessionState::Absent);
        Ok(())
    }

    #[test]
    fn sign_out_clears_marker() -> Result<(), anyhow::Error> {
        let (_, marker) = marker();
        marker.sign_in("x")?;
        assert!(marker.is_signed_in()?);
        marker.sign_out()?;
        assert_eq!(marker.authenticated_user()?, None);
        assert!(!marker.is_signed_in()?);
        Ok(())
    }

    #[test]
    fn second_sign_out_matches_first() -> Result<(), anyhow::Error> {
        let (store, marker) = marker();
        store.set("theme", "dark")?;
        marker.sign_in("alice")?;

        marker.sign_out()?;
        let after_one = (marker.state()?, store.len()?);
        marker.sign_out()?;
        let after_two = (marker.state()?, store.len()?);

        assert_eq!(after_one, (SessionState::Absent, 1));
        assert_eq!(after_one, after_two);
        Ok(())
    }

    #[test]
    fn uses_fixed_user_key() -> Result<(), anyhow::Error> {
        let (store, marker) = marker();
        marker.sign_in("carol")?;
        assert_eq!(store.get("user")?.as_deref(), Some("carol"));
        store.set("user", "dave")?;
        assert_eq!(marker.state()?, SessionState::Present("dave".into()));
        Ok(())
    }

    mod proptest_marker {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any string, empty or not, reads back verbatim.
            #[test]
            fn sign_in_reads_back_verbatim(user in any::<String>()) {
                let (_, marker) = marker();
                marker.sign_in(&user).map_err(|e| TestCaseError::fail(e.to_string()))?;
                let read = marker.authenticated_user().map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(read, Some(user));
            }

            /// Sign-out after any sign-in leaves the marker absent.
            #[test]
            fn sign_in_then_sign_out_is_absent(user in any::<String>()) {
                let (_, marker) = marker();
                marker.sign_in(&user).map_err(|e| TestCaseError::fail(e.to_string()))?;
                marker.sign_out().map_err(|e| TestCaseError::fail(e.to_string()))?;
                let state = marker.state().map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(state, SessionState::Absent);
            }
        }
    }
}
