//! The session store.
//!
//! `SessionStore` holds the current [`Session`] in memory and mirrors every
//! change to a [`SessionStorage`] backend before it becomes visible. The
//! token and user are always written in one batch and removed in one batch,
//! so durable storage never holds half a session.
//!
//! Every change of authentication state bumps a *generation* counter.
//! Callers that start asynchronous work against the session (network calls)
//! capture the generation first and use [`SessionStore::clear_if_current`]
//! or [`SessionStore::replace_user`] so that a late result cannot clobber a
//! newer session.

use std::sync::Arc;

use parking_lot::RwLock;
use pflow_core::{Session, User, UserId};

use crate::error::{Result, StoreError};
use crate::keys::{SESSION_KEYS, TOKEN, USER};
use crate::SessionStorage;

#[derive(Debug, Default)]
struct State {
    session: Session,
    generation: u64,
}

/// Owner of the authenticated session and its durable copy.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<State>,
}

impl SessionStore {
    /// Restore the session persisted in `storage`.
    ///
    /// Missing, partial or malformed data yields the empty session. Partial
    /// or malformed leftovers are removed so storage matches memory.
    #[must_use]
    pub fn load(storage: Arc<dyn SessionStorage>) -> Self {
        let session = match Self::read_persisted(storage.as_ref()) {
            Ok(Some(session)) => {
                tracing::debug!(user_id = %session.user.id, "Restored persisted session");
                session
            }
            Ok(None) => Session::empty(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted session");
                if let Err(e) = storage.remove_batch(&SESSION_KEYS) {
                    tracing::error!(error = %e, "Failed to remove unreadable session");
                }
                Session::empty()
            }
        };

        Self {
            storage,
            state: RwLock::new(State {
                session,
                generation: 0,
            }),
        }
    }

    fn read_persisted(storage: &dyn SessionStorage) -> Result<Option<Session>> {
        let token = storage.get(TOKEN)?.unwrap_or_default();
        let user = storage.get(USER)?;

        match (token.is_empty(), user) {
            (true, None) => Ok(None),
            (false, Some(user)) => {
                let user: User = serde_json::from_str(&user)?;
                Ok(Some(Session::new(token, user)))
            }
            _ => Err(StoreError::InvalidSession("persisted session is partial")),
        }
    }

    /// Replace the session with `token` and `user`, persisting both first.
    ///
    /// Returns the new generation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSession` for an empty token and a storage error if the
    /// session could not be persisted. In both cases the in-memory session is
    /// unchanged.
    pub fn set(&self, token: impl Into<String>, user: User) -> Result<u64> {
        let token = token.into();
        if token.is_empty() {
            return Err(StoreError::InvalidSession("token must not be empty"));
        }
        let user_json = serde_json::to_string(&user)?;

        let mut state = self.state.write();
        self.storage
            .put_batch(&[(TOKEN, token.as_str()), (USER, user_json.as_str())])?;

        state.session = Session::new(token, user);
        state.generation += 1;
        tracing::info!(
            user_id = %state.session.user.id,
            role = state.session.role_code(),
            generation = state.generation,
            "Session established"
        );
        Ok(state.generation)
    }

    /// Reset to the empty session and remove both persisted values.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted values could not be removed;
    /// the in-memory session is then unchanged.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.write();
        self.clear_locked(&mut state)
    }

    /// Clear the session only if it is still at `generation`.
    ///
    /// Returns `true` if the session was cleared, `false` if a newer session
    /// has been established (or cleared) since `generation` was observed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted values could not be removed.
    pub fn clear_if_current(&self, generation: u64) -> Result<bool> {
        let mut state = self.state.write();
        if state.generation != generation {
            tracing::debug!(
                expected = generation,
                current = state.generation,
                "Ignoring clear for superseded session"
            );
            return Ok(false);
        }
        self.clear_locked(&mut state)?;
        Ok(true)
    }

    fn clear_locked(&self, state: &mut State) -> Result<()> {
        self.storage.remove_batch(&SESSION_KEYS)?;

        if state.session.is_authenticated() {
            state.generation += 1;
            tracing::info!(generation = state.generation, "Session cleared");
        }
        state.session = Session::empty();
        Ok(())
    }

    /// Replace the user while keeping the current token.
    ///
    /// Applies only if the session is authenticated and still at
    /// `generation`; returns whether it applied. The generation does not
    /// change: the session is the same, only its profile is refreshed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session could not be persisted.
    pub fn replace_user(&self, generation: u64, user: User) -> Result<bool> {
        let mut state = self.state.write();
        if state.generation != generation || !state.session.is_authenticated() {
            tracing::debug!(
                expected = generation,
                current = state.generation,
                "Ignoring profile refresh for superseded session"
            );
            return Ok(false);
        }

        let user_json = serde_json::to_string(&user)?;
        self.storage.put_batch(&[
            (TOKEN, state.session.token.as_str()),
            (USER, user_json.as_str()),
        ])?;
        state.session.user = user;
        Ok(true)
    }

    /// A copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.read().session.clone()
    }

    /// The current token and the generation it belongs to, read together.
    #[must_use]
    pub fn credentials(&self) -> (Option<String>, u64) {
        let state = self.state.read();
        let token = state
            .session
            .is_authenticated()
            .then(|| state.session.token.clone());
        (token, state.generation)
    }

    /// The current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Returns `true` iff the token is non-empty.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().session.is_authenticated()
    }

    /// Returns `true` iff the current user's role code is in `allowed`.
    /// Always `false` when unauthenticated.
    #[must_use]
    pub fn has_role<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        self.state.read().session.has_role(allowed)
    }

    /// The current role code, `""` when unauthenticated.
    #[must_use]
    pub fn role_code(&self) -> String {
        self.state.read().session.role_code().to_string()
    }

    /// The current user's id, unset when unauthenticated.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        let state = self.state.read();
        if state.session.is_authenticated() {
            state.session.user.id
        } else {
            UserId::default()
        }
    }

    /// A copy of the current user profile.
    #[must_use]
    pub fn user(&self) -> User {
        self.state.read().session.user.clone()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SessionStore")
            .field("authenticated", &state.session.is_authenticated())
            .field("user_id", &state.session.user.id)
            .field("generation", &state.generation)
            .finish_non_exhaustive()
    }
}
