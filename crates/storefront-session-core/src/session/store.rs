use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::{Session, SessionAction};
use crate::models::UserRecord;
use crate::storage::TokenStore;

/// Owner of the authoritative session.
///
/// Clone is cheap and every clone is a handle to the same state; pass it to
/// whatever needs to read or transition the session. Each transition
/// replaces the whole snapshot under the channel lock, so readers never see
/// a user without the matching `is_authenticated` flag, and once a
/// transition method returns every later `snapshot()` reflects it.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    pub fn new(initial: Session) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Build the store from whatever user record durable storage holds.
    ///
    /// No freshness check is made and the token is not consulted: a cached
    /// user is enough to start out authenticated.
    pub fn hydrate(tokens: &TokenStore) -> Self {
        let initial = match tokens.load_user() {
            Ok(Some(user)) => {
                debug!(user_id = ?user.id(), "Session hydrated from storage");
                Session::authenticated(user)
            }
            Ok(None) => Session::empty(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored user, starting signed out");
                Session::empty()
            }
        };
        Self::new(initial)
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Read-only view that is notified on every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Apply a transition. Returns whether the session changed.
    pub fn dispatch(&self, action: SessionAction) -> bool {
        let name = action.name();
        let applied = self.state.send_if_modified(|state| match state.reduce(action) {
            Some(next) => {
                *state = next;
                true
            }
            None => false,
        });
        debug!(action = name, applied, "Session transition");
        applied
    }

    pub fn login(&self, user: UserRecord) {
        self.dispatch(SessionAction::Login(user));
    }

    pub fn logout(&self) {
        self.dispatch(SessionAction::Logout);
    }

    /// Merge `partial` into the current user. Refused (returns `false`, state
    /// untouched) when nobody is signed in.
    pub fn update(&self, partial: UserRecord) -> bool {
        let applied = self.dispatch(SessionAction::Update(partial));
        if !applied {
            warn!("Ignoring profile update with no signed-in user");
        }
        applied
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Session::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryCookieStore, MemoryStore};
    use serde_json::json;

    fn user(value: serde_json::Value) -> UserRecord {
        UserRecord::from_response(value).unwrap()
    }

    fn token_store() -> TokenStore {
        TokenStore::new(Arc::new(MemoryStore::new()), Arc::new(MemoryCookieStore::new()))
    }

    #[test]
    fn test_hydrate_from_stored_user() {
        let tokens = token_store();
        tokens.save_user(&user(json!({"id": 7, "name": "Minh"}))).unwrap();

        // no token stored, still authenticated from the cached record
        let store = SessionStore::hydrate(&tokens);
        assert!(store.is_authenticated());
        assert_eq!(store.snapshot().user().unwrap().display_name(), Some("Minh"));
    }

    #[test]
    fn test_hydrate_without_user_is_empty() {
        let store = SessionStore::hydrate(&token_store());
        assert_eq!(store.snapshot(), Session::empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::default();
        let handle = store.clone();
        handle.login(user(json!({"id": 1})));
        assert!(store.is_authenticated());
        store.logout();
        assert!(!handle.is_authenticated());
    }

    #[test]
    fn test_update_after_login_and_on_empty() {
        let store = SessionStore::default();
        assert!(!store.update(user(json!({"name": "Ghost"}))));
        assert_eq!(store.snapshot(), Session::empty());

        store.login(user(json!({"id": 7, "name": "Minh"})));
        assert!(store.update(user(json!({"role": "vip"}))));
        assert_eq!(
            store.snapshot().user(),
            Some(&user(json!({"id": 7, "name": "Minh", "role": "vip"})))
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions_but_not_noops() {
        let store = SessionStore::default();
        let mut rx = store.subscribe();

        store.logout();
        assert!(!rx.has_changed().unwrap());

        store.login(user(json!({"id": 7})));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        store.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_half_applied_state() {
        let store = SessionStore::default();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..500 {
                    store.login(user(json!({"id": i})));
                    store.logout();
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..3 {
            let store = store.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    let snap = store.snapshot();
                    assert_eq!(snap.is_authenticated(), snap.user().is_some());
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(store.snapshot(), Session::empty());
    }
}
