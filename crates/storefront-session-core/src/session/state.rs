use crate::models::UserRecord;

/// Snapshot of the session. `is_authenticated` is true exactly when a user
/// is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<UserRecord>,
    is_authenticated: bool,
}

/// The only ways a session can change.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Login(UserRecord),
    Logout,
    /// Shallow-merge these fields into the current user.
    Update(UserRecord),
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::Login(_) => "login",
            SessionAction::Logout => "logout",
            SessionAction::Update(_) => "update",
        }
    }
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserRecord) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
        }
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Compute the state that follows `action`, or `None` when the action
    /// leaves nothing observably different.
    ///
    /// `Update` against an empty session is refused: merging into nothing
    /// would produce an authenticated session holding only a fragment of a
    /// user.
    pub fn reduce(&self, action: SessionAction) -> Option<Session> {
        match action {
            SessionAction::Login(user) => Some(Session::authenticated(user)),
            SessionAction::Logout => {
                if self.user.is_none() && !self.is_authenticated {
                    None
                } else {
                    Some(Session::empty())
                }
            }
            SessionAction::Update(partial) => {
                let mut user = self.user.clone()?;
                user.merge(partial);
                Some(Session::authenticated(user))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: serde_json::Value) -> UserRecord {
        UserRecord::from_response(value).unwrap()
    }

    #[test]
    fn test_login_then_logout_is_empty_for_any_user() {
        for u in [
            json!({"id": 7, "name": "Minh"}),
            json!({}),
            json!({"id": "x", "role": "admin", "data": 3}),
        ] {
            let logged_in = Session::empty().reduce(SessionAction::Login(user(u))).unwrap();
            let logged_out = logged_in.reduce(SessionAction::Logout).unwrap();
            assert_eq!(logged_out, Session::empty());
            assert!(!logged_out.is_authenticated());
            assert!(logged_out.user().is_none());
        }
    }

    #[test]
    fn test_logout_when_empty_is_noop() {
        assert_eq!(Session::empty().reduce(SessionAction::Logout), None);
    }

    #[test]
    fn test_update_preserves_unmentioned_keys() {
        let session = Session::authenticated(user(json!({"id": 7, "name": "Minh", "role": "customer"})));
        let next = session
            .reduce(SessionAction::Update(user(json!({"name": "Minh Tran"}))))
            .unwrap();

        assert!(next.is_authenticated());
        assert_eq!(
            next.user(),
            Some(&user(json!({"id": 7, "name": "Minh Tran", "role": "customer"})))
        );
    }

    #[test]
    fn test_update_on_empty_session_is_refused() {
        let partial = user(json!({"name": "Ghost"}));
        assert_eq!(Session::empty().reduce(SessionAction::Update(partial)), None);
    }

    #[test]
    fn test_login_replaces_previous_user() {
        let first = Session::authenticated(user(json!({"id": 1, "name": "A"})));
        let second = first.reduce(SessionAction::Login(user(json!({"id": 2})))).unwrap();
        // login replaces; nothing from the previous user leaks through
        assert_eq!(second.user(), Some(&user(json!({"id": 2}))));
    }
}
