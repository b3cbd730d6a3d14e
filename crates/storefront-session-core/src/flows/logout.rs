use std::sync::Arc;

use tracing::{debug, info};

use super::Navigator;
use crate::config::Routes;
use crate::session::SessionStore;
use crate::storage::TokenStore;

/// Explicit sign-out, waiting on the user's confirmation.
///
/// A `LogoutFlow` only exists in the confirming state. `cancel` and
/// `confirm` both consume it, so exactly one of them can happen; either way
/// the flow ends by navigating away.
pub struct LogoutFlow {
    session: SessionStore,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    routes: Routes,
}

impl LogoutFlow {
    pub fn begin(
        session: SessionStore,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        routes: Routes,
    ) -> Self {
        debug!("Logout awaiting confirmation");
        Self {
            session,
            tokens,
            navigator,
            routes,
        }
    }

    /// Back to account settings, nothing changed.
    pub fn cancel(self) {
        debug!("Logout cancelled");
        self.navigator.navigate(&self.routes.account_settings);
    }

    /// Sign out: clear the session, then the stored token and user record,
    /// then the session cookies, then go to the site root.
    pub fn confirm(self) {
        self.session.logout();
        self.tokens.clear();
        info!("Signed out");
        self.navigator.navigate(&self.routes.root);
    }
}
