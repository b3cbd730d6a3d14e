use std::sync::Arc;

use super::{
    Alerts, LogoutFlow, Navigator, OAuthCallbackFlow, VerificationFlow, VerificationPresentation,
};
use crate::api::IdentityClient;
use crate::config::Routes;
use crate::session::SessionStore;
use crate::storage::TokenStore;

/// Everything a page needs to start a flow: the one session store, the
/// token storage, the identity client and the UI collaborators.
#[derive(Clone)]
pub struct AuthContext {
    pub client: Arc<dyn IdentityClient>,
    pub session: SessionStore,
    pub tokens: TokenStore,
    pub navigator: Arc<dyn Navigator>,
    pub alerts: Arc<dyn Alerts>,
    pub routes: Routes,
}

impl AuthContext {
    /// Build a context whose session is hydrated from `tokens`.
    pub fn hydrate(
        client: Arc<dyn IdentityClient>,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        alerts: Arc<dyn Alerts>,
        routes: Routes,
    ) -> Self {
        Self {
            client,
            session: SessionStore::hydrate(&tokens),
            tokens,
            navigator,
            alerts,
            routes,
        }
    }

    pub fn verification(&self, presentation: VerificationPresentation) -> VerificationFlow {
        VerificationFlow::new(
            self.client.clone(),
            self.navigator.clone(),
            presentation,
            self.routes.login.clone(),
        )
    }

    pub fn oauth_callback(&self) -> OAuthCallbackFlow {
        OAuthCallbackFlow::new(
            self.client.clone(),
            self.session.clone(),
            self.tokens.clone(),
            self.navigator.clone(),
            self.alerts.clone(),
            self.routes.clone(),
        )
    }

    pub fn logout(&self) -> LogoutFlow {
        LogoutFlow::begin(
            self.session.clone(),
            self.tokens.clone(),
            self.navigator.clone(),
            self.routes.clone(),
        )
    }
}
