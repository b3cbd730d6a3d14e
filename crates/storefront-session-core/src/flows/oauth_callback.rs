//! Identity-provider redirect callback.
//!
//! The provider sends the browser back with `?token=`. The token is saved
//! before the profile is fetched so a reload mid-flight does not lose it;
//! if the fetch fails the token is removed again, so no half-finished
//! session survives. The session store is only touched with a fully
//! fetched and normalized user.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use url::Url;

use super::{extract_token, Alerts, Navigator, PageScope};
use crate::api::{AuthError, IdentityClient};
use crate::config::Routes;
use crate::models::{CredentialToken, UserRecord};
use crate::session::SessionStore;
use crate::storage::TokenStore;

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    SignedIn(UserRecord),
    Failed(AuthError),
    /// The page went away before the flow finished; nothing after that point
    /// was applied.
    Abandoned,
}

pub struct OAuthCallbackFlow {
    client: Arc<dyn IdentityClient>,
    session: SessionStore,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    alerts: Arc<dyn Alerts>,
    routes: Routes,
}

impl OAuthCallbackFlow {
    pub fn new(
        client: Arc<dyn IdentityClient>,
        session: SessionStore,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
        alerts: Arc<dyn Alerts>,
        routes: Routes,
    ) -> Self {
        Self {
            client,
            session,
            tokens,
            navigator,
            alerts,
            routes,
        }
    }

    /// Handle one load of the callback route.
    pub async fn run(&self, request: &Url, scope: &PageScope) -> CallbackOutcome {
        let Some(token) = extract_token(request) else {
            return self.fail(scope, AuthError::MissingToken, false);
        };
        if !scope.is_active() {
            return CallbackOutcome::Abandoned;
        }

        if let Err(e) = self.tokens.save_token(&token) {
            let error = AuthError::TransportFailure(format!("Failed to save token: {}", e));
            return self.fail(scope, error, false);
        }
        debug!("Callback token saved");

        self.complete(token, scope).await
    }

    /// Finish a callback whose token was saved but whose profile never
    /// arrived, e.g. because the page was closed mid-fetch.
    pub async fn resume(&self, scope: &PageScope) -> CallbackOutcome {
        match self.tokens.token() {
            Ok(Some(token)) => {
                info!("Resuming interrupted sign-in");
                self.complete(token, scope).await
            }
            Ok(None) => self.fail(scope, AuthError::MissingToken, false),
            Err(e) => {
                let error = AuthError::TransportFailure(format!("Failed to read token: {}", e));
                self.fail(scope, error, false)
            }
        }
    }

    async fn complete(&self, token: CredentialToken, scope: &PageScope) -> CallbackOutcome {
        let Some(result) = scope.guard(self.client.fetch_current_user(&token)).await else {
            debug!("Page torn down during profile fetch, token kept for resume");
            return CallbackOutcome::Abandoned;
        };
        let user = result.and_then(|body| {
            UserRecord::from_response(body).ok_or_else(|| {
                AuthError::TransportFailure("Profile response was not a JSON object".to_string())
            })
        });

        if !scope.is_active() {
            // a rejected token is useless to resume, even if nobody is left to tell
            if let Err(e) = &user {
                debug!(error = %e, "Page torn down after failed profile fetch");
                self.roll_back_token();
            }
            return CallbackOutcome::Abandoned;
        }

        match user {
            Ok(user) => {
                if let Err(e) = self.tokens.save_user(&user) {
                    // the in-memory session is still valid; a reload will resume
                    warn!(error = %e, "Failed to persist user record");
                }
                self.session.login(user.clone());
                info!(user_id = ?user.id(), "Signed in via identity provider");
                scope.navigate(self.navigator.as_ref(), &self.routes.home);
                CallbackOutcome::SignedIn(user)
            }
            Err(e) => self.fail(scope, e, true),
        }
    }

    fn fail(&self, scope: &PageScope, error: AuthError, rollback: bool) -> CallbackOutcome {
        if !scope.is_active() {
            return CallbackOutcome::Abandoned;
        }
        error!(error = %error, rollback, "Identity provider sign-in failed");

        self.alerts
            .alert(&format!("Sign-in failed: {}", error.user_message()));
        if rollback {
            self.roll_back_token();
        }
        scope.navigate(self.navigator.as_ref(), &self.routes.login);
        CallbackOutcome::Failed(error)
    }

    fn roll_back_token(&self) {
        if let Err(e) = self.tokens.remove_token() {
            warn!(error = %e, "Failed to roll back saved token");
        }
    }
}
