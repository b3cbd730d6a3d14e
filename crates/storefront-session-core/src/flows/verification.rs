//! Magic-link email verification.
//!
//! Verifying an emailed token proves the user owns the address; it does not
//! sign them in. The flow therefore only produces a message and, on
//! success, sends the user on to the login page after a short pause.
//!
//! The customer and registration pages run the same state machine and
//! differ only in their `VerificationPresentation`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use url::Url;

use super::{extract_token, Navigator, PageScope};
use crate::api::IdentityClient;

/// Redirect pause on the customer-facing page
const CUSTOMER_REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// Redirect pause on the registration page
const REGISTRATION_REDIRECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Pending(String),
    Success(String),
    Failure(String),
}

impl VerificationOutcome {
    pub fn message(&self) -> &str {
        match self {
            VerificationOutcome::Pending(m)
            | VerificationOutcome::Success(m)
            | VerificationOutcome::Failure(m) => m,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerificationOutcome::Pending(_))
    }
}

/// Copy and timing for one page that hosts the verification flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationPresentation {
    pub verifying_text: String,
    pub success_text: String,
    pub failure_text: String,
    pub invalid_token_text: String,
    pub redirect_delay: Duration,
}

impl VerificationPresentation {
    pub fn customer() -> Self {
        Self {
            verifying_text: "Verifying your email...".to_string(),
            success_text: "Your email has been verified. Redirecting to sign in...".to_string(),
            failure_text: "We couldn't verify your email. The link may have expired.".to_string(),
            invalid_token_text: "Invalid verification link.".to_string(),
            redirect_delay: CUSTOMER_REDIRECT_DELAY,
        }
    }

    pub fn registration() -> Self {
        Self {
            verifying_text: "Confirming your registration...".to_string(),
            success_text: "Registration confirmed! You can now sign in.".to_string(),
            failure_text: "Registration could not be confirmed.".to_string(),
            invalid_token_text: "Invalid token.".to_string(),
            redirect_delay: REGISTRATION_REDIRECT_DELAY,
        }
    }
}

pub struct VerificationFlow {
    client: Arc<dyn IdentityClient>,
    navigator: Arc<dyn Navigator>,
    presentation: VerificationPresentation,
    login_route: String,
    outcome: watch::Sender<VerificationOutcome>,
}

impl VerificationFlow {
    pub fn new(
        client: Arc<dyn IdentityClient>,
        navigator: Arc<dyn Navigator>,
        presentation: VerificationPresentation,
        login_route: impl Into<String>,
    ) -> Self {
        let pending = VerificationOutcome::Pending(presentation.verifying_text.clone());
        let (outcome, _rx) = watch::channel(pending);
        Self {
            client,
            navigator,
            presentation,
            login_route: login_route.into(),
            outcome,
        }
    }

    pub fn outcome(&self) -> VerificationOutcome {
        self.outcome.borrow().clone()
    }

    /// Follow the outcome as it moves from pending to its terminal state.
    pub fn subscribe(&self) -> watch::Receiver<VerificationOutcome> {
        self.outcome.subscribe()
    }

    fn publish(&self, scope: &PageScope, next: VerificationOutcome) -> bool {
        if !scope.is_active() {
            return false;
        }
        self.outcome.send_replace(next);
        true
    }

    /// Verify the token carried by `request`.
    ///
    /// Returns the last outcome published. If the page is torn down before
    /// the server answers, that is still `Pending` and nothing else happens.
    pub async fn run(&self, request: &Url, scope: &PageScope) -> VerificationOutcome {
        let text = &self.presentation;
        self.publish(scope, VerificationOutcome::Pending(text.verifying_text.clone()));

        let Some(token) = extract_token(request) else {
            warn!("Verification link has no token");
            self.publish(scope, VerificationOutcome::Failure(text.invalid_token_text.clone()));
            return self.outcome();
        };

        let Some(result) = scope.guard(self.client.verify(&token)).await else {
            debug!("Page torn down before verification finished");
            return self.outcome();
        };

        match result {
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| text.success_text.clone());
                if !self.publish(scope, VerificationOutcome::Success(message)) {
                    return self.outcome();
                }
                info!(delay_ms = text.redirect_delay.as_millis() as u64, "Email verified");

                if scope.guard(tokio::time::sleep(text.redirect_delay)).await.is_some() {
                    scope.navigate(self.navigator.as_ref(), &self.login_route);
                }
            }
            Err(e) => {
                error!(error = %e, "Email verification failed");
                let message = e
                    .server_body()
                    .map(str::to_string)
                    .unwrap_or_else(|| text.failure_text.clone());
                self.publish(scope, VerificationOutcome::Failure(message));
            }
        }

        self.outcome()
    }
}
