use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Navigator;

/// Lifetime of the page a flow invocation belongs to.
///
/// A flow captures its scope when it starts and checks it before every
/// mutation. Once the page is torn down, late network responses and timers
/// are dropped instead of touching state or navigating.
#[derive(Debug, Clone, Default)]
pub struct PageScope {
    cancel: CancellationToken,
}

impl PageScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope that is torn down with this one but can also end on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
        }
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Run `fut` unless the page goes away first. `None` means torn down.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }

    /// Navigate if the page is still live. Returns whether it happened.
    pub fn navigate(&self, navigator: &dyn Navigator, path: &str) -> bool {
        if self.is_active() {
            navigator.navigate(path);
            true
        } else {
            debug!(path, "Skipping navigation from torn-down page");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::RecordingNavigator;
    use std::time::Duration;

    #[tokio::test]
    async fn test_guard_passes_through_when_active() {
        let scope = PageScope::new();
        assert_eq!(scope.guard(async { 42 }).await, Some(42));
    }

    #[tokio::test]
    async fn test_guard_drops_result_after_teardown() {
        let scope = PageScope::new();
        scope.teardown();
        assert_eq!(scope.guard(async { 42 }).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_interrupts_pending_future() {
        let scope = PageScope::new();
        let remote = scope.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            remote.teardown();
        });

        let result = scope.guard(tokio::time::sleep(Duration::from_secs(60))).await;
        assert!(result.is_none());
    }

    #[test]
    fn test_child_follows_parent() {
        let page = PageScope::new();
        let flow = page.child();
        let navigator = RecordingNavigator::new();

        assert!(flow.navigate(&navigator, "/"));
        page.teardown();
        assert!(!flow.is_active());
        assert!(!flow.navigate(&navigator, "/login"));
        assert_eq!(navigator.visits(), vec!["/".to_string()]);
    }
}
