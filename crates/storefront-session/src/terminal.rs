//! Terminal stand-ins for the browser: navigation is printed, alerts go to stderr.

use storefront_session_core::flows::{Alerts, Navigator};
use tracing::info;

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        info!(path, "Navigate");
        println!("-> {}", path);
    }
}

pub struct TerminalAlerts;

impl Alerts for TerminalAlerts {
    fn alert(&self, message: &str) {
        eprintln!("! {}", message);
    }
}
