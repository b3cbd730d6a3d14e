//! UI collaborators the flows drive: page navigation and one-shot alerts.

use std::sync::{Mutex, PoisonError};

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

pub trait Alerts: Send + Sync {
    fn alert(&self, message: &str);
}

/// Navigator that keeps every requested destination in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visits().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

#[derive(Debug, Default)]
pub struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Alerts for RecordingAlerts {
    fn alert(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
