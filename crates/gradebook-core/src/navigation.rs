//! Navigation sink
//!
//! Redirects (from the route guard or the API client's 401 handling) go
//! through a [`Navigator`] so the host decides what "navigate" means.

use std::sync::Mutex;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
/// Where users land after login, or when their role does not fit a route
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that ignores every redirect
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}
}

/// Records visited paths in order
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.entries.lock().ok().and_then(|e| e.last().cloned())
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Navigator for History {
    fn navigate(&self, path: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(path.to_string());
        }
    }
}
