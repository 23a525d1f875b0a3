//! Application state shared by the HTTP handlers

use super::service::Directory;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Directory>,

    pub version: String,

    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self {
            directory,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Uptime as a short human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds().max(0);

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
