//! Driven port for writing text to the platform clipboard.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while writing to the clipboard.
    pub enum ClipboardError {
        /// The platform denied clipboard access.
        Denied { message: String } =>
            "clipboard access denied: {message}",
        /// No clipboard is available in this environment.
        Unavailable =>
            "clipboard unavailable",
    }
}

/// Port for copying plain text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with `text`.
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}
