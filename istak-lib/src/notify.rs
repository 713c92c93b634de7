//! User-facing notifications

use log::error;
use log::info;

/// Whether a notice reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Receives one notice per completed user action.
///
/// Implementations are fire-and-forget: they must not block and never
/// report failure back to the caller.
pub trait NotificationSink: Send + Sync {
    /// Shows a notice with a title and optional detail text.
    fn notify(&self, kind: NoticeKind, title: &str, detail: Option<&str>);

    /// Shorthand for a success notice.
    fn success(&self, title: &str, detail: Option<&str>) {
        self.notify(NoticeKind::Success, title, detail);
    }

    /// Shorthand for an error notice.
    fn error(&self, title: &str, detail: Option<&str>) {
        self.notify(NoticeKind::Error, title, detail);
    }
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, kind: NoticeKind, title: &str, detail: Option<&str>) {
        let detail = detail.unwrap_or_default();
        match kind {
            NoticeKind::Success => info!("{} {}", title, detail),
            NoticeKind::Error => error!("{} {}", title, detail),
        }
    }
}
