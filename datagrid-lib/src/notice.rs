//! Transient user notifications.

use std::time::Duration;

use serde::Serialize;

/// Default time a notice stays visible.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(4);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A short message the host shows to the user and then dismisses.
///
/// Every dispatch outcome carries one; the host decides how to display it.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::notice::{Notice, NoticeLevel};
///
/// let notice = Notice::error("Delete failed").with_duration(Duration::from_secs(8));
/// assert_eq!(notice.level, NoticeLevel::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip)]
    pub duration: Duration,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            duration: DEFAULT_NOTICE_DURATION,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Sets how long the notice stays visible.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

impl From<String> for Notice {
    fn from(message: String) -> Self {
        Notice::info(message)
    }
}

impl From<&str> for Notice {
    fn from(message: &str) -> Self {
        Notice::info(message)
    }
}
