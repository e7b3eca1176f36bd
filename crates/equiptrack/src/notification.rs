//! Transient user notifications.
//!
//! A notification is a short title and description shown after a form
//! submit or a session change. Destructive notifications report something
//! the user has to fix.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Default time a notification stays visible.
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_millis(5_000);

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Confirmation of a successful action.
    #[default]
    Default,
    /// Something went wrong.
    Destructive,
}

/// A toast-style message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Short heading.
    pub title: String,
    /// One-line explanation.
    pub description: String,
    /// Visual style.
    pub variant: Variant,
    /// How long the notification stays visible.
    #[serde(skip)]
    pub dismiss_after: Duration,
}

impl Notification {
    /// Create a success notification.
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }

    /// Create an error notification.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }

    /// Override the display time.
    #[must_use]
    pub fn with_dismiss_after(mut self, dismiss_after: Duration) -> Self {
        self.dismiss_after = dismiss_after;
        self
    }

    /// Whether this notification reports an error.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.variant {
            Variant::Default => "*",
            Variant::Destructive => "!",
        };
        write!(f, "[{marker}] {}: {}", self.title, self.description)
    }
}
