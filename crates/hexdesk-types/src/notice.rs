//! Signals the core raises toward the presentation layer.

use serde::{Deserialize, Serialize};

/// Visual weight of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-visible message raised by a core component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// Dismissable toast.
    Toast {
        kind: ToastKind,
        title: String,
        message: String,
    },
    /// The open-window cap was hit. Rendered as a modal, distinct from
    /// permission toasts.
    ResourceLimit { limit: usize },
    /// A level was reached. Consumers show it after `delay_ms`.
    LevelUp { level: u32, delay_ms: u64 },
}

impl Notice {
    pub fn toast(kind: ToastKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Toast {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::toast(ToastKind::Info, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::toast(ToastKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::toast(ToastKind::Error, title, message)
    }
}
