//! User-visible notifications.
//!
//! Every backend failure surfaces as exactly one toast; none of them are
//! fatal to the process.

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A single notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Queue of notifications awaiting display.
#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: Vec<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.pending.push(Toast {
            level,
            message: message.into(),
        });
    }

    /// Take all pending toasts for display.
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Messages currently queued, newest last.
    pub fn messages(&self) -> Vec<&str> {
        self.pending.iter().map(|t| t.message.as_str()).collect()
    }
}
