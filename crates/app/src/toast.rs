//! Notification tray
//!
//! Holds the toasts currently on screen. Expiry is driven by the caller,
//! which schedules a dismissal per toast when it is pushed.

use chrono::{DateTime, Utc};
use mitra_core::{Notice, Severity};
use uuid::Uuid;

/// A visible notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub shown_at: DateTime<Utc>,
}

/// Toasts in display order, oldest first
#[derive(Debug, Default)]
pub struct ToastTray {
    toasts: Vec<Toast>,
}

impl ToastTray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notice, returning the id used to dismiss it
    pub fn push(&mut self, notice: Notice) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: notice.message,
            severity: notice.severity,
            shown_at: Utc::now(),
        };
        let id = toast.id;
        tracing::debug!(%id, severity = %toast.severity, "Toast shown");
        self.toasts.push(toast);
        id
    }

    /// Remove a toast. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let Some(pos) = self.toasts.iter().position(|t| t.id == id) else {
            return false;
        };
        let toast = self.toasts.remove(pos);
        tracing::debug!(
            %id,
            shown_for_ms = (Utc::now() - toast.shown_at).num_milliseconds(),
            "Toast dismissed"
        );
        true
    }

    /// Remove a toast by its string id as sent back from the UI
    pub fn dismiss_str(&mut self, id: &str) -> bool {
        Uuid::parse_str(id).is_ok_and(|id| self.dismiss(id))
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut tray = ToastTray::new();
        tray.push(Notice::info("first"));
        tray.push(Notice::error("second"));

        let messages: Vec<&str> = tray.toasts().iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(tray.toasts()[1].severity, Severity::Error);
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut tray = ToastTray::new();
        let id = tray.push(Notice::success("done"));
        let other = tray.push(Notice::info("still here"));

        assert!(tray.dismiss(id));
        assert!(!tray.dismiss(id));
        assert_eq!(tray.toasts().len(), 1);
        assert_eq!(tray.toasts()[0].id, other);
    }

    #[test]
    fn test_dismiss_from_ui_string() {
        let mut tray = ToastTray::new();
        let id = tray.push(Notice::success("done"));

        assert!(!tray.dismiss_str("not-a-uuid"));
        assert!(tray.dismiss_str(&id.to_string()));
        assert!(tray.is_empty());
    }
}
