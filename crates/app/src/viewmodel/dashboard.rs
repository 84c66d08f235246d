//! Dashboard bindings

use std::sync::Arc;

use chrono::Local;
use mitra_core::{Notice, Page, SessionRecord};
use slint::ComponentHandle;

use super::{navigate, notify, report_error};
use crate::clipboard;
use crate::state::AppState;
use crate::MainWindow;

pub(super) fn setup_dashboard_bindings(window: &MainWindow, state: Arc<AppState>) {
    let state_logout = state.clone();
    let window_weak = window.as_weak();
    window.on_logout(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let result = state_logout.auth().logout();
        match result {
            Ok(()) => {
                tracing::info!("Logged out");
                notify(&w, &state_logout, Notice::info("You have been logged out."));
                navigate(&w, &state_logout, Page::Login);
            }
            Err(e) => report_error(&w, &state_logout, e),
        }
    });

    let state_export = state;
    let window_weak = window.as_weak();
    window.on_copy_export(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let export = state_export.auth().export();
        let json = match export.and_then(|e| e.to_pretty_json()) {
            Ok(json) => json,
            Err(e) => {
                report_error(&w, &state_export, e);
                return;
            }
        };

        let notice = if clipboard::copy_text(&json) {
            Notice::success("Data export copied to clipboard.")
        } else {
            Notice::error("Could not access the clipboard.")
        };
        notify(&w, &state_export, notice);
    });
}

pub(super) fn show_session(window: &MainWindow, session: &SessionRecord) {
    window.set_session_name(session.name.as_str().into());
    window.set_session_email(session.email.as_str().into());
    window.set_session_provider(session.provider.display_name().into());
    window.set_session_expires(format_expiry(session).into());
}

fn format_expiry(session: &SessionRecord) -> String {
    session
        .expires_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use mitra_core::{UserPatch, UserRecord};

    #[test]
    fn test_format_expiry_uses_minutes() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let user = UserRecord::from_patch("user_1".to_string(), UserPatch::new("a@b.co"), now);
        let session = SessionRecord::for_user(&user, now, Duration::days(7)).unwrap();

        let text = format_expiry(&session);
        assert_eq!(text.len(), "2024-03-08 12:00".len());
        assert!(text.starts_with("2024-03-0"));
    }
}
