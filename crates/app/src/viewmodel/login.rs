//! Login page bindings

use std::sync::Arc;

use mitra_core::{Error, Field, LoginForm, ValidationReport};
use slint::ComponentHandle;

use super::{report_error, run_pending};
use crate::state::AppState;
use crate::MainWindow;

pub(super) fn setup_login_bindings(window: &MainWindow, state: Arc<AppState>) {
    let window_weak = window.as_weak();
    window.on_login_submit(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        if state.is_busy() {
            return;
        }

        let form = read_form(&w);
        let report = state.auth().check_login(&form);
        show_errors(&w, &report);
        if !report.is_ok() {
            tracing::debug!(issues = report.issues().len(), "Login form rejected");
            return;
        }

        if !state.try_begin() {
            return;
        }
        tracing::info!("Login submitted");
        let delay = state.config.login_delay();
        run_pending(
            &w,
            &state,
            delay,
            move |auth| auth.login(&form),
            on_login_error,
        );
    });
}

/// Clear a field's error once its value passes
pub(super) fn on_field_edited(window: &MainWindow, state: &AppState, field: &str) {
    let form = read_form(window);
    let rules = state.auth().rules();
    match field {
        "login-email" if form.field_is_valid(Field::Email, rules) => {
            window.set_login_email_error("".into())
        }
        "login-password" if form.field_is_valid(Field::Password, rules) => {
            window.set_login_password_error("".into())
        }
        _ => {}
    }
}

pub(super) fn reset_form(window: &MainWindow) {
    window.set_login_email("".into());
    window.set_login_password("".into());
    show_errors(window, &ValidationReport::default());
}

fn read_form(window: &MainWindow) -> LoginForm {
    LoginForm::new(
        window.get_login_email().to_string(),
        window.get_login_password().to_string(),
    )
}

fn show_errors(window: &MainWindow, report: &ValidationReport) {
    window.set_login_email_error(report.message_for(Field::Email).unwrap_or_default().into());
    window.set_login_password_error(
        report
            .message_for(Field::Password)
            .unwrap_or_default()
            .into(),
    );
}

/// A failed login is reported as a toast. Only a validation report also
/// marks fields; a wrong password leaves the form as typed.
fn on_login_error(window: &MainWindow, state: &Arc<AppState>, error: Error) {
    if let Some(report) = field_report(&error) {
        show_errors(window, report);
    }
    report_error(window, state, error);
}

fn field_report(error: &Error) -> Option<&ValidationReport> {
    match error {
        Error::Validation(report) => Some(report),
        _ => None,
    }
}
