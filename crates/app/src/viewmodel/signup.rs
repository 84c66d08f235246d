//! Signup page bindings

use std::sync::Arc;

use mitra_core::{strength, Error, Field, Notice, SignupForm, StrengthTier, ValidationReport};
use slint::{ComponentHandle, SharedString};

use super::{notify, report_error, run_pending};
use crate::state::AppState;
use crate::MainWindow;

pub(super) fn setup_signup_bindings(window: &MainWindow, state: Arc<AppState>) {
    let window_weak = window.as_weak();
    window.on_signup_submit(move || {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        if state.is_busy() {
            return;
        }

        let form = read_form(&w);
        let checked = state.auth().check_signup(&form);
        let report = match checked {
            Ok(report) => report,
            Err(e) => {
                report_error(&w, &state, e);
                return;
            }
        };
        show_errors(&w, &state, &report);
        if !report.is_ok() {
            tracing::debug!(issues = report.issues().len(), "Signup form rejected");
            return;
        }

        if !state.try_begin() {
            return;
        }
        tracing::info!("Signup submitted");
        let delay = state.config.signup_delay();
        run_pending(
            &w,
            &state,
            delay,
            move |auth| auth.signup(&form),
            on_signup_error,
        );
    });
}

/// Clear a field's error once its value passes, and keep the strength
/// indicator in step with the password
pub(super) fn on_field_edited(window: &MainWindow, state: &AppState, field: &str) {
    let form = read_form(window);
    let rules = state.auth().rules();
    let valid = |f| form.field_is_valid(f, rules);

    match field {
        "signup-name" if valid(Field::FullName) => window.set_signup_name_error("".into()),
        "signup-email" if valid(Field::Email) => window.set_signup_email_error("".into()),
        "signup-phone" if valid(Field::Phone) => window.set_signup_phone_error("".into()),
        "signup-password" => {
            show_strength(window, &form.password);
            if valid(Field::Password) {
                window.set_signup_password_error("".into());
            }
        }
        "signup-confirm" if valid(Field::ConfirmPassword) => {
            window.set_signup_confirm_error("".into())
        }
        _ => {}
    }
}

pub(super) fn reset_form(window: &MainWindow) {
    window.set_signup_name("".into());
    window.set_signup_email("".into());
    window.set_signup_phone("".into());
    window.set_signup_password("".into());
    window.set_signup_confirm("".into());
    window.set_signup_terms(false);
    window.set_show_password(false);
    show_strength(window, "");
    set_field_errors(window, &ValidationReport::default());
}

fn read_form(window: &MainWindow) -> SignupForm {
    SignupForm {
        full_name: window.get_signup_name().to_string(),
        email: window.get_signup_email().to_string(),
        phone: window.get_signup_phone().to_string(),
        password: window.get_signup_password().to_string(),
        confirm_password: window.get_signup_confirm().to_string(),
        agreed_to_terms: window.get_signup_terms(),
    }
}

fn show_strength(window: &MainWindow, password: &str) {
    let tier = strength::evaluate(password);
    let level = match tier {
        None => 0,
        Some(StrengthTier::Weak) => 1,
        Some(StrengthTier::Medium) => 2,
        Some(StrengthTier::Strong) => 3,
    };
    window.set_strength_level(level);
    window.set_strength_label(tier.map(|t| t.label()).unwrap_or_default().into());
}

fn set_field_errors(window: &MainWindow, report: &ValidationReport) {
    let message = |field| -> SharedString { report.message_for(field).unwrap_or_default().into() };
    window.set_signup_name_error(message(Field::FullName));
    window.set_signup_email_error(message(Field::Email));
    window.set_signup_phone_error(message(Field::Phone));
    window.set_signup_password_error(message(Field::Password));
    window.set_signup_confirm_error(message(Field::ConfirmPassword));
}

/// Field messages go next to their inputs; form-level ones become toasts
fn show_errors(window: &MainWindow, state: &Arc<AppState>, report: &ValidationReport) {
    set_field_errors(window, report);
    for message in report.form_messages() {
        notify(window, state, Notice::error(message));
    }
}

fn on_signup_error(window: &MainWindow, state: &Arc<AppState>, error: Error) {
    if let Error::Validation(report) = &error {
        show_errors(window, state, report);
        return;
    }
    report_error(window, state, error);
}
