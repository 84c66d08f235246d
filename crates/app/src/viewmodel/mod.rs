//! View model bindings for Slint UI

mod dashboard;
mod login;
mod signup;

use std::sync::Arc;
use std::time::Duration;

use mitra_core::{AuthOutcome, Error, Notice, Page, SocialProvider};
use slint::{ComponentHandle, ModelRc, VecModel};

use crate::state::{AppState, Auth};
use crate::{MainWindow, ToastItem};

pub fn setup_bindings(window: &MainWindow, state: Arc<AppState>) {
    setup_shell_bindings(window, state.clone());
    login::setup_login_bindings(window, state.clone());
    signup::setup_signup_bindings(window, state.clone());
    dashboard::setup_dashboard_bindings(window, state);
}

/// Navigation, toasts, live field checks and social sign-in, shared by all pages
fn setup_shell_bindings(window: &MainWindow, state: Arc<AppState>) {
    let state_nav = state.clone();
    let window_weak = window.as_weak();
    window.on_navigate(move |page| {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        if state_nav.is_busy() {
            return;
        }
        match Page::parse(&page) {
            Some(page) => navigate(&w, &state_nav, page),
            None => tracing::warn!(%page, "Unknown page"),
        }
    });

    let state_toast = state.clone();
    let window_weak = window.as_weak();
    window.on_dismiss_toast(move |id| {
        if state_toast.toasts().dismiss_str(&id) {
            if let Some(w) = window_weak.upgrade() {
                refresh_toasts(&w, &state_toast);
            }
        }
    });

    let state_field = state.clone();
    let window_weak = window.as_weak();
    window.on_field_edited(move |field| {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        if field.starts_with("login-") {
            login::on_field_edited(&w, &state_field, &field);
        } else if field.starts_with("signup-") {
            signup::on_field_edited(&w, &state_field, &field);
        }
    });

    let state_social = state;
    let window_weak = window.as_weak();
    window.on_social_sign_in(move |provider| {
        let Some(w) = window_weak.upgrade() else {
            return;
        };
        let Some(social) = SocialProvider::parse(&provider) else {
            tracing::warn!(%provider, "Unknown sign-in provider");
            return;
        };
        let page = Page::parse(&w.get_page()).unwrap_or_default();

        if !state_social.try_begin() {
            return;
        }
        let delay = state_social.config.social_delay();
        run_pending(
            &w,
            &state_social,
            delay,
            move |auth| auth.social_sign_in(social, page),
            report_error,
        );
    });
}

/// Switch pages, refreshing whatever the target page shows
pub(crate) fn navigate(window: &MainWindow, state: &Arc<AppState>, page: Page) {
    let session = state.auth().session();

    match page {
        Page::Dashboard => match session {
            Ok(Some(session)) => dashboard::show_session(window, &session),
            Ok(None) => {
                tracing::info!("No active session, staying on login");
                window.set_page(Page::Login.as_str().into());
                return;
            }
            Err(e) => {
                report_error(window, state, e);
                return;
            }
        },
        Page::Signup => {
            if matches!(session, Ok(Some(_))) {
                notify(window, state, Notice::info("You are already logged in!"));
            }
        }
        Page::Login => {}
    }

    tracing::debug!(page = page.as_str(), "Navigate");
    window.set_page(page.as_str().into());
}

/// Show a toast and schedule its removal
pub(crate) fn notify(window: &MainWindow, state: &Arc<AppState>, notice: Notice) {
    let id = state.toasts().push(notice);
    refresh_toasts(window, state);

    let timeout = state.config.toast_timeout();
    let window_weak = window.as_weak();
    let state = state.clone();
    slint::Timer::single_shot(timeout, move || {
        if state.toasts().dismiss(id) {
            if let Some(w) = window_weak.upgrade() {
                refresh_toasts(&w, &state);
            }
        }
    });
}

fn refresh_toasts(window: &MainWindow, state: &AppState) {
    let items: Vec<ToastItem> = state
        .toasts()
        .toasts()
        .iter()
        .map(|t| ToastItem {
            id: t.id.to_string().into(),
            message: t.message.clone().into(),
            severity: t.severity.as_str().into(),
        })
        .collect();
    window.set_toasts(ModelRc::new(VecModel::from(items)));
}

/// Error toast for anything a page does not handle inline
pub(crate) fn report_error(window: &MainWindow, state: &Arc<AppState>, error: Error) {
    match &error {
        Error::InvalidCredentials | Error::Validation(_) => {
            tracing::debug!(%error, "Request rejected")
        }
        _ => tracing::error!(%error, "Request failed"),
    }
    notify(window, state, Notice::error(error.to_string()));
}

/// Run `job` after the simulated network delay with the loading overlay up.
///
/// The caller must already hold the busy flag; it is released here.
pub(crate) fn run_pending<F, E>(
    window: &MainWindow,
    state: &Arc<AppState>,
    delay: Duration,
    job: F,
    on_error: E,
) where
    F: FnOnce(&Auth) -> mitra_core::Result<AuthOutcome> + 'static,
    E: FnOnce(&MainWindow, &Arc<AppState>, Error) + 'static,
{
    window.set_loading(true);

    let window_weak = window.as_weak();
    let state = state.clone();
    slint::Timer::single_shot(delay, move || {
        let result = {
            let auth = state.auth();
            job(&*auth)
        };
        state.finish();

        let Some(w) = window_weak.upgrade() else {
            return;
        };
        w.set_loading(false);

        match result {
            Ok(outcome) => complete(&w, &state, &outcome),
            Err(e) => on_error(&w, &state, e),
        }
    });
}

/// Announce a finished flow and move on after the redirect delay
fn complete(window: &MainWindow, state: &Arc<AppState>, outcome: &AuthOutcome) {
    if let Some(user) = outcome.user() {
        tracing::info!(user_id = %user.id, login_count = user.login_count, "Signed in");
    }
    notify(window, state, outcome.notice());
    login::reset_form(window);
    signup::reset_form(window);

    let destination = outcome.destination();
    let delay = outcome.redirect_delay(&state.config);
    let window_weak = window.as_weak();
    let state = state.clone();
    slint::Timer::single_shot(delay, move || {
        if let Some(w) = window_weak.upgrade() {
            navigate(&w, &state, destination);
        }
    });
}
