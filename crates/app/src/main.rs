//! Study Mitra - student login and signup
//!
//! Desktop front end over the mitra-core account store.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod clipboard;
mod state;
mod toast;
mod viewmodel;

slint::include_modules!();

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Study Mitra");

    let app_state = match state::AppState::new() {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(data_dir = %app_state.data_dir().display(), "Storage ready");

    let main_window = match MainWindow::new() {
        Ok(window) => window,
        Err(e) => {
            tracing::error!("Failed to create window: {}", e);
            std::process::exit(1);
        }
    };

    viewmodel::setup_bindings(&main_window, app_state);

    if let Err(e) = main_window.run() {
        tracing::error!("Event loop exited with error: {}", e);
        std::process::exit(1);
    }
}
