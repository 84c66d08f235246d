//! Clipboard access for the data export

use std::io::Write;
use std::process::{Command, Stdio};

/// Put `text` on the system clipboard. Returns false if every method failed.
pub fn copy_text(text: &str) -> bool {
    match arboard::Clipboard::new().and_then(|mut c| c.set_text(text)) {
        Ok(()) => {
            tracing::debug!(bytes = text.len(), "Copied to clipboard via arboard");
            return true;
        }
        Err(e) => tracing::debug!(error = %e, "arboard clipboard unavailable"),
    }

    // Some Wayland compositors only accept clipboard writes through wl-copy
    if std::env::var_os("WAYLAND_DISPLAY").is_some() && wl_copy(text) {
        tracing::debug!("Copied to clipboard via wl-copy");
        return true;
    }

    tracing::warn!("All clipboard methods failed");
    false
}

fn wl_copy(text: &str) -> bool {
    let Ok(mut child) = Command::new("wl-copy")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        return false;
    };

    let written = child
        .stdin
        .take()
        .is_some_and(|mut stdin| stdin.write_all(text.as_bytes()).is_ok());

    matches!(child.wait(), Ok(status) if status.success()) && written
}
