//! Application state management

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use mitra_core::{AuthService, MemorySlot, MitraConfig, Result, SqliteSlot};

use crate::toast::ToastTray;

/// Auth service over a SQLite durable slot and an in-memory session slot
pub type Auth = AuthService<SqliteSlot, MemorySlot>;

/// Main application state, built once at startup and handed to every view model
pub struct AppState {
    pub config: MitraConfig,
    auth: Arc<Mutex<Auth>>,
    toasts: Arc<Mutex<ToastTray>>,
    /// Set while a simulated request is pending
    busy: AtomicBool,
    data_dir: PathBuf,
}

impl AppState {
    /// Load configuration and open storage in the platform directories
    pub fn new() -> Result<Self> {
        let config = MitraConfig::load_default()?;
        let data_dir = MitraConfig::data_dir()?;
        Self::open(config, &data_dir)
    }

    /// Open storage under `data_dir` with the given configuration
    pub fn open(config: MitraConfig, data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let durable = SqliteSlot::open(config.database_path(data_dir))?;
        let auth = AuthService::new(durable, MemorySlot::new(), &config)?;

        Ok(Self {
            config,
            auth: Arc::new(Mutex::new(auth)),
            toasts: Arc::new(Mutex::new(ToastTray::new())),
            busy: AtomicBool::new(false),
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn auth(&self) -> MutexGuard<'_, Auth> {
        self.auth.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn toasts(&self) -> MutexGuard<'_, ToastTray> {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim the pending-request flag. Returns false if a request is already
    /// in flight, so a second click is ignored.
    pub fn try_begin(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn finish(&self) {
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
