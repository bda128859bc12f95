//! Scratch directories that are removed even when the process is interrupted.
//!
//! `TempDir` cleans up on drop, but destructors do not run when SIGINT or
//! SIGTERM terminates the process. Every live [`ScratchDir`] is registered
//! here, and a signal handler removes the registered paths before exiting.

use crate::error::Result;
use std::{
    fs,
    path::{Path, PathBuf},
    process,
    sync::{Mutex, Once},
};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Exit status after an interrupt, as a shell reports SIGINT.
pub(crate) const INTERRUPTED_EXIT: i32 = 130;

static LIVE: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());
static HANDLER: Once = Once::new();

/// A temporary directory tracked for removal on interrupt.
#[derive(Debug)]
pub(crate) struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub(crate) fn new() -> Result<Self> {
        install_handler();

        let dir = TempDir::new()?;
        register(dir.path());
        debug!(path = %dir.path().display(), "created scratch directory");

        Ok(Self { dir })
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now, reporting any failure.
    pub(crate) fn close(self) -> Result<()> {
        unregister(self.path());
        fs::remove_dir_all(self.path())?;
        Ok(())
    }
}

impl Drop for ScratchDir {
    // The inner `TempDir` removes whatever is left.
    fn drop(&mut self) {
        unregister(self.dir.path());
    }
}

fn register(path: &Path) {
    if let Ok(mut live) = LIVE.lock() {
        live.push(path.to_path_buf());
    }
}

fn unregister(path: &Path) {
    if let Ok(mut live) = LIVE.lock() {
        live.retain(|p| p != path);
    }
}

fn install_handler() {
    HANDLER.call_once(|| {
        if let Err(e) = ctrlc::set_handler(on_interrupt) {
            warn!(error = %e, "could not install interrupt handler");
        }
    });
}

fn on_interrupt() {
    let live = match LIVE.lock() {
        Ok(live) => live,
        Err(poisoned) => poisoned.into_inner(),
    };
    for path in live.iter() {
        let _ = fs::remove_dir_all(path);
    }
    process::exit(INTERRUPTED_EXIT);
}
