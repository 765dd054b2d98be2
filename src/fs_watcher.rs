//! File system watching for the user mappings file
//!
//! Uses the `notify` crate with debouncing to detect edits to the mappings
//! file so the live keymap can be reloaded.

use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

type DebounceResult = Result<Vec<DebouncedEvent>, notify::Error>;

/// Debounce delay for mappings file changes
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches a single mappings file
///
/// The parent directory is watched instead of the file itself: editors often
/// save by writing a temp file and renaming it over the original, and the
/// file may not exist yet when watching starts.
pub struct MappingsWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    rx: Receiver<DebounceResult>,
    path: PathBuf,
}

impl MappingsWatcher {
    /// Start watching `path`; its parent directory must exist
    pub fn new(path: PathBuf) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

        let dir = watch_dir(&path);
        debouncer
            .watcher()
            .watch(&dir, notify::RecursiveMode::NonRecursive)?;

        tracing::info!("Watching mappings file: {}", path.display());

        Ok(Self {
            _debouncer: debouncer,
            rx,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending events (non-blocking); true if the mappings file changed
    pub fn poll_changed(&self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.rx.try_recv() {
            changed |= self.is_relevant(result);
        }
        if changed {
            tracing::debug!("Mappings file changed: {}", self.path.display());
        }
        changed
    }

    /// Block up to `timeout` for a change to the mappings file
    ///
    /// Returns false on timeout or if the watcher has shut down.
    pub fn wait_changed(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(result) => {
                    if self.is_relevant(result) {
                        // Fold in anything queued behind it
                        self.poll_changed();
                        tracing::debug!("Mappings file changed: {}", self.path.display());
                        return true;
                    }
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!("Mappings watcher disconnected");
                    return false;
                }
            }
        }
    }

    fn is_relevant(&self, result: DebounceResult) -> bool {
        match result {
            Ok(events) => events.iter().any(|event| {
                // Continuous events fire while a write is still in progress
                !matches!(event.kind, DebouncedEventKind::AnyContinuous)
                    && self.is_mappings_path(&event.path)
            }),
            Err(e) => {
                tracing::warn!("Mappings watcher error: {:?}", e);
                false
            }
        }
    }

    fn is_mappings_path(&self, path: &Path) -> bool {
        // Events may report a canonicalized directory, so fall back to the name
        path == self.path
            || (path.file_name().is_some() && path.file_name() == self.path.file_name())
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
