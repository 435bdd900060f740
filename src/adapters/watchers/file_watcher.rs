// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for service file changes.
//!
//! This module provides a watcher that notices when another process rewrites
//! the service file, so a long-running front-end can reload its store.

use crate::domain::{Result, ServiceError};
use crate::ports::{ChangeCallback, ServiceFileWatcher};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// File system watcher for a service file.
///
/// The parent directory is watched rather than the file itself, because the
/// store replaces the file by renaming a temporary file over it. Events are
/// debounced so one save triggers one callback.
///
/// # Examples
///
/// ```rust,no_run
/// use pgservice::adapters::FileWatcher;
/// use pgservice::ports::ServiceFileWatcher;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # fn main() -> pgservice::domain::Result<()> {
/// let mut watcher = FileWatcher::new("/home/me/.pg_service.conf", None)?;
///
/// watcher.watch(Arc::new(|path: &Path| {
///     println!("Service file changed: {}", path.display());
/// }))?;
///
/// // Later, stop watching
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileWatcher {
    /// Absolute path of the file being watched
    file_path: PathBuf,
    /// Directory registered with the OS watcher
    watch_dir: PathBuf,
    /// Debounce delay (default 500ms)
    debounce_delay: Duration,
    watcher: Option<RecommendedWatcher>,
    watch_thread: Option<JoinHandle<()>>,
    stop_tx: Option<Sender<()>>,
}

impl FileWatcher {
    /// Creates a watcher for `path`.
    ///
    /// The file itself may not exist yet, but its directory must.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the service file
    /// * `debounce_delay` - Optional debounce delay (default 500ms)
    pub fn new(path: impl AsRef<Path>, debounce_delay: Option<Duration>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path.file_name().ok_or_else(|| ServiceError::WatcherError {
            message: format!("Not a file path: {}", path.display()),
            source: None,
        })?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let watch_dir = parent
            .canonicalize()
            .map_err(|e| ServiceError::WatcherError {
                message: format!("Directory does not exist: {}", parent.display()),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            file_path: watch_dir.join(file_name),
            watch_dir,
            debounce_delay: debounce_delay.unwrap_or(Duration::from_millis(500)),
            watcher: None,
            watch_thread: None,
            stop_tx: None,
        })
    }

    /// Returns the absolute path of the watched file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn run(
        file_path: PathBuf,
        debounce_delay: Duration,
        event_rx: Receiver<notify::Result<Event>>,
        stop_rx: Receiver<()>,
        callback: ChangeCallback,
    ) {
        let mut last_event_time: Option<Instant> = None;

        loop {
            if stop_rx.try_recv().is_ok() {
                tracing::debug!("Service file watcher stopping");
                break;
            }

            match event_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(Ok(event)) => {
                    if !event.paths.iter().any(|p| p == &file_path) {
                        continue;
                    }
                    let now = Instant::now();
                    let should_trigger = last_event_time
                        .map(|last| now.duration_since(last) >= debounce_delay)
                        .unwrap_or(true);
                    if should_trigger {
                        last_event_time = Some(now);
                        tracing::debug!("Service file changed: {}", file_path.display());
                        callback(file_path.as_path());
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("Service file watcher error: {}", e);
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl ServiceFileWatcher for FileWatcher {
    fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
        if self.watcher.is_some() {
            return Err(ServiceError::WatcherError {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let (event_tx, event_rx) = channel();
        let (stop_tx, stop_rx) = channel::<()>();

        let mut watcher =
            RecommendedWatcher::new(event_tx, notify::Config::default()).map_err(|e| {
                ServiceError::WatcherError {
                    message: format!("Failed to create file watcher: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;

        watcher
            .watch(&self.watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| ServiceError::WatcherError {
                message: format!("Failed to start watching: {}", e),
                source: Some(Box::new(e)),
            })?;

        let file_path = self.file_path.clone();
        let debounce_delay = self.debounce_delay;
        let watch_thread = thread::spawn(move || {
            Self::run(file_path, debounce_delay, event_rx, stop_rx, callback)
        });

        tracing::info!("Watching service file {}", self.file_path.display());
        self.watcher = Some(watcher);
        self.stop_tx = Some(stop_tx);
        self.watch_thread = Some(watch_thread);

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.watch_thread.take() {
            handle.join().map_err(|_| ServiceError::WatcherError {
                message: "Failed to join watcher thread".to_string(),
                source: None,
            })?;
        }

        self.watcher = None;
        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
