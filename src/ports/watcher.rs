// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service file watcher trait definition.
//!
//! This module defines the `ServiceFileWatcher` trait, which notifies a caller
//! when the service file is changed by another process so it can call
//! `ServiceConfigStore::reload`.

use crate::domain::Result;
use std::path::Path;
use std::sync::Arc;

/// Type alias for change notification callbacks.
///
/// The callback receives the path of the file that changed.
pub type ChangeCallback = Arc<dyn Fn(&Path) + Send + Sync>;

/// A trait for watching a service file for external changes.
///
/// # Examples
///
/// ```rust
/// use pgservice::ports::{ChangeCallback, ServiceFileWatcher};
/// use pgservice::domain::Result;
///
/// struct NoopWatcher;
///
/// impl ServiceFileWatcher for NoopWatcher {
///     fn watch(&mut self, _callback: ChangeCallback) -> Result<()> {
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait ServiceFileWatcher: Send + Sync {
    /// Starts watching.
    ///
    /// The callback runs on the watcher's own thread and should return
    /// quickly.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::WatcherError` if the watcher is already running
    /// or cannot be started.
    fn watch(&mut self, callback: ChangeCallback) -> Result<()>;

    /// Stops watching. Calling `stop` on a stopped watcher is a no-op.
    fn stop(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct TestWatcher {
        callback: Option<ChangeCallback>,
    }

    impl ServiceFileWatcher for TestWatcher {
        fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
            self.callback = Some(callback);
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.callback = None;
            Ok(())
        }
    }

    #[test]
    fn test_watcher_callback_receives_path() {
        let seen = Arc::new(Mutex::new(Vec::<PathBuf>::new()));
        let seen_clone = Arc::clone(&seen);

        let mut watcher = TestWatcher { callback: None };
        watcher
            .watch(Arc::new(move |path: &Path| {
                seen_clone.lock().unwrap().push(path.to_path_buf());
            }))
            .unwrap();

        if let Some(callback) = &watcher.callback {
            callback(Path::new("/tmp/.pg_service.conf"));
        }

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[PathBuf::from("/tmp/.pg_service.conf")]
        );
    }

    #[test]
    fn test_watcher_stop() {
        let mut watcher = TestWatcher { callback: None };
        watcher.watch(Arc::new(|_: &Path| {})).unwrap();
        watcher.stop().unwrap();
        assert!(watcher.callback.is_none());
    }

    #[test]
    fn test_watcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn ServiceFileWatcher>>();
    }
}
