// SPDX-License-Identifier: MIT OR Apache-2.0

//! Location watcher trait definition.
//!
//! This module defines the `LocationWatcher` trait, which monitors the
//! resources behind property locations and reports changes so that the
//! affected sources can be reloaded.

use crate::domain::Result;
use std::path::Path;
use std::sync::Arc;

/// Type alias for change notification callbacks.
///
/// The callback receives the path of the resource that changed.
pub type ChangeCallback = Arc<dyn Fn(&Path) + Send + Sync>;

/// A trait for watching property resources for changes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow for use in multi-threaded contexts.
///
/// # Examples
///
/// ```rust
/// use hexprops::ports::{ChangeCallback, LocationWatcher};
/// use hexprops::domain::Result;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// struct Manual(Option<ChangeCallback>);
///
/// impl LocationWatcher for Manual {
///     fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
///         self.0 = Some(callback);
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         self.0 = None;
///         Ok(())
///     }
/// }
///
/// let mut watcher = Manual(None);
/// watcher.watch(Arc::new(|path: &Path| println!("changed: {}", path.display()))).unwrap();
/// watcher.stop().unwrap();
/// ```
pub trait LocationWatcher: Send + Sync {
    /// Starts watching; `callback` is invoked for every detected change.
    ///
    /// The callback should be non-blocking to avoid delaying the watcher.
    fn watch(&mut self, callback: ChangeCallback) -> Result<()>;

    /// Stops watching and releases any resources held by the watcher.
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

    impl LocationWatcher for TestWatcher {
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
    fn test_watcher_callback_invocation() {
        let mut watcher = TestWatcher { callback: None };
        let seen = Arc::new(Mutex::new(Vec::<PathBuf>::new()));
        let sink = Arc::clone(&seen);

        watcher
            .watch(Arc::new(move |path: &Path| {
                sink.lock().unwrap().push(path.to_path_buf());
            }))
            .unwrap();

        if let Some(callback) = &watcher.callback {
            callback(Path::new("/tmp/app.properties"));
        }

        assert_eq!(seen.lock().unwrap().len(), 1);
        watcher.stop().unwrap();
        assert!(watcher.callback.is_none());
    }

    #[test]
    fn test_watcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn LocationWatcher>>();
    }
}
