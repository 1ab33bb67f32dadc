// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for properties files.
//!
//! This module provides a watcher that monitors the files behind `file:`
//! locations and reports each modified file so the matching source can be
//! reloaded.

use crate::domain::{PropertiesError, Result};
use crate::ports::{ChangeCallback, LocationWatcher};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default debounce delay between two notifications for the same file.
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// File system watcher for properties files.
///
/// Watches the parent directory of every file and invokes the callback with
/// the path of a watched file when it changes. Notifications for the same
/// file are debounced.
///
/// # Examples
///
/// ```rust,no_run
/// use hexprops::adapters::FileWatcher;
/// use hexprops::ports::LocationWatcher;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # fn main() -> hexprops::domain::Result<()> {
/// let mut watcher = FileWatcher::new(vec!["/etc/myapp/app.properties".into()], None)?;
///
/// watcher.watch(Arc::new(|path: &Path| {
///     println!("Properties changed: {}", path.display());
/// }))?;
///
/// // Later, stop watching
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileWatcher {
    /// Files being watched
    files: Vec<PathBuf>,
    /// Debounce delay (default 500ms)
    debounce_delay: Duration,
    /// Internal watcher
    watcher: Option<RecommendedWatcher>,
    /// Thread handle for the watcher thread
    watch_thread: Option<JoinHandle<()>>,
    /// Stop signal sender
    stop_tx: Option<Sender<()>>,
}

impl FileWatcher {
    /// Creates a watcher for the given files.
    ///
    /// Every file must exist when the watcher is created.
    pub fn new(files: Vec<PathBuf>, debounce_delay: Option<Duration>) -> Result<Self> {
        if files.is_empty() {
            return Err(PropertiesError::Watcher {
                message: "No files to watch".to_string(),
                source: None,
            });
        }
        if let Some(missing) = files.iter().find(|f| !f.exists()) {
            return Err(PropertiesError::Watcher {
                message: format!("File does not exist: {}", missing.display()),
                source: None,
            });
        }

        Ok(Self {
            files,
            debounce_delay: debounce_delay.unwrap_or(DEFAULT_DEBOUNCE),
            watcher: None,
            watch_thread: None,
            stop_tx: None,
        })
    }

    /// Returns the watched files.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn watch_dirs(&self) -> Result<HashSet<PathBuf>> {
        self.files
            .iter()
            .map(|file| {
                if file.is_file() {
                    file.parent()
                        .map(Path::to_path_buf)
                        .ok_or_else(|| PropertiesError::Watcher {
                            message: "Failed to get parent directory".to_string(),
                            source: None,
                        })
                } else {
                    Ok(file.clone())
                }
            })
            .collect()
    }
}

fn run_events(
    event_rx: Receiver<notify::Result<Event>>,
    stop_rx: Receiver<()>,
    files: HashSet<PathBuf>,
    debounce_delay: Duration,
    callback: ChangeCallback,
) {
    let mut last_event: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }

        let event = match event_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                tracing::warn!("File watcher error: {}", e);
                continue;
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        for path in event.paths.iter().filter(|p| files.contains(*p)) {
            let now = Instant::now();
            let should_trigger = last_event
                .get(path)
                .map(|last| now.duration_since(*last) >= debounce_delay)
                .unwrap_or(true);

            if should_trigger {
                last_event.insert(path.clone(), now);
                tracing::debug!("Properties file changed: {}", path.display());
                callback(path);
            }
        }
    }
}

impl LocationWatcher for FileWatcher {
    fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
        if self.watcher.is_some() {
            return Err(PropertiesError::Watcher {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let (event_tx, event_rx) = channel();
        let (stop_tx, stop_rx) = channel::<()>();

        let mut watcher =
            RecommendedWatcher::new(event_tx, notify::Config::default()).map_err(|e| {
                PropertiesError::Watcher {
                    message: format!("Failed to create file watcher: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;

        // watching files directly is unreliable with editors that replace them
        for dir in self.watch_dirs()? {
            watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|e| PropertiesError::Watcher {
                    message: format!("Failed to start watching {}: {}", dir.display(), e),
                    source: Some(Box::new(e)),
                })?;
        }

        let files: HashSet<PathBuf> = self.files.iter().cloned().collect();
        let debounce_delay = self.debounce_delay;
        let watch_thread =
            thread::spawn(move || run_events(event_rx, stop_rx, files, debounce_delay, callback));

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
            handle.join().map_err(|_| PropertiesError::Watcher {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::NamedTempFile;

    fn recording_callback() -> (ChangeCallback, Arc<Mutex<Vec<PathBuf>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ChangeCallback = Arc::new(move |path: &Path| {
            sink.lock().unwrap().push(path.to_path_buf());
        });
        (callback, seen)
    }

    #[test]
    fn test_file_watcher_new() {
        let temp_file = NamedTempFile::new().unwrap();
        let watcher = FileWatcher::new(vec![temp_file.path().into()], None).unwrap();
        assert_eq!(watcher.files().len(), 1);
        assert_eq!(watcher.debounce_delay, DEFAULT_DEBOUNCE);
    }

    #[test]
    fn test_file_watcher_nonexistent_file() {
        let watcher = FileWatcher::new(vec!["/nonexistent/path/app.properties".into()], None);
        assert!(matches!(watcher, Err(PropertiesError::Watcher { .. })));
    }

    #[test]
    fn test_file_watcher_no_files() {
        assert!(FileWatcher::new(Vec::new(), None).is_err());
    }

    #[test]
    fn test_file_watcher_watch_and_stop() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut watcher = FileWatcher::new(vec![temp_file.path().into()], None).unwrap();
        let (callback, _seen) = recording_callback();

        assert!(watcher.watch(callback).is_ok());
        assert!(watcher.stop().is_ok());
        // stopping twice is harmless
        assert!(watcher.stop().is_ok());
    }

    #[test]
    fn test_file_watcher_double_watch() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut watcher = FileWatcher::new(vec![temp_file.path().into()], None).unwrap();
        let (callback, _seen) = recording_callback();

        assert!(watcher.watch(callback.clone()).is_ok());
        assert!(watcher.watch(callback).is_err());

        watcher.stop().unwrap();
    }

    #[test]
    fn test_file_watcher_reports_changed_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        let mut watcher =
            FileWatcher::new(vec![path.clone()], Some(Duration::from_millis(100))).unwrap();
        let (callback, seen) = recording_callback();

        watcher.watch(callback).unwrap();
        thread::sleep(Duration::from_millis(100));
        fs::write(&path, "key=modified").unwrap();
        thread::sleep(Duration::from_millis(300));
        watcher.stop().unwrap();

        // file system notification timing varies; only check what was reported
        let seen = seen.lock().unwrap();
        assert!(seen.iter().all(|p| p == &path));
    }
}
