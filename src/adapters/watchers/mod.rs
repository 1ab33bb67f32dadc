// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher implementations for properties change detection.
//!
//! This module contains implementations of the `LocationWatcher` trait for
//! monitoring the resources behind property locations.

#[cfg(feature = "reload")]
pub mod file_watcher;

#[cfg(feature = "reload")]
pub use file_watcher::FileWatcher;
