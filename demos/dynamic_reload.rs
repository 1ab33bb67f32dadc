// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic reload example.
//!
//! This example demonstrates:
//! - Watching file locations for changes
//! - Reloading the changed source automatically
//! - Reloading by pattern on demand
//!
//! To run this example:
//! ```bash
//! cargo run --example dynamic_reload --features reload
//! ```

#[cfg(feature = "reload")]
use hexprops::prelude::*;
#[cfg(feature = "reload")]
use std::sync::Arc;
#[cfg(feature = "reload")]
use std::thread;
#[cfg(feature = "reload")]
use std::time::Duration;

#[cfg(feature = "reload")]
fn main() -> Result<()> {
    use hexprops::ports::LocationWatcher;

    tracing_subscriber::fmt::init();

    println!("=== hexprops: Dynamic Reload ===\n");

    let file = tempfile::Builder::new().suffix(".properties").tempfile()?;
    std::fs::write(file.path(), "app.name=InitialApp\napp.port=8080\n")?;
    println!("Created properties file at: {:?}\n", file.path());

    let component = Arc::new(
        PropertiesComponent::builder()
            .with_location(format!("file:{}", file.path().display()))
            .with_cache(true)
            .build()?,
    );
    component.start()?;
    println!("Before: {}", component.resolve("{{app.name}} on {{app.port}}")?);

    let mut watcher = component.watch_files(Some(Duration::from_millis(200)))?;
    println!("Watching {} file(s)", watcher.files().len());

    thread::sleep(Duration::from_millis(200));
    std::fs::write(file.path(), "app.name=UpdatedApp\napp.port=9000\n")?;
    println!("File modified, waiting for the watcher...");
    thread::sleep(Duration::from_secs(1));

    println!("After:  {}", component.resolve("{{app.name}} on {{app.port}}")?);

    watcher.stop()?;

    // Reloads can also be triggered by hand, for every source or by pattern
    std::fs::write(file.path(), "app.name=ManualApp\napp.port=7000\n")?;
    let reloaded = component.reload(Some("*.properties"))?;
    println!(
        "Manual reload ({}): {}",
        reloaded,
        component.resolve("{{app.name}} on {{app.port}}")?
    );

    println!("\n=== Example Complete ===");
    Ok(())
}

#[cfg(not(feature = "reload"))]
fn main() {
    println!("This example requires the 'reload' feature.");
    println!("Run with: cargo run --example dynamic_reload --features reload");
}
