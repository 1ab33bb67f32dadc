// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-source example.
//!
//! This example demonstrates:
//! - Loading properties from files, resources and a registry
//! - Source priorities and the lookup order
//! - System properties from `-Dkey=value` arguments
//! - Call-scoped local properties
//! - Registering custom functions
//!
//! To run this example:
//! ```bash
//! cargo run --example multi_source -- -Dapp.profile=prod
//! ```

use hexprops::adapters::{FnFunction, InMemoryRegistry, InMemoryResourceLoader};
use hexprops::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== hexprops: Multiple Sources ===\n");

    // A properties file on disk
    let file = tempfile::Builder::new().suffix(".properties").tempfile()?;
    std::fs::write(
        file.path(),
        "# database settings\ndb.host = db.internal\ndb.port = 5432\ndb.url = jdbc://{{db.host}}:{{db.port}}/{{app.name}}\n",
    )?;

    // Resources bundled with the application
    let resources = InMemoryResourceLoader::new().with_resource(
        "defaults.properties",
        "app.name=inventory\napp.profile=dev\ndb.port=3306\n",
    );

    // A registry of named property maps
    let registry = InMemoryRegistry::new();
    let mut secrets = HashMap::new();
    secrets.insert("db.password".to_string(), "s3cr3t".to_string());
    registry.bind("secrets", secrets);

    // System properties from the command line, e.g. -Dapp.profile=prod
    let system = SystemProperties::load_env_args();

    let component = PropertiesComponent::builder()
        .with_location("classpath:defaults.properties")
        .with_location(format!("file:{}", file.path().display()))
        .with_location("ref:secrets")
        .with_location("file:/etc/inventory/override.properties;optional=true")
        .with_resource_loader(Arc::new(resources))
        .with_registry(Arc::new(registry))
        .with_system_properties(system)
        .with_source(Arc::new(
            InMemorySource::from_pairs("runtime", [("app.instance", "node-1")]).with_priority(200),
        ))
        .with_function(Arc::new(FnFunction::new("upper", |s: &str| {
            Some(s.to_uppercase())
        })))
        .build()?;
    component.start()?;

    println!("--- Sources, in lookup order ---");
    for name in component.source_names() {
        println!("  {}", name);
    }
    println!();

    println!("--- Resolved ---");
    println!("profile  = {}", component.resolve("{{app.profile}}")?);
    println!("db.url   = {}", component.resolve("{{db.url}}")?);
    println!("password = {}", component.resolve("{{db.password}}")?);
    println!("instance = {}", component.resolve("{{upper:{{app.instance}}}}")?);
    println!();

    println!("--- Local Properties ---");
    let options = ResolveOptions::new()
        .with_local(LocalProperties::new().with_property("db.host", "localhost"));
    if let Some(url) = component.resolve_with("{{db.url}}", &options)? {
        println!("db.url for this call = {}", url);
    }
    println!();

    println!("--- Merged View ---");
    let merged = component.load_properties_filtered(&|key| key.starts_with("db."))?;
    for (key, entry) in merged.iter() {
        println!("  {} = {} ({})", key, entry.value(), entry.location());
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
