// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the placeholder resolver.
//!
//! This example demonstrates:
//! - Building a component with initial and override properties
//! - Resolving plain, nested, optional and defaulted placeholders
//! - Escaping placeholders
//! - Reading environment variables through placeholders and functions
//!
//! To run this example:
//! ```bash
//! export APP_OWNER="Operations"
//! cargo run --example basic_usage
//! ```

use hexprops::prelude::*;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== hexprops: Basic Usage ===\n");

    let component = PropertiesComponent::builder()
        .with_initial_property("app.name", "billing")
        .with_initial_property("app.port", "8080")
        .with_initial_property("app.url", "http://{{app.host:localhost}}:{{app.port}}/{{app.name}}")
        .with_initial_property("feature.audit", "true")
        .with_override_property("app.port", "9090")
        .build()?;
    component.start()?;

    println!("--- Example 1: Plain Placeholders ---");
    println!("{}", component.resolve("Service {{app.name}} listens on {{app.port}}")?);
    println!();

    println!("--- Example 2: Nested Values ---");
    println!("app.url = {}", component.resolve("{{app.url}}")?);
    println!();

    println!("--- Example 3: Optional Keys and Defaults ---");
    println!("[{}]", component.resolve("{{?app.missing}}")?);
    println!("{}", component.resolve("timeout={{app.timeout:30s}}")?);
    println!();

    println!("--- Example 4: Negation and Escaping ---");
    println!("audit disabled: {}", component.resolve("{{!feature.audit}}")?);
    println!("{}", component.resolve("literal \\{{app.name}}")?);
    println!();

    println!("--- Example 5: Environment ---");
    // APP_OWNER is found for app.owner because environment variables win by default
    match component.resolve("owner={{app.owner}}") {
        Ok(value) => println!("✓ {}", value),
        Err(e) => println!("✗ {}", e),
    }
    println!("{}", component.resolve("home={{env:HOME:unknown}}")?);
    println!();

    println!("--- Example 6: Errors ---");
    if let Err(e) = component.resolve("{{app.missing}}") {
        println!("✗ {}", e);
    }
    if let Err(e) = component.resolve("{{app.name") {
        println!("✗ {}", e);
    }

    println!("\n--- Audit Trail ---");
    for value in component.resolved_values() {
        println!(
            "{} = {} (from {}, raw '{}')",
            value.name, value.current_value, value.source, value.original_value
        );
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
