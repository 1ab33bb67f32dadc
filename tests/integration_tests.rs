// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for resolving placeholders through the component.
//!
//! These tests exercise the placeholder syntax end to end: nesting, optional
//! keys, defaults, escaping, quoting, functions and every location resolver.

mod common;

use common::{isolated, isolated_with_env, temp_file, RecordingListener};
use hexprops::adapters::{FnFunction, InMemoryRegistry, InMemoryResourceLoader, SystemProperties};
use hexprops::domain::PropertiesError;
use hexprops::ports::{ListenerError, PropertiesLookupListener};
use hexprops::service::{LocalProperties, PropertiesComponent, ResolveOptions};
use std::collections::HashMap;
use std::sync::Arc;

fn camel() -> PropertiesComponent {
    isolated()
        .with_initial_property("cool.name", "Camel")
        .with_initial_property("cool.greeting", "Hi {{cool.name}}")
        .with_initial_property("cool.key", "name")
        .build()
        .unwrap()
}

#[test]
fn test_resolve_simple_placeholder() {
    let component = camel();
    component.start().unwrap();
    assert_eq!(component.resolve("Hello {{cool.name}}!").unwrap(), "Hello Camel!");
    assert_eq!(component.resolve("no placeholders").unwrap(), "no placeholders");
}

#[test]
fn test_missing_key_message_contains_input() {
    let err = camel().resolve("x {{cool.missing}}").unwrap_err();
    assert!(matches!(err, PropertiesError::KeyNotFound { .. }));
    assert_eq!(
        err.to_string(),
        "Property with key [cool.missing] not found in properties from text: x {{cool.missing}}"
    );
    assert_eq!(err.key(), Some("cool.missing"));
}

#[test]
fn test_nested_value_and_nested_key() {
    let component = camel();
    assert_eq!(component.resolve("{{cool.greeting}}").unwrap(), "Hi Camel");
    assert_eq!(component.resolve("{{cool.{{cool.key}}}}").unwrap(), "Camel");
}

#[test]
fn test_circular_reference_detected() {
    let component = isolated()
        .with_initial_property("a", "{{b}}")
        .with_initial_property("b", "{{a}}")
        .build()
        .unwrap();
    let err = component.resolve("{{a}}").unwrap_err();
    assert!(matches!(err, PropertiesError::CircularReference { .. }));
    assert!(err.to_string().contains("from text: {{a}}"));
}

#[test]
fn test_optional_placeholder() {
    let component = camel();
    assert_eq!(component.resolve("a{{?cool.nope}}b").unwrap(), "ab");
    assert_eq!(component.resolve_optional("{{?cool.nope}}").unwrap(), None);
    assert_eq!(component.resolve("{{?cool.nope}}").unwrap(), "");
    assert_eq!(
        component.resolve_optional("{{?cool.name}}").unwrap().as_deref(),
        Some("Camel")
    );
}

#[test]
fn test_keep_unresolved_optional() {
    let component = isolated().keep_unresolved_optional(true).build().unwrap();
    assert_eq!(component.resolve("a{{?nope}}b").unwrap(), "a{{?nope}}b");
}

#[test]
fn test_get_or_else() {
    let component = camel();
    assert_eq!(component.resolve("{{cool.nope:Default}}").unwrap(), "Default");
    assert_eq!(component.resolve("{{cool.name:Default}}").unwrap(), "Camel");
    assert_eq!(
        component.resolve("{{cool.url:http://localhost:8080}}").unwrap(),
        "http://localhost:8080"
    );

    let err = component.resolve("{{:x}}").unwrap_err();
    assert!(matches!(err, PropertiesError::InvalidGetOrElseSyntax { .. }));
}

#[test]
fn test_get_or_else_disabled() {
    let component = isolated()
        .with_initial_property("a:b", "colon key")
        .default_fallback_enabled(false)
        .build()
        .unwrap();
    assert_eq!(component.resolve("{{a:b}}").unwrap(), "colon key");
}

#[test]
fn test_escaped_placeholder() {
    let component = camel();
    assert_eq!(
        component.resolve("\\{{cool.name}} is {{cool.name}}").unwrap(),
        "{{cool.name}} is Camel"
    );
}

#[test]
fn test_quoted_tokens_are_not_placeholders() {
    let component = camel();
    assert_eq!(
        component.resolve("'{{' {{cool.name}} \"}}\"").unwrap(),
        "'{{' Camel \"}}\""
    );
}

#[test]
fn test_unbalanced_tokens() {
    let component = camel();
    let err = component.resolve("{{cool.name").unwrap_err();
    assert_eq!(err.to_string(), "Missing }} from the text: {{cool.name");
    let err = component.resolve("cool.name}}").unwrap_err();
    assert_eq!(err.to_string(), "Missing {{ from the text: cool.name}}");
}

#[test]
fn test_negation() {
    let component = isolated()
        .with_initial_property("flag", "true")
        .build()
        .unwrap();
    assert_eq!(component.resolve("{{!flag}}").unwrap(), "false");
}

#[test]
fn test_ignore_missing_property() {
    let component = isolated().ignore_missing_property(true).build().unwrap();
    assert_eq!(component.resolve("x {{nope}} y").unwrap(), "x {{nope}} y");
}

#[test]
fn test_text_resembling_internal_markers_is_untouched() {
    let component = camel();
    assert_eq!(component.resolve("email @@[x]@@").unwrap(), "email @@[x]@@");
    assert_eq!(
        component.resolve("@@[{{cool.name}}]@@").unwrap(),
        "@@[Camel]@@"
    );

    let component = isolated().ignore_missing_property(true).build().unwrap();
    assert_eq!(
        component.resolve("@@[a]@@ {{nope}}").unwrap(),
        "@@[a]@@ {{nope}}"
    );
}

#[test]
fn test_custom_tokens() {
    let component = isolated()
        .with_tokens("${", "}")
        .with_initial_property("cool.name", "Camel")
        .build()
        .unwrap();
    assert_eq!(component.resolve("Hi ${cool.name}").unwrap(), "Hi Camel");
    assert_eq!(component.property("cool.name").unwrap().as_deref(), Some("Camel"));
}

#[test]
fn test_env_function() {
    let component = isolated_with_env(&[("HOME", "/home/camel")]).build().unwrap();
    assert_eq!(component.resolve("{{env:HOME}}").unwrap(), "/home/camel");
    assert_eq!(component.resolve("{{env:NOPE:fallback}}").unwrap(), "fallback");

    let err = component.resolve("{{env:NOPE}}").unwrap_err();
    assert!(matches!(
        err,
        PropertiesError::FunctionReturnedNull { ref function, .. } if function == "env"
    ));
}

#[test]
fn test_sys_function() {
    let system = SystemProperties::new();
    system.set("app.mode", "batch");
    let component = isolated().with_system_properties(system).build().unwrap();
    assert_eq!(component.resolve("{{sys:app.mode}}").unwrap(), "batch");
    assert_eq!(component.resolve("{{sys:app.nope:dev}}").unwrap(), "dev");
}

#[test]
fn test_boolean_function_resolves_key_first() {
    let component = isolated()
        .with_initial_property("feature", "yes")
        .build()
        .unwrap();
    assert_eq!(component.resolve("{{boolean:feature}}").unwrap(), "true");
}

#[test]
fn test_service_functions() {
    let component = isolated_with_env(&[
        ("BILLING_SERVICE_HOST", "10.0.0.1"),
        ("BILLING_SERVICE_PORT", "8080"),
    ])
    .build()
    .unwrap();
    assert_eq!(component.resolve("{{service:billing}}").unwrap(), "10.0.0.1:8080");
    assert_eq!(component.resolve("{{service.host:billing}}").unwrap(), "10.0.0.1");
    assert_eq!(component.resolve("{{service.port:billing}}").unwrap(), "8080");
    assert_eq!(
        component.resolve("{{service:audit:localhost:9090}}").unwrap(),
        "localhost:9090"
    );
}

#[test]
fn test_custom_function() {
    let component = isolated()
        .with_function(Arc::new(FnFunction::new("reverse", |s: &str| {
            Some(s.chars().rev().collect())
        })))
        .build()
        .unwrap();
    assert_eq!(component.resolve("{{reverse:lemac}}").unwrap(), "camel");
}

#[test]
fn test_ref_location() {
    let registry = InMemoryRegistry::new();
    let mut props = HashMap::new();
    props.insert("cool.name".to_string(), "FromRegistry  ".to_string());
    registry.bind("myProps", props);

    let component = isolated()
        .with_registry(Arc::new(registry))
        .with_location("ref:myProps")
        .build()
        .unwrap();
    component.start().unwrap();
    assert_eq!(component.resolve("{{cool.name}}").unwrap(), "FromRegistry");
}

#[test]
fn test_classpath_location() {
    let loader = InMemoryResourceLoader::new()
        .with_resource("com/acme/app.properties", "# comment\ncool.name = Classpath\n");
    let component = isolated()
        .with_resource_loader(Arc::new(loader))
        .with_location("com/acme/app.properties")
        .build()
        .unwrap();
    assert_eq!(component.resolve("{{cool.name}}").unwrap(), "Classpath");
}

#[test]
fn test_file_location_trims_trailing_spaces() {
    let file = temp_file("cool.name=Camel   \ncool.tab=a\\t\n", "properties");
    let component = isolated()
        .with_location(format!("file:{}", file.path().display()))
        .build()
        .unwrap();
    component.start().unwrap();
    assert_eq!(component.resolve("[{{cool.name}}]").unwrap(), "[Camel]");
    assert_eq!(component.resolve("[{{cool.tab}}]").unwrap(), "[a\t]");
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_file_location() {
    let file = temp_file("cool:\n  name: Yaml\n  ports:\n    - 80\n    - 443\n", "yaml");
    let component = isolated()
        .with_location(format!("file:{}", file.path().display()))
        .build()
        .unwrap();
    assert_eq!(
        component.resolve("{{cool.name}}:{{cool.ports.1}}").unwrap(),
        "Yaml:443"
    );
}

#[test]
fn test_optional_missing_file_location() {
    let component = isolated()
        .with_location("file:/definitely/not/here.properties;optional=true")
        .with_initial_property("cool.name", "Initial")
        .build()
        .unwrap();
    component.start().unwrap();
    assert_eq!(component.resolve("{{cool.name}}").unwrap(), "Initial");
}

#[test]
fn test_missing_file_location_fails() {
    let component = isolated()
        .with_location("file:/definitely/not/here.properties")
        .build()
        .unwrap();
    assert!(matches!(
        component.start(),
        Err(PropertiesError::MissingLocation { .. })
    ));
}

#[test]
fn test_local_properties() {
    let component = camel();
    let options = ResolveOptions::new()
        .with_local(LocalProperties::new().with_property("cool.name", "Local"));
    assert_eq!(
        component
            .resolve_with("{{cool.greeting}}", &options)
            .unwrap()
            .as_deref(),
        Some("Hi Local")
    );
    // locals never leak into other calls
    assert_eq!(component.resolve("{{cool.greeting}}").unwrap(), "Hi Camel");
}

#[test]
fn test_custom_lookup() {
    let component = isolated()
        .with_custom_lookup(|name| (name == "dynamic").then(|| "computed".to_string()))
        .build()
        .unwrap();
    assert_eq!(component.resolve("{{dynamic}}").unwrap(), "computed");
    assert!(component.resolve("{{other}}").is_err());
}

#[test]
fn test_listener_and_audit_trail() {
    let listener = Arc::new(RecordingListener::default());
    let component = isolated()
        .with_initial_property("cool.name", "Camel")
        .with_initial_property("cool.greeting", "Hi {{cool.name}}")
        .with_lookup_listener(listener.clone())
        .build()
        .unwrap();

    assert_eq!(component.resolve("{{cool.greeting}}").unwrap(), "Hi Camel");
    assert_eq!(listener.names(), vec!["cool.greeting", "cool.name"]);

    let greeting = component.resolved_value("cool.greeting").unwrap();
    assert_eq!(greeting.original_value, "Hi {{cool.name}}");
    assert_eq!(greeting.current_value, "Hi Camel");
    assert_eq!(greeting.source, "initial");
    assert_eq!(component.resolved_values().len(), 2);
}

struct Failing;

impl PropertiesLookupListener for Failing {
    fn on_lookup(
        &self,
        _name: &str,
        _value: &str,
        _default_value: Option<&str>,
        _source: &str,
    ) -> Result<(), ListenerError> {
        Err("listener down".into())
    }
}

#[test]
fn test_failing_listener_does_not_break_resolution() {
    let component = camel();
    component.add_lookup_listener(Arc::new(Failing));
    assert_eq!(component.resolve("{{cool.name}}").unwrap(), "Camel");
}

#[test]
fn test_resolve_is_shared_across_threads() {
    let component = Arc::new(camel());
    component.start().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let component = Arc::clone(&component);
            std::thread::spawn(move || component.resolve("{{cool.greeting}}").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "Hi Camel");
    }
}
