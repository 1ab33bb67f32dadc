// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in properties functions and the function registry.
//!
//! A placeholder of the form `{{name:remainder}}` whose `name` is registered
//! is handed to that function instead of the lookup chain:
//!
//! | Function       | Example                      | Result                                   |
//! |----------------|------------------------------|------------------------------------------|
//! | `env`          | `{{env:HOME:/root}}`         | environment variable, with default       |
//! | `sys`          | `{{sys:app.name}}`           | system property, with default            |
//! | `boolean`      | `{{boolean:feature.on}}`     | the resolved value evaluated as a predicate |
//! | `service`      | `{{service:billing}}`        | `BILLING_SERVICE_HOST:BILLING_SERVICE_PORT` |
//! | `service.host` | `{{service.host:billing}}`   | `BILLING_SERVICE_HOST`                   |
//! | `service.port` | `{{service.port:billing}}`   | `BILLING_SERVICE_PORT`                   |

use crate::adapters::env_var::EnvVarAdapter;
use crate::adapters::system::SystemProperties;
use crate::domain::tokens::{GET_OR_ELSE_TOKEN, OPTIONAL_TOKEN};
use crate::ports::{Environment, PropertiesFunction};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Splits `name[:default]`, dropping a leading optional marker from the name.
fn split_default(remainder: &str) -> (&str, Option<&str>) {
    let remainder = remainder.strip_prefix(OPTIONAL_TOKEN).unwrap_or(remainder);
    match remainder.split_once(GET_OR_ELSE_TOKEN) {
        Some((name, default)) => (name.trim(), Some(default)),
        None => (remainder.trim(), None),
    }
}

/// Turns a service name into its environment variable stem: `my-svc` → `MY_SVC`.
fn service_stem(name: &str) -> String {
    name.to_uppercase().replace(['-', '.'], "_")
}

/// `env:NAME[:default]`, reads an environment variable.
///
/// The name is upper-cased; if that is not set, dashes and dots are replaced
/// by underscores.
pub struct EnvFunction {
    env: Arc<dyn Environment>,
}

impl EnvFunction {
    /// Creates the function reading the process environment.
    pub fn new() -> Self {
        Self::with_environment(Arc::new(EnvVarAdapter::new()))
    }

    /// Creates the function reading `env`.
    pub fn with_environment(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Default for EnvFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertiesFunction for EnvFunction {
    fn name(&self) -> &str {
        "env"
    }

    fn apply(&self, remainder: &str) -> Option<String> {
        let (name, default) = split_default(remainder);
        self.env
            .lookup(name)
            .or_else(|| default.map(str::to_string))
    }
}

/// `sys:name[:default]`, reads a system property.
pub struct SysFunction {
    props: SystemProperties,
}

impl SysFunction {
    /// Creates the function reading the global system properties.
    pub fn new() -> Self {
        Self::with_properties(SystemProperties::global())
    }

    /// Creates the function reading `props`.
    pub fn with_properties(props: SystemProperties) -> Self {
        Self { props }
    }
}

impl Default for SysFunction {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertiesFunction for SysFunction {
    fn name(&self) -> &str {
        "sys"
    }

    fn apply(&self, remainder: &str) -> Option<String> {
        let (name, default) = split_default(remainder);
        self.props
            .get(name)
            .or_else(|| default.map(str::to_string))
    }
}

/// `boolean:key`, evaluates the value of `key` as a predicate.
///
/// The key is resolved first. Accepted values, ignoring case and surrounding
/// whitespace: `true`, `yes`, `on`, `1` and `false`, `no`, `off`, `0`;
/// comparisons `a == b` and `a != b`; a leading `!` negates. Anything else is
/// a miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanFunction;

impl BooleanFunction {
    fn evaluate(expression: &str) -> Option<bool> {
        let expression = expression.trim();
        if let Some(negated) = expression.strip_prefix('!') {
            return Self::evaluate(negated).map(|b| !b);
        }
        if let Some((left, right)) = expression.split_once("!=") {
            return Some(left.trim() != right.trim());
        }
        if let Some((left, right)) = expression.split_once("==") {
            return Some(left.trim() == right.trim());
        }
        match expression.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl PropertiesFunction for BooleanFunction {
    fn name(&self) -> &str {
        "boolean"
    }

    fn apply(&self, remainder: &str) -> Option<String> {
        Self::evaluate(remainder).map(|b| b.to_string())
    }

    fn lookup_first(&self, _remainder: &str) -> bool {
        true
    }
}

/// Which part of a service address a [`ServiceFunction`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicePart {
    /// `host:port`
    Address,
    /// The host only.
    Host,
    /// The port only.
    Port,
}

/// `service:name[:default]`, resolves a service address from the environment.
///
/// Reads `NAME_SERVICE_HOST` and `NAME_SERVICE_PORT`, the convention used by
/// container orchestrators to publish services.
pub struct ServiceFunction {
    env: Arc<dyn Environment>,
    part: ServicePart,
}

impl ServiceFunction {
    /// Creates the function for `part`, reading the process environment.
    pub fn new(part: ServicePart) -> Self {
        Self::with_environment(part, Arc::new(EnvVarAdapter::new()))
    }

    /// Creates the function for `part`, reading `env`.
    pub fn with_environment(part: ServicePart, env: Arc<dyn Environment>) -> Self {
        Self { env, part }
    }
}

impl PropertiesFunction for ServiceFunction {
    fn name(&self) -> &str {
        match self.part {
            ServicePart::Address => "service",
            ServicePart::Host => "service.host",
            ServicePart::Port => "service.port",
        }
    }

    fn apply(&self, remainder: &str) -> Option<String> {
        let (name, default) = split_default(remainder);
        let stem = service_stem(name);
        let host = || self.env.var(&format!("{}_SERVICE_HOST", stem));
        let port = || self.env.var(&format!("{}_SERVICE_PORT", stem));

        let value = match self.part {
            ServicePart::Address => match (host(), port()) {
                (Some(host), Some(port)) => Some(format!("{}:{}", host, port)),
                _ => None,
            },
            ServicePart::Host => host(),
            ServicePart::Port => port(),
        };
        value.or_else(|| default.map(str::to_string))
    }
}

type ApplyFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// A function backed by a closure.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::FnFunction;
/// use hexprops::ports::PropertiesFunction;
///
/// let reverse = FnFunction::new("reverse", |s| Some(s.chars().rev().collect()));
/// assert_eq!(reverse.apply("abc").as_deref(), Some("cba"));
/// ```
pub struct FnFunction {
    name: String,
    apply: Box<ApplyFn>,
    lookup_first: bool,
}

impl FnFunction {
    /// Creates a function named `name` calling `apply`.
    pub fn new<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            apply: Box::new(apply),
            lookup_first: false,
        }
    }

    /// Makes the parser resolve the remainder as a key before calling the closure.
    pub fn with_lookup_first(mut self, lookup_first: bool) -> Self {
        self.lookup_first = lookup_first;
        self
    }
}

impl fmt::Debug for FnFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFunction")
            .field("name", &self.name)
            .field("lookup_first", &self.lookup_first)
            .finish()
    }
}

impl PropertiesFunction for FnFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, remainder: &str) -> Option<String> {
        (self.apply)(remainder)
    }

    fn lookup_first(&self, _remainder: &str) -> bool {
        self.lookup_first
    }
}

/// Functions by name.
///
/// Registering a function under an existing name replaces it.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn PropertiesFunction>>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in functions.
    pub fn with_builtins(env: Arc<dyn Environment>, props: SystemProperties) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EnvFunction::with_environment(env.clone())));
        registry.register(Arc::new(SysFunction::with_properties(props)));
        registry.register(Arc::new(BooleanFunction));
        for part in [ServicePart::Address, ServicePart::Host, ServicePart::Port] {
            registry.register(Arc::new(ServiceFunction::with_environment(part, env.clone())));
        }
        registry
    }

    /// Registers a function under its name.
    pub fn register(&mut self, function: Arc<dyn PropertiesFunction>) {
        tracing::debug!("Registering properties function '{}'", function.name());
        self.functions.insert(function.name().to_string(), function);
    }

    /// Whether a function with this name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the function registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn PropertiesFunction>> {
        self.functions.get(name).cloned()
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
