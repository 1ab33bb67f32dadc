// SPDX-License-Identifier: MIT OR Apache-2.0

//! The properties component.
//!
//! [`PropertiesComponent`] owns the configured locations, sources, functions
//! and listeners, and resolves placeholder text against them. It is built
//! with [`PropertiesComponentBuilder`] and goes through a small lifecycle:
//!
//! ```text
//! Uninitialized --init--> Initialized --start--> Started --stop--> Stopped
//!                                                   ^                 |
//!                                                   +------start------+
//! ```
//!
//! Resolving text before `start` initializes the component lazily; sources
//! then load on first access.

use crate::adapters::functions::FunctionRegistry;
use crate::adapters::resources::{DirectoryResourceLoader, InMemoryRegistry};
use crate::adapters::sources::{ClasspathSource, FileSource, RefSource};
use crate::adapters::system::SystemProperties;
use crate::adapters::{EnvVarAdapter, PropertiesEncoding};
use crate::domain::location::parse_locations;
use crate::domain::resolved_value::DEFAULT_AUDIT_CAPACITY;
use crate::domain::{
    AuditTrail, Location, LocationResolver, PropertiesError, PropertiesMode, PropertySet,
    ResolvedValue, Result, TokenConfig,
};
use crate::ports::{
    Environment, PropertiesFunction, PropertiesLookupListener, PropertiesRegistry,
    PropertiesSource, ResourceLoader,
};
use crate::service::lookup::{
    CustomLookup, LocalProperties, MemoCache, PropertiesLookup, ResolutionChain,
};
use crate::service::parser::{ParseOptions, PropertiesParser};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Lifecycle state of a [`PropertiesComponent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentState {
    /// Built, locations not yet turned into sources.
    Uninitialized,
    /// Locations parsed into sources.
    Initialized,
    /// Sources loaded.
    Started,
    /// Source caches, audit trail and memoized lookups cleared.
    Stopped,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentState::Uninitialized => "uninitialized",
            ComponentState::Initialized => "initialized",
            ComponentState::Started => "started",
            ComponentState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Per-call resolution options.
///
/// Flags left unset fall back to the component configuration.
///
/// # Examples
///
/// ```rust
/// use hexprops::service::{LocalProperties, ResolveOptions};
///
/// let options = ResolveOptions::new()
///     .with_local(LocalProperties::new().with_property("cool.name", "Local"))
///     .keep_unresolved_optional(true);
/// assert_eq!(options.local().get("cool.name"), Some("Local"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ResolveOptions {
    local: LocalProperties,
    keep_unresolved_optional: Option<bool>,
    default_fallback_enabled: Option<bool>,
    nested_placeholder: Option<bool>,
}

impl ResolveOptions {
    /// Options that use the component configuration unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `local` as the call-scoped property layer.
    pub fn with_local(mut self, local: LocalProperties) -> Self {
        self.local = local;
        self
    }

    /// Keeps unresolved optional placeholders in the output.
    pub fn keep_unresolved_optional(mut self, keep: bool) -> Self {
        self.keep_unresolved_optional = Some(keep);
        self
    }

    /// Enables or disables `key:default` syntax for this call.
    pub fn default_fallback_enabled(mut self, enabled: bool) -> Self {
        self.default_fallback_enabled = Some(enabled);
        self
    }

    /// Enables or disables nested resolution for this call.
    pub fn nested_placeholder(mut self, nested: bool) -> Self {
        self.nested_placeholder = Some(nested);
        self
    }

    /// Returns the local properties.
    pub fn local(&self) -> &LocalProperties {
        &self.local
    }
}

/// A registered source and the order it was added in.
struct SourceEntry {
    seq: u64,
    source: Arc<dyn PropertiesSource>,
}

/// Resolves placeholder text against layered property sources.
///
/// # Examples
///
/// ```rust
/// use hexprops::service::PropertiesComponent;
///
/// # fn main() -> hexprops::domain::Result<()> {
/// let component = PropertiesComponent::builder()
///     .with_initial_property("cool.name", "Camel")
///     .with_override_property("cool.mock", "true")
///     .build()?;
/// component.start()?;
///
/// assert_eq!(component.resolve("Hello {{cool.name}}")?, "Hello Camel");
/// assert_eq!(component.resolve("{{cool.missing:fallback}}")?, "fallback");
/// assert_eq!(component.resolve_optional("{{?cool.missing}}")?, None);
/// # Ok(())
/// # }
/// ```
pub struct PropertiesComponent {
    locations: RwLock<Vec<Location>>,
    tokens: TokenConfig,
    env_mode: PropertiesMode,
    sys_mode: PropertiesMode,
    initial: PropertySet,
    overrides: PropertySet,
    ignore_missing_location: bool,
    ignore_missing_property: bool,
    nested_placeholder: bool,
    default_fallback_enabled: bool,
    keep_unresolved_optional: bool,
    encoding: PropertiesEncoding,
    resource_loader: Arc<dyn ResourceLoader>,
    registry: Arc<dyn PropertiesRegistry>,
    environment: Arc<dyn Environment>,
    system: SystemProperties,
    custom_lookup: Option<CustomLookup>,
    functions: RwLock<FunctionRegistry>,
    listeners: RwLock<Vec<Arc<dyn PropertiesLookupListener>>>,
    sources: RwLock<Vec<SourceEntry>>,
    next_seq: AtomicU64,
    memo: Option<MemoCache>,
    audit: AuditTrail,
    state: Mutex<ComponentState>,
}

impl PropertiesComponent {
    /// Creates a builder.
    pub fn builder() -> PropertiesComponentBuilder {
        PropertiesComponentBuilder::new()
    }

    /// Creates a component reading the optional `application.properties`
    /// from the working directory and the OS configuration directory of the
    /// application.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hexprops::service::PropertiesComponent;
    ///
    /// # fn main() -> hexprops::domain::Result<()> {
    /// let component = PropertiesComponent::with_defaults("myapp", "com.example")?;
    /// component.start()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_defaults(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::builder()
            .with_resource_loader(Arc::new(DirectoryResourceLoader::with_defaults(
                app_name, qualifier,
            )))
            .with_location("classpath:application.properties;optional=true")
            .build()
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> ComponentState {
        *self.lock_state()
    }

    /// Returns the placeholder tokens.
    pub fn tokens(&self) -> &TokenConfig {
        &self.tokens
    }

    /// Returns the environment variable mode.
    pub fn environment_mode(&self) -> PropertiesMode {
        self.env_mode
    }

    /// Returns the system properties mode.
    pub fn system_properties_mode(&self) -> PropertiesMode {
        self.sys_mode
    }

    /// Returns the configured locations, before `${..}` expansion.
    pub fn locations(&self) -> Vec<Location> {
        read(&self.locations).clone()
    }

    /// Returns the source names in lookup order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources_snapshot()
            .iter()
            .map(|source| source.name().to_string())
            .collect()
    }

    /// Returns the registered function names, sorted.
    pub fn function_names(&self) -> Vec<String> {
        read(&self.functions).names()
    }

    /// Parses the configured locations into sources.
    ///
    /// Does nothing unless the component is uninitialized.
    pub fn init(&self) -> Result<()> {
        let mut state = self.lock_state();
        if *state != ComponentState::Uninitialized {
            return Ok(());
        }

        let locations = self.locations();
        for location in &locations {
            let source = self.create_source(location)?;
            self.insert_source(source);
        }

        tracing::debug!(
            "Initialized properties component with {} location(s)",
            locations.len()
        );
        *state = ComponentState::Initialized;
        Ok(())
    }

    /// Loads every source, initializing first if needed.
    pub fn start(&self) -> Result<()> {
        self.init()?;

        let mut state = self.lock_state();
        if *state == ComponentState::Started {
            return Ok(());
        }

        for source in self.sources_snapshot() {
            source.load()?;
        }

        tracing::debug!("Started properties component");
        *state = ComponentState::Started;
        Ok(())
    }

    /// Clears source caches, the audit trail and memoized lookups.
    ///
    /// A later [`start`](Self::start) loads the sources again.
    pub fn stop(&self) -> Result<()> {
        let mut state = self.lock_state();
        if matches!(
            *state,
            ComponentState::Uninitialized | ComponentState::Stopped
        ) {
            return Ok(());
        }

        for source in self.sources_snapshot() {
            source.clear();
        }
        self.audit.clear();
        self.clear_memo();

        tracing::debug!("Stopped properties component");
        *state = ComponentState::Stopped;
        Ok(())
    }

    /// Resolves every placeholder in `text`.
    ///
    /// A whole-input optional placeholder that does not resolve yields an
    /// empty string; use [`resolve_optional`](Self::resolve_optional) to
    /// tell it apart.
    pub fn resolve(&self, text: &str) -> Result<String> {
        self.resolve_optional(text).map(Option::unwrap_or_default)
    }

    /// Resolves every placeholder in `text`, returning `None` when the whole
    /// input is a single optional placeholder that does not resolve.
    pub fn resolve_optional(&self, text: &str) -> Result<Option<String>> {
        self.resolve_with(text, &ResolveOptions::default())
    }

    /// Resolves `text` with call-scoped local properties and flags.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hexprops::service::{LocalProperties, PropertiesComponent, ResolveOptions};
    ///
    /// # fn main() -> hexprops::domain::Result<()> {
    /// let component = PropertiesComponent::builder()
    ///     .with_initial_property("cool.name", "Camel")
    ///     .build()?;
    ///
    /// let options = ResolveOptions::new()
    ///     .with_local(LocalProperties::new().with_property("cool.name", "Local"));
    /// let value = component.resolve_with("Hi {{cool.name}}", &options)?;
    /// assert_eq!(value.as_deref(), Some("Hi Local"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn resolve_with(&self, text: &str, options: &ResolveOptions) -> Result<Option<String>> {
        self.init()?;

        let sources = self.sources_snapshot();
        let listeners = read(&self.listeners).clone();
        let functions = read(&self.functions).clone();

        let lookup = PropertiesLookup::new(&self.overrides, &sources, &self.initial)
            .with_local(&options.local);
        let chain = ResolutionChain::new(lookup)
            .with_environment(self.environment.as_ref(), self.env_mode)
            .with_system_properties(&self.system, self.sys_mode)
            .with_custom_lookup(self.custom_lookup.as_ref())
            .with_listeners(&listeners)
            .with_audit(&self.audit)
            .with_memo(self.memo.as_ref());

        let parse_options = ParseOptions {
            default_fallback_enabled: options
                .default_fallback_enabled
                .unwrap_or(self.default_fallback_enabled),
            keep_unresolved_optional: options
                .keep_unresolved_optional
                .unwrap_or(self.keep_unresolved_optional),
            nested_placeholder: options.nested_placeholder.unwrap_or(self.nested_placeholder),
            ignore_missing_property: self.ignore_missing_property,
        };

        tracing::trace!("Resolving text: {}", text);
        PropertiesParser::new(&self.tokens)
            .with_functions(&functions)
            .parse(text, &chain, &parse_options)
    }

    /// Resolves a single key, `None` when it is not found anywhere.
    pub fn property(&self, key: &str) -> Result<Option<String>> {
        let placeholder = self.tokens.wrap(&format!("?{}", key));
        self.resolve_optional(&placeholder)
    }

    /// Resolves a single key, falling back to `default`.
    pub fn property_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .property(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Returns the merged properties of every layer except local,
    /// environment and system properties.
    ///
    /// When a key is present in several layers, the highest precedence wins.
    pub fn load_properties(&self) -> Result<PropertySet> {
        self.load_properties_filtered(&|_| true)
    }

    /// Like [`load_properties`](Self::load_properties), keeping only the
    /// keys accepted by `filter`.
    pub fn load_properties_filtered(&self, filter: &dyn Fn(&str) -> bool) -> Result<PropertySet> {
        self.init()?;

        let mut merged = self.initial.filtered(filter);
        for source in self.sources_snapshot().iter().rev() {
            merged.extend_from(&source.load_properties_filtered(filter)?);
        }
        merged.extend_from(&self.overrides.filtered(filter));
        Ok(merged)
    }

    /// Reloads the sources whose location matches `pattern`, or every
    /// source when `pattern` is `None`.
    ///
    /// Returns whether any source was reloaded.
    pub fn reload(&self, pattern: Option<&str>) -> Result<bool> {
        self.init()?;

        let mut reloaded = false;
        for source in self.sources_snapshot() {
            if source.reload(pattern)? {
                tracing::debug!("Reloaded properties source '{}'", source.name());
                reloaded = true;
            }
        }
        self.clear_memo();
        Ok(reloaded)
    }

    /// Registers a source; it ranks among the others by priority, ahead of
    /// earlier sources of the same priority.
    pub fn add_source(&self, source: Arc<dyn PropertiesSource>) {
        tracing::debug!(
            "Adding properties source '{}' with priority {}",
            source.name(),
            source.priority()
        );
        self.insert_source(source);
        self.clear_memo();
    }

    /// Registers a function, replacing any function of the same name.
    pub fn add_function(&self, function: Arc<dyn PropertiesFunction>) {
        write(&self.functions).register(function);
    }

    /// Registers a lookup listener.
    pub fn add_lookup_listener(&self, listener: Arc<dyn PropertiesLookupListener>) {
        write(&self.listeners).push(listener);
    }

    /// Adds a location, or a comma separated list of them.
    ///
    /// Once the component is initialized the new sources are created right
    /// away.
    pub fn add_location(&self, location: &str) -> Result<()> {
        let parsed = parse_locations(location)?;
        validate_locations(&parsed)?;

        let state = self.lock_state();
        if *state != ComponentState::Uninitialized {
            for location in &parsed {
                let source = self.create_source(location)?;
                if *state == ComponentState::Started {
                    source.load()?;
                }
                self.insert_source(source);
            }
            self.clear_memo();
        }

        write(&self.locations).extend(parsed);
        Ok(())
    }

    /// Returns the audit record of every resolved key, oldest first.
    pub fn resolved_values(&self) -> Vec<ResolvedValue> {
        self.audit.snapshot()
    }

    /// Returns the audit record for `name`.
    pub fn resolved_value(&self, name: &str) -> Option<ResolvedValue> {
        self.audit.get(name)
    }

    /// Returns a callback that reloads the file source behind a changed path.
    ///
    /// Hand it to a [`FileWatcher`](crate::adapters::FileWatcher); the
    /// callback holds a weak reference, so it never keeps the component alive.
    #[cfg(feature = "reload")]
    pub fn reload_callback(self: &Arc<Self>) -> crate::ports::ChangeCallback {
        let component = Arc::downgrade(self);
        Arc::new(move |path: &std::path::Path| {
            if let Some(component) = component.upgrade() {
                if let Err(e) = component.reload_path(path) {
                    tracing::warn!("Failed to reload '{}': {}", path.display(), e);
                }
            }
        })
    }

    /// Returns the expanded paths of every file location.
    #[cfg(feature = "reload")]
    pub fn file_paths(&self) -> Result<Vec<std::path::PathBuf>> {
        self.locations()
            .iter()
            .filter(|location| location.resolver() == LocationResolver::File)
            .map(|location| Ok(std::path::PathBuf::from(self.expand(location)?.path())))
            .collect()
    }

    /// Starts a [`FileWatcher`](crate::adapters::FileWatcher) on every
    /// existing file location, reloading the matching source on change.
    #[cfg(feature = "reload")]
    pub fn watch_files(
        self: &Arc<Self>,
        debounce: Option<std::time::Duration>,
    ) -> Result<crate::adapters::FileWatcher> {
        use crate::ports::LocationWatcher;

        let files = self
            .file_paths()?
            .into_iter()
            .filter(|path| path.exists())
            .collect();
        let mut watcher = crate::adapters::FileWatcher::new(files, debounce)?;
        watcher.watch(self.reload_callback())?;
        Ok(watcher)
    }

    #[cfg(feature = "reload")]
    fn reload_path(&self, path: &std::path::Path) -> Result<bool> {
        let changed = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let mut reloaded = false;
        for source in self.sources_snapshot() {
            let Some(location) = source.location() else {
                continue;
            };
            if location.resolver() != LocationResolver::File {
                continue;
            }
            let candidate = std::path::Path::new(location.path());
            let candidate =
                std::fs::canonicalize(candidate).unwrap_or_else(|_| candidate.to_path_buf());
            if candidate == changed && source.reload(Some(&location.label()))? {
                tracing::debug!("Reloaded '{}' after change", location.label());
                reloaded = true;
            }
        }
        if reloaded {
            self.clear_memo();
        }
        Ok(reloaded)
    }

    fn expand(&self, location: &Location) -> Result<Location> {
        location.expand(|name| self.system.get(name), |name| self.environment.var(name))
    }

    fn create_source(&self, location: &Location) -> Result<Arc<dyn PropertiesSource>> {
        let location = self.expand(location)?;
        let source: Arc<dyn PropertiesSource> = match location.resolver() {
            LocationResolver::File => Arc::new(
                FileSource::from_location(location)
                    .with_encoding(self.encoding)
                    .ignore_missing(self.ignore_missing_location),
            ),
            LocationResolver::Classpath => Arc::new(
                ClasspathSource::new(location, self.resource_loader.clone())
                    .with_encoding(self.encoding)
                    .ignore_missing(self.ignore_missing_location),
            ),
            LocationResolver::Ref => Arc::new(
                RefSource::new(location, self.registry.clone())
                    .ignore_missing(self.ignore_missing_location),
            ),
            _ => return Err(not_loadable(&location)),
        };
        Ok(source)
    }

    fn insert_source(&self, source: Arc<dyn PropertiesSource>) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let mut sources = write(&self.sources);
        sources.push(SourceEntry { seq, source });
        sources.sort_by(|a, b| {
            b.source
                .priority()
                .cmp(&a.source.priority())
                .then(b.seq.cmp(&a.seq))
        });
    }

    fn sources_snapshot(&self) -> Vec<Arc<dyn PropertiesSource>> {
        read(&self.sources)
            .iter()
            .map(|entry| entry.source.clone())
            .collect()
    }

    fn clear_memo(&self) {
        if let Some(memo) = &self.memo {
            write(memo).clear();
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ComponentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PropertiesComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertiesComponent")
            .field("state", &self.state())
            .field("tokens", &self.tokens)
            .field("locations", &self.locations())
            .field("sources", &self.source_names())
            .field("env_mode", &self.env_mode)
            .field("sys_mode", &self.sys_mode)
            .finish_non_exhaustive()
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn not_loadable(location: &Location) -> PropertiesError {
    PropertiesError::InvalidLocation {
        location: location.to_string(),
        message: format!("'{}' locations cannot be loaded", location.resolver()),
    }
}

fn validate_locations(locations: &[Location]) -> Result<()> {
    match locations.iter().find(|l| !l.resolver().is_loadable()) {
        Some(location) => Err(not_loadable(location)),
        None => Ok(()),
    }
}

/// Builder for [`PropertiesComponent`].
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::InMemorySource;
/// use hexprops::domain::PropertiesMode;
/// use hexprops::service::PropertiesComponentBuilder;
/// use std::sync::Arc;
///
/// # fn main() -> hexprops::domain::Result<()> {
/// let component = PropertiesComponentBuilder::new()
///     .with_tokens("${", "}")
///     .with_environment_mode(PropertiesMode::Fallback)
///     .with_source(Arc::new(InMemorySource::from_pairs("app", [("greeting", "hi")])))
///     .build()?;
/// assert_eq!(component.resolve("${greeting}")?, "hi");
/// # Ok(())
/// # }
/// ```
pub struct PropertiesComponentBuilder {
    locations: Vec<String>,
    tokens: (String, String),
    env_mode: PropertiesMode,
    sys_mode: PropertiesMode,
    initial: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
    ignore_missing_location: bool,
    ignore_missing_property: bool,
    nested_placeholder: bool,
    default_fallback_enabled: bool,
    keep_unresolved_optional: bool,
    cache: bool,
    audit_capacity: usize,
    encoding: PropertiesEncoding,
    resource_loader: Option<Arc<dyn ResourceLoader>>,
    registry: Option<Arc<dyn PropertiesRegistry>>,
    environment: Option<Arc<dyn Environment>>,
    system: Option<SystemProperties>,
    custom_lookup: Option<CustomLookup>,
    functions: Vec<Arc<dyn PropertiesFunction>>,
    listeners: Vec<Arc<dyn PropertiesLookupListener>>,
    sources: Vec<Arc<dyn PropertiesSource>>,
}

impl PropertiesComponentBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        let tokens = TokenConfig::default();
        Self {
            locations: Vec::new(),
            tokens: (tokens.prefix().to_string(), tokens.suffix().to_string()),
            env_mode: PropertiesMode::Override,
            sys_mode: PropertiesMode::Override,
            initial: Vec::new(),
            overrides: Vec::new(),
            ignore_missing_location: false,
            ignore_missing_property: false,
            nested_placeholder: true,
            default_fallback_enabled: true,
            keep_unresolved_optional: false,
            cache: false,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            encoding: PropertiesEncoding::default(),
            resource_loader: None,
            registry: None,
            environment: None,
            system: None,
            custom_lookup: None,
            functions: Vec::new(),
            listeners: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Adds a location, or a comma separated list of them.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.push(location.into());
        self
    }

    /// Adds several locations.
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations.extend(locations.into_iter().map(Into::into));
        self
    }

    /// Sets the placeholder prefix and suffix.
    pub fn with_tokens(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.tokens = (prefix.into(), suffix.into());
        self
    }

    /// Sets how environment variables take part in lookups.
    pub fn with_environment_mode(mut self, mode: PropertiesMode) -> Self {
        self.env_mode = mode;
        self
    }

    /// Sets how system properties take part in lookups.
    pub fn with_system_properties_mode(mut self, mode: PropertiesMode) -> Self {
        self.sys_mode = mode;
        self
    }

    /// Adds an initial property, used when no other layer has the key.
    pub fn with_initial_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.initial.push((key.into(), value.into()));
        self
    }

    /// Adds several initial properties.
    pub fn with_initial_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.initial
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds an override property, which wins over every source.
    pub fn with_override_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Adds several override properties.
    pub fn with_override_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Tolerates missing resources for every location.
    pub fn ignore_missing_location(mut self, ignore: bool) -> Self {
        self.ignore_missing_location = ignore;
        self
    }

    /// Leaves unresolvable placeholders in the output instead of failing.
    pub fn ignore_missing_property(mut self, ignore: bool) -> Self {
        self.ignore_missing_property = ignore;
        self
    }

    /// Enables or disables nested resolution (default on).
    pub fn nested_placeholder(mut self, nested: bool) -> Self {
        self.nested_placeholder = nested;
        self
    }

    /// Enables or disables `key:default` syntax (default on).
    pub fn default_fallback_enabled(mut self, enabled: bool) -> Self {
        self.default_fallback_enabled = enabled;
        self
    }

    /// Keeps unresolved optional placeholders in the output (default off).
    pub fn keep_unresolved_optional(mut self, keep: bool) -> Self {
        self.keep_unresolved_optional = keep;
        self
    }

    /// Memoizes lookups of the non-local layers until the next reload or stop.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Sets how many audit records are kept.
    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity;
        self
    }

    /// Sets the encoding of properties files.
    pub fn with_encoding(mut self, encoding: PropertiesEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the loader for `classpath:` locations.
    pub fn with_resource_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.resource_loader = Some(loader);
        self
    }

    /// Sets the registry for `ref:` locations.
    pub fn with_registry(mut self, registry: Arc<dyn PropertiesRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the environment, the process environment by default.
    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the system properties, the process-wide set by default.
    pub fn with_system_properties(mut self, system: SystemProperties) -> Self {
        self.system = Some(system);
        self
    }

    /// Sets a lookup consulted after every property layer.
    pub fn with_custom_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.custom_lookup = Some(Arc::new(lookup));
        self
    }

    /// Registers a function.
    pub fn with_function(mut self, function: Arc<dyn PropertiesFunction>) -> Self {
        self.functions.push(function);
        self
    }

    /// Registers a lookup listener.
    pub fn with_lookup_listener(mut self, listener: Arc<dyn PropertiesLookupListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Registers a source.
    pub fn with_source(mut self, source: Arc<dyn PropertiesSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Builds the component.
    ///
    /// # Errors
    ///
    /// Fails on an empty token or a malformed or non-loadable location.
    pub fn build(self) -> Result<PropertiesComponent> {
        let tokens = TokenConfig::new(self.tokens.0, self.tokens.1)?;

        let mut locations = Vec::new();
        for list in &self.locations {
            locations.extend(parse_locations(list)?);
        }
        validate_locations(&locations)?;

        let environment = self
            .environment
            .unwrap_or_else(|| Arc::new(EnvVarAdapter::new()));
        let system = self.system.unwrap_or_else(SystemProperties::global);

        let mut functions = FunctionRegistry::with_builtins(environment.clone(), system.clone());
        for function in self.functions {
            functions.register(function);
        }

        let component = PropertiesComponent {
            locations: RwLock::new(locations),
            tokens,
            env_mode: self.env_mode,
            sys_mode: self.sys_mode,
            initial: PropertySet::from_pairs(self.initial, &Location::initial()),
            overrides: PropertySet::from_pairs(self.overrides, &Location::overrides()),
            ignore_missing_location: self.ignore_missing_location,
            ignore_missing_property: self.ignore_missing_property,
            nested_placeholder: self.nested_placeholder,
            default_fallback_enabled: self.default_fallback_enabled,
            keep_unresolved_optional: self.keep_unresolved_optional,
            encoding: self.encoding,
            resource_loader: self
                .resource_loader
                .unwrap_or_else(|| Arc::new(DirectoryResourceLoader::new(vec![".".into()]))),
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(InMemoryRegistry::new())),
            environment,
            system,
            custom_lookup: self.custom_lookup,
            functions: RwLock::new(functions),
            listeners: RwLock::new(self.listeners),
            sources: RwLock::new(Vec::new()),
            next_seq: AtomicU64::new(0),
            memo: self.cache.then(|| RwLock::new(HashMap::new())),
            audit: AuditTrail::new(self.audit_capacity),
            state: Mutex::new(ComponentState::Uninitialized),
        };

        for source in self.sources {
            component.insert_source(source);
        }
        Ok(component)
    }
}

impl Default for PropertiesComponentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::functions::FnFunction;
    use crate::adapters::resources::InMemoryResourceLoader;
    use crate::adapters::sources::InMemorySource;
    use crate::ports::ListenerError;
    use std::sync::atomic::AtomicUsize;

    fn builder() -> PropertiesComponentBuilder {
        PropertiesComponent::builder()
            .with_environment(Arc::new(EnvVarAdapter::with_values(HashMap::new())))
            .with_system_properties(SystemProperties::new())
    }

    #[test]
    fn test_component_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PropertiesComponent>();
    }

    #[test]
    fn test_lifecycle_transitions() {
        let component = builder().build().unwrap();
        assert_eq!(component.state(), ComponentState::Uninitialized);
        component.init().unwrap();
        assert_eq!(component.state(), ComponentState::Initialized);
        component.start().unwrap();
        assert_eq!(component.state(), ComponentState::Started);
        component.stop().unwrap();
        assert_eq!(component.state(), ComponentState::Stopped);
        component.start().unwrap();
        assert_eq!(component.state(), ComponentState::Started);
    }

    #[test]
    fn test_resolve_initializes_lazily() {
        let component = builder()
            .with_initial_property("cool.name", "Camel")
            .build()
            .unwrap();
        assert_eq!(component.resolve("{{cool.name}}").unwrap(), "Camel");
        assert_eq!(component.state(), ComponentState::Initialized);
    }

    #[test]
    fn test_classpath_location_loaded_on_start() {
        let loader = InMemoryResourceLoader::new()
            .with_resource("app.properties", "cool.name=Classpath\n");
        let component = builder()
            .with_resource_loader(Arc::new(loader))
            .with_location("classpath:app.properties")
            .build()
            .unwrap();
        component.start().unwrap();
        assert_eq!(component.resolve("{{cool.name}}").unwrap(), "Classpath");
        assert_eq!(component.source_names(), vec!["classpath:app.properties"]);
    }

    #[test]
    fn test_missing_required_location_fails_start() {
        let component = builder()
            .with_resource_loader(Arc::new(InMemoryResourceLoader::new()))
            .with_location("classpath:missing.properties")
            .build()
            .unwrap();
        assert!(matches!(
            component.start(),
            Err(PropertiesError::MissingLocation { .. })
        ));
    }

    #[test]
    fn test_ignore_missing_location() {
        let component = builder()
            .with_resource_loader(Arc::new(InMemoryResourceLoader::new()))
            .with_location("classpath:missing.properties")
            .ignore_missing_location(true)
            .build()
            .unwrap();
        component.start().unwrap();
    }

    #[test]
    fn test_non_loadable_location_rejected() {
        let result = builder().with_location("initial:foo").build();
        assert!(matches!(
            result,
            Err(PropertiesError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn test_location_path_expanded_on_init() {
        let system = SystemProperties::new();
        system.set("profile", "dev");
        let loader =
            InMemoryResourceLoader::new().with_resource("app-dev.properties", "cool.env=dev\n");
        let component = builder()
            .with_system_properties(system)
            .with_resource_loader(Arc::new(loader))
            .with_location("classpath:app-${profile}.properties")
            .build()
            .unwrap();
        assert_eq!(component.resolve("{{cool.env}}").unwrap(), "dev");
        assert_eq!(
            component.locations()[0].path(),
            "app-${profile}.properties"
        );
    }

    #[test]
    fn test_later_location_wins_on_tie() {
        let loader = InMemoryResourceLoader::new()
            .with_resource("a.properties", "k=a\n")
            .with_resource("b.properties", "k=b\n");
        let component = builder()
            .with_resource_loader(Arc::new(loader))
            .with_location("classpath:a.properties,classpath:b.properties")
            .build()
            .unwrap();
        assert_eq!(component.resolve("{{k}}").unwrap(), "b");
    }

    #[test]
    fn test_source_priority_order() {
        let low = InMemorySource::from_pairs("low", [("k", "low")]).with_priority(1);
        let high = InMemorySource::from_pairs("high", [("k", "high")]).with_priority(9);
        let component = builder()
            .with_source(Arc::new(high))
            .with_source(Arc::new(low))
            .build()
            .unwrap();
        assert_eq!(component.resolve("{{k}}").unwrap(), "high");
        assert_eq!(component.source_names(), vec!["high", "low"]);
    }

    #[test]
    fn test_add_source_same_priority_newest_first() {
        let component = builder().build().unwrap();
        component.add_source(Arc::new(InMemorySource::from_pairs("first", [("k", "1")])));
        component.add_source(Arc::new(InMemorySource::from_pairs("second", [("k", "2")])));
        assert_eq!(component.resolve("{{k}}").unwrap(), "2");
    }

    #[test]
    fn test_add_location_after_start_loads() {
        let loader = InMemoryResourceLoader::new().with_resource("late.properties", "late=yes\n");
        let component = builder()
            .with_resource_loader(Arc::new(loader))
            .build()
            .unwrap();
        component.start().unwrap();
        component.add_location("classpath:late.properties").unwrap();
        assert_eq!(component.resolve("{{late}}").unwrap(), "yes");
        assert_eq!(component.locations().len(), 1);
    }

    #[test]
    fn test_add_function() {
        let component = builder().build().unwrap();
        component.add_function(Arc::new(FnFunction::new("upper", |remainder: &str| {
            Some(remainder.to_uppercase())
        })));
        assert_eq!(component.resolve("{{upper:camel}}").unwrap(), "CAMEL");
        assert!(component.function_names().contains(&"upper".to_string()));
    }

    fn poison<T: Send + Sync>(lock: &RwLock<T>) {
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = lock.write().unwrap();
                    panic!("poisoning lock");
                })
                .join()
        });
        assert!(lock.is_poisoned());
    }

    #[test]
    fn test_registration_after_poisoned_lock() {
        let component = builder().with_initial_property("a", "1").build().unwrap();
        poison(&component.functions);
        poison(&component.listeners);

        component.add_function(Arc::new(FnFunction::new("upper", |remainder: &str| {
            Some(remainder.to_uppercase())
        })));
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        component.add_lookup_listener(Arc::new(
            move |_: &str, _: &str, _: Option<&str>, _: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        ));

        assert_eq!(component.resolve("{{upper:camel}}").unwrap(), "CAMEL");
        let before = seen.load(Ordering::SeqCst);
        assert_eq!(component.resolve("{{a}}").unwrap(), "1");
        assert_eq!(seen.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_builtin_functions_registered() {
        let names = builder().build().unwrap().function_names();
        for name in ["boolean", "env", "service", "service.host", "service.port", "sys"] {
            assert!(names.contains(&name.to_string()), "missing {}", name);
        }
    }

    struct Counting(AtomicUsize);

    impl PropertiesLookupListener for Counting {
        fn on_lookup(
            &self,
            _name: &str,
            _value: &str,
            _default: Option<&str>,
            _source: &str,
        ) -> std::result::Result<(), ListenerError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_add_lookup_listener() {
        let listener = Arc::new(Counting(AtomicUsize::new(0)));
        let component = builder()
            .with_initial_property("a", "1")
            .build()
            .unwrap();
        component.add_lookup_listener(listener.clone());
        component.resolve("{{a}} {{a}}").unwrap();
        assert_eq!(listener.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_property_and_property_or() {
        let component = builder()
            .with_initial_property("a", "1")
            .build()
            .unwrap();
        assert_eq!(component.property("a").unwrap().as_deref(), Some("1"));
        assert_eq!(component.property("b").unwrap(), None);
        assert_eq!(component.property_or("b", "2").unwrap(), "2");
    }

    #[test]
    fn test_load_properties_merges_by_precedence() {
        let component = builder()
            .with_initial_property("a", "initial")
            .with_initial_property("b", "initial")
            .with_initial_property("db.url", "initial")
            .with_override_property("a", "override")
            .with_source(Arc::new(InMemorySource::from_pairs(
                "src",
                [("a", "source"), ("b", "source"), ("c", "source")],
            )))
            .build()
            .unwrap();

        let merged = component.load_properties().unwrap();
        assert_eq!(merged.get("a"), Some("override"));
        assert_eq!(merged.get("b"), Some("source"));
        assert_eq!(merged.get("c"), Some("source"));

        let db = component
            .load_properties_filtered(&|key| key.starts_with("db."))
            .unwrap();
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_resolve_with_per_call_flags() {
        let component = builder().build().unwrap();
        let keep = ResolveOptions::new().keep_unresolved_optional(true);
        assert_eq!(
            component.resolve_with("x {{?nope}}", &keep).unwrap().as_deref(),
            Some("x {{?nope}}")
        );

        let no_default = ResolveOptions::new().default_fallback_enabled(false);
        assert!(matches!(
            component.resolve_with("{{a:b}}", &no_default),
            Err(PropertiesError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_stop_clears_audit() {
        let component = builder()
            .with_initial_property("a", "1")
            .build()
            .unwrap();
        component.start().unwrap();
        component.resolve("{{a}}").unwrap();
        assert_eq!(component.resolved_values().len(), 1);
        assert_eq!(component.resolved_value("a").unwrap().source, "initial");
        component.stop().unwrap();
        assert!(component.resolved_values().is_empty());
    }

    #[test]
    fn test_reload_clears_memo() {
        let source = Arc::new(InMemorySource::from_pairs("src", [("k", "1")]));
        let component = builder()
            .with_cache(true)
            .with_source(source.clone())
            .build()
            .unwrap();
        assert_eq!(component.resolve("{{k}}").unwrap(), "1");
        source.insert("k", "2");
        assert_eq!(component.resolve("{{k}}").unwrap(), "1");
        assert!(!component.reload(None).unwrap());
        assert_eq!(component.resolve("{{k}}").unwrap(), "2");
    }

    #[test]
    fn test_debug_lists_sources() {
        let component = builder()
            .with_source(Arc::new(InMemorySource::new("mem")))
            .build()
            .unwrap();
        let debug = format!("{:?}", component);
        assert!(debug.contains("mem"));
        assert!(debug.contains("Uninitialized"));
    }
}
