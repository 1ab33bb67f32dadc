// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property locations.
//!
//! A [`Location`] identifies where a property came from: a classpath
//! resource, a file, a registry reference, or one of the in-memory layers
//! (initial, override, local). Locations are configured as strings of the
//! form `resolver:path[;optional=true]`, several of them separated by commas.

use crate::domain::errors::{PropertiesError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Suffix marking a configured location as optional.
const OPTIONAL_SUFFIX: &str = "optional=true";

/// The resolver a location is loaded through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationResolver {
    /// A resource found on the resource search path.
    Classpath,
    /// A file on the filesystem.
    File,
    /// A named property map held in a registry.
    Ref,
    /// Defaults of last resort.
    Initial,
    /// Administrator-injected overrides.
    Override,
    /// Call-scoped overrides.
    Local,
}

impl LocationResolver {
    /// Returns the textual name of the resolver as used in location strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationResolver::Classpath => "classpath",
            LocationResolver::File => "file",
            LocationResolver::Ref => "ref",
            LocationResolver::Initial => "initial",
            LocationResolver::Override => "override",
            LocationResolver::Local => "local",
        }
    }

    /// Whether locations using this resolver are backed by a loadable resource.
    pub fn is_loadable(&self) -> bool {
        matches!(
            self,
            LocationResolver::Classpath | LocationResolver::File | LocationResolver::Ref
        )
    }
}

impl fmt::Display for LocationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationResolver {
    type Err = PropertiesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "classpath" => Ok(LocationResolver::Classpath),
            "file" => Ok(LocationResolver::File),
            "ref" => Ok(LocationResolver::Ref),
            "initial" => Ok(LocationResolver::Initial),
            "override" => Ok(LocationResolver::Override),
            "local" => Ok(LocationResolver::Local),
            other => Err(PropertiesError::InvalidLocation {
                location: s.to_string(),
                message: format!("unknown resolver '{}'", other),
            }),
        }
    }
}

/// Where a property set is loaded from.
///
/// # Examples
///
/// ```
/// use hexprops::domain::{Location, LocationResolver};
///
/// let location: Location = "file:/etc/app.properties;optional=true".parse().unwrap();
/// assert_eq!(location.resolver(), LocationResolver::File);
/// assert_eq!(location.path(), "/etc/app.properties");
/// assert!(location.is_optional());
///
/// // classpath is the default resolver
/// let location: Location = "app.properties".parse().unwrap();
/// assert_eq!(location.resolver(), LocationResolver::Classpath);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    resolver: LocationResolver,
    path: String,
    optional: bool,
}

impl Location {
    /// Creates a new location.
    pub fn new(resolver: LocationResolver, path: impl Into<String>, optional: bool) -> Self {
        Self {
            resolver,
            path: path.into(),
            optional,
        }
    }

    /// Location used for initial (default) properties.
    pub fn initial() -> Self {
        Self::new(LocationResolver::Initial, "", false)
    }

    /// Location used for override properties.
    pub fn overrides() -> Self {
        Self::new(LocationResolver::Override, "", false)
    }

    /// Location used for call-scoped local properties.
    pub fn local() -> Self {
        Self::new(LocationResolver::Local, "", false)
    }

    /// Returns the resolver.
    pub fn resolver(&self) -> LocationResolver {
        self.resolver
    }

    /// Returns the path, without resolver prefix or optional flag.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether a missing backing resource is tolerated.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns a copy of this location with the given optional flag.
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Returns `resolver:path`, the form used in diagnostics and reload patterns.
    pub fn label(&self) -> String {
        if self.path.is_empty() {
            self.resolver.to_string()
        } else {
            format!("{}:{}", self.resolver, self.path)
        }
    }

    /// Expands `${name}` and `${env:NAME}` (or `${env.NAME}`) references in the path.
    ///
    /// Plain names are resolved through `sys`, `env:` names through `env`. An
    /// unresolvable reference or an unterminated `${` is an
    /// [`PropertiesError::InvalidLocation`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hexprops::domain::Location;
    ///
    /// let location: Location = "file:${app.home}/conf/${env:PROFILE}.properties".parse().unwrap();
    /// let expanded = location
    ///     .expand(
    ///         |name| (name == "app.home").then(|| "/opt/app".to_string()),
    ///         |name| (name == "PROFILE").then(|| "prod".to_string()),
    ///     )
    ///     .unwrap();
    /// assert_eq!(expanded.path(), "/opt/app/conf/prod.properties");
    /// ```
    pub fn expand<S, E>(&self, sys: S, env: E) -> Result<Location>
    where
        S: Fn(&str) -> Option<String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.path.len());
        let mut rest = self.path.as_str();

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| PropertiesError::InvalidLocation {
                location: self.label(),
                message: "missing '}' in path".to_string(),
            })?;
            let name = &after[..end];

            let value = match name
                .strip_prefix("env:")
                .or_else(|| name.strip_prefix("env."))
            {
                Some(var) => env(var),
                None => sys(name),
            };
            let value = value.ok_or_else(|| PropertiesError::InvalidLocation {
                location: self.label(),
                message: format!("cannot resolve '${{{}}}' in path", name),
            })?;

            out.push_str(&value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);

        Ok(Location {
            resolver: self.resolver,
            path: out,
            optional: self.optional,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if self.optional {
            write!(f, ";{}", OPTIONAL_SUFFIX)?;
        }
        Ok(())
    }
}

impl FromStr for Location {
    type Err = PropertiesError;

    fn from_str(s: &str) -> Result<Self> {
        // people configure locations across several lines
        let value = s.trim();
        if value.is_empty() {
            return Err(PropertiesError::InvalidLocation {
                location: s.to_string(),
                message: "empty location".to_string(),
            });
        }

        let (resolver, rest) = match value.split_once(':') {
            Some((resolver, rest)) => (resolver.parse::<LocationResolver>()?, rest),
            None => (LocationResolver::Classpath, value),
        };

        let (path, optional) = match rest.rsplit_once(';') {
            Some((path, flag)) => match optional_flag(flag) {
                Some(optional) => (path, optional),
                None => (rest, false),
            },
            None => (rest, false),
        };

        Ok(Location::new(resolver, path.trim(), optional))
    }
}

/// Reads an `optional=<bool>` flag, `None` when `flag` is not one.
fn optional_flag(flag: &str) -> Option<bool> {
    let (name, value) = flag.trim().split_once('=')?;
    if !name.trim().eq_ignore_ascii_case("optional") {
        return None;
    }
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses a comma separated list of locations.
///
/// Blank entries are skipped.
///
/// # Examples
///
/// ```
/// use hexprops::domain::location::parse_locations;
///
/// let locations = parse_locations("classpath:a.properties, file:/tmp/b.properties;optional=true").unwrap();
/// assert_eq!(locations.len(), 2);
/// assert!(locations[1].is_optional());
/// ```
pub fn parse_locations(list: &str) -> Result<Vec<Location>> {
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse)
        .collect()
}
