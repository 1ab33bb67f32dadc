// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placeholder parser.
//!
//! The parser finds `{{key}}` tokens in a string, resolves each key through a
//! [`PlaceholderLookup`] or a registered function, and splices the values
//! back in. Supported key syntax:
//!
//! | Syntax             | Meaning                                                  |
//! |--------------------|----------------------------------------------------------|
//! | `{{key}}`          | required key                                             |
//! | `{{?key}}`         | optional key, removed when missing                       |
//! | `{{key:default}}`  | get-or-else, `default` when the key is missing           |
//! | `{{fn:remainder}}` | function call when `fn` is a registered function name    |
//! | `{{!key}}`         | negation of a `true`/`false` result (whole input only)   |
//! | `\{{key}}`         | literal `{{key}}`                                        |
//! | `'{{'` / `"}}"`    | quoted tokens are not placeholders                       |
//!
//! With nested resolution enabled, resolved values are parsed again, and keys
//! may themselves be built from placeholders (`{{db.{{env}}.url}}`).

use crate::adapters::functions::FunctionRegistry;
use crate::domain::tokens::{
    ESCAPE_CHAR, GET_OR_ELSE_TOKEN, NEGATE_TOKEN, OPTIONAL_TOKEN, UNRESOLVED_PREFIX,
    UNRESOLVED_SUFFIX,
};
use crate::domain::{PropertiesError, PropertySet, Result, TokenConfig};
use crate::ports::PropertiesFunction;
use std::cell::Cell;
use std::collections::HashSet;
use std::sync::Arc;

/// Resolves a single key for the parser.
pub trait PlaceholderLookup {
    /// Returns the value for `key`, or `Ok(None)` when no layer has it.
    ///
    /// `default` is the get-or-else default in effect, passed along for
    /// observers; the parser applies it itself.
    fn get_property(&self, key: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Called with the fully resolved value of a key whose raw value
    /// contained placeholders.
    fn on_resolved(&self, _key: &str, _value: &str) {}
}

impl PlaceholderLookup for PropertySet {
    fn get_property(&self, key: &str, _default: Option<&str>) -> Result<Option<String>> {
        Ok(self.get(key).map(str::to_string))
    }
}

/// Per-call parser flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Whether `{{key:default}}` is treated as get-or-else.
    pub default_fallback_enabled: bool,
    /// Whether missing optional keys are kept as `{{?key}}` instead of removed.
    pub keep_unresolved_optional: bool,
    /// Whether resolved values are parsed again.
    pub nested_placeholder: bool,
    /// Whether missing required keys are kept as `{{key}}` instead of failing.
    pub ignore_missing_property: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_fallback_enabled: true,
            keep_unresolved_optional: false,
            nested_placeholder: true,
            ignore_missing_property: false,
        }
    }
}

/// Position of a placeholder in the text being parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Token {
    /// Index of the prefix
    start: usize,
    /// Index just past the suffix
    end: usize,
    key_start: usize,
    key_end: usize,
}

/// Placeholder parser.
///
/// # Examples
///
/// ```rust
/// use hexprops::domain::{Location, PropertySet, TokenConfig};
/// use hexprops::service::{ParseOptions, PropertiesParser};
///
/// let props = PropertySet::from_pairs(
///     [("cool.name", "Camel"), ("greeting", "Hello {{cool.name}}")],
///     &Location::initial(),
/// );
/// let tokens = TokenConfig::default();
/// let parser = PropertiesParser::new(&tokens);
/// let options = ParseOptions::default();
///
/// let result = parser.parse("{{greeting}}!", &props, &options).unwrap();
/// assert_eq!(result.as_deref(), Some("Hello Camel!"));
///
/// let result = parser.parse("{{missing:fallback}}", &props, &options).unwrap();
/// assert_eq!(result.as_deref(), Some("fallback"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PropertiesParser<'a> {
    tokens: &'a TokenConfig,
    functions: Option<&'a FunctionRegistry>,
}

impl<'a> PropertiesParser<'a> {
    /// Creates a parser for the given tokens, without functions.
    pub fn new(tokens: &'a TokenConfig) -> Self {
        Self {
            tokens,
            functions: None,
        }
    }

    /// Makes the functions of `registry` callable from placeholders.
    pub fn with_functions(mut self, registry: &'a FunctionRegistry) -> Self {
        self.functions = Some(registry);
        self
    }

    /// Parses `text`, replacing every placeholder.
    ///
    /// Returns `Ok(None)` when the whole input was a single optional
    /// placeholder that resolved to nothing.
    pub fn parse(
        &self,
        text: &str,
        lookup: &dyn PlaceholderLookup,
        options: &ParseOptions,
    ) -> Result<Option<String>> {
        let negate_prefix = format!("{}{}", self.tokens.prefix(), NEGATE_TOKEN);
        let (input, negate) = match text.strip_prefix(negate_prefix.as_str()) {
            Some(rest) => (format!("{}{}", self.tokens.prefix(), rest), true),
            None => (text.to_string(), false),
        };

        let run = ParseRun {
            parser: self,
            lookup,
            options,
            original: text,
            marked: Cell::new(false),
        };
        let parsed = if options.nested_placeholder {
            run.parse_nested(&input, &HashSet::new())?
        } else {
            run.parse_flat(&input)?
        };

        let marked = run.marked.get();
        Ok(parsed.map(|value| {
            let value = if marked {
                self.restore_unresolved(value)
            } else {
                value
            };
            let value = self.unescape(value);
            if negate {
                negate_boolean(value)
            } else {
                value
            }
        }))
    }

    fn prefix(&self) -> &str {
        self.tokens.prefix()
    }

    fn suffix(&self) -> &str {
        self.tokens.suffix()
    }

    fn function(&self, name: &str) -> Option<Arc<dyn PropertiesFunction>> {
        self.functions.and_then(|registry| registry.resolve(name))
    }

    /// Finds the placeholder to resolve next, at or after `start`.
    fn read_token(&self, text: &str, start: usize, original: &str) -> Result<Option<Token>> {
        let mut from = start;
        // prefixes before `floor` belong to literal (escaped) pairs
        let mut floor = start;

        loop {
            let Some(suffix) = self.find_suffix(text, from) else {
                if self.has_open_prefix(text, start, text.len()) {
                    return Err(PropertiesError::UnbalancedToken {
                        missing: self.suffix().to_string(),
                        text: original.to_string(),
                    });
                }
                return Ok(None);
            };

            let end = suffix + self.suffix().len();
            match self.find_prefix_before(text, floor, suffix) {
                None => {
                    return Err(PropertiesError::UnbalancedToken {
                        missing: self.prefix().to_string(),
                        text: original.to_string(),
                    })
                }
                Some(prefix) if is_escaped(text, prefix) => {
                    tracing::trace!("Skipping escaped placeholder at {} in: {}", prefix, text);
                    from = end;
                    floor = end;
                }
                Some(prefix) => {
                    return Ok(Some(Token {
                        start: prefix,
                        end,
                        key_start: prefix + self.prefix().len(),
                        key_end: suffix,
                    }))
                }
            }
        }
    }

    /// First suffix at or after `from` that is neither quoted nor escaped.
    fn find_suffix(&self, text: &str, from: usize) -> Option<usize> {
        let suffix = self.suffix();
        text[from..]
            .match_indices(suffix)
            .map(|(index, _)| from + index)
            .find(|&index| !is_quoted(text, index, suffix.len()) && !is_escaped(text, index))
    }

    /// Nearest unquoted prefix in `text[floor..before]`.
    fn find_prefix_before(&self, text: &str, floor: usize, before: usize) -> Option<usize> {
        let prefix = self.prefix();
        text[floor..before]
            .rmatch_indices(prefix)
            .map(|(index, _)| floor + index)
            .find(|&index| !is_quoted(text, index, prefix.len()))
    }

    /// Whether `text[lo..hi]` contains a prefix that is neither quoted nor escaped.
    fn has_open_prefix(&self, text: &str, lo: usize, hi: usize) -> bool {
        let prefix = self.prefix();
        text[lo..hi]
            .match_indices(prefix)
            .map(|(index, _)| lo + index)
            .any(|index| !is_quoted(text, index, prefix.len()) && !is_escaped(text, index))
    }

    /// Turns unresolved markers back into placeholders.
    fn restore_unresolved(&self, value: String) -> String {
        if !value.contains(UNRESOLVED_PREFIX) {
            return value;
        }
        value
            .replace(UNRESOLVED_PREFIX, self.prefix())
            .replace(UNRESOLVED_SUFFIX, self.suffix())
    }

    /// Drops the escaping backslash in front of a prefix or suffix.
    ///
    /// Only odd runs of backslashes escape a token; even runs are left alone.
    fn unescape(&self, value: String) -> String {
        if !value.contains(ESCAPE_CHAR) {
            return value;
        }

        let mut out = String::with_capacity(value.len());
        let mut i = 0;
        while i < value.len() {
            let rest = &value[i..];
            if !rest.starts_with(ESCAPE_CHAR) {
                let next = rest.find(ESCAPE_CHAR).unwrap_or(rest.len());
                out.push_str(&rest[..next]);
                i += next;
                continue;
            }

            let run = rest.len() - rest.trim_start_matches(ESCAPE_CHAR).len();
            let after = &rest[run..];
            let escapes_token = run % 2 == 1
                && (after.starts_with(self.prefix()) || after.starts_with(self.suffix()));
            let keep = if escapes_token { run - 1 } else { run };
            out.extend(std::iter::repeat(ESCAPE_CHAR).take(keep));
            i += run;
        }
        out
    }
}

/// Whether the token at `index` sits directly between two equal quotes.
fn is_quoted(text: &str, index: usize, len: usize) -> bool {
    let before = text[..index].chars().next_back();
    let after = text[index + len..].chars().next();
    match (before, after) {
        (Some(b), Some(a)) => b == a && (b == '\'' || b == '"'),
        _ => false,
    }
}

/// Whether the token at `index` is preceded by an odd run of backslashes.
fn is_escaped(text: &str, index: usize) -> bool {
    let run = text[..index]
        .bytes()
        .rev()
        .take_while(|b| *b == ESCAPE_CHAR as u8)
        .count();
    run % 2 == 1
}

fn negate_boolean(value: String) -> String {
    if value.eq_ignore_ascii_case("true") {
        "false".to_string()
    } else if value.eq_ignore_ascii_case("false") {
        "true".to_string()
    } else {
        value
    }
}

fn split_optional(raw_key: &str) -> (&str, bool) {
    match raw_key.strip_prefix(OPTIONAL_TOKEN) {
        Some(key) => (key, true),
        None => (raw_key, false),
    }
}

/// State of a single `parse` call.
struct ParseRun<'p, 'a> {
    parser: &'p PropertiesParser<'a>,
    lookup: &'p dyn PlaceholderLookup,
    options: &'p ParseOptions,
    /// The text handed to `parse`, reported in errors
    original: &'p str,
    /// Set once a placeholder was left behind as a marker
    marked: Cell<bool>,
}

impl ParseRun<'_, '_> {
    fn unresolved(&self, content: &str) -> String {
        self.marked.set(true);
        format!("{}{}{}", UNRESOLVED_PREFIX, content, UNRESOLVED_SUFFIX)
    }

    fn parse_flat(&self, input: &str) -> Result<Option<String>> {
        let mut answer = String::with_capacity(input.len());
        let mut start = 0;

        while let Some(token) = self.parser.read_token(input, start, self.original)? {
            if self.parser.has_open_prefix(input, start, token.start) {
                return Err(PropertiesError::UnbalancedToken {
                    missing: self.parser.suffix().to_string(),
                    text: self.original.to_string(),
                });
            }
            answer.push_str(&input[start..token.start]);

            let raw_key = &input[token.key_start..token.key_end];
            match self.resolve_token(raw_key, &HashSet::new())? {
                Some(value) => answer.push_str(&value),
                None if token.start == 0 && token.end == input.len() => return Ok(None),
                None => {}
            }
            start = token.end;
        }

        answer.push_str(&input[start..]);
        Ok(Some(answer))
    }

    fn parse_nested(&self, input: &str, visited: &HashSet<String>) -> Result<Option<String>> {
        let mut answer = input.to_string();

        while let Some(token) = self.parser.read_token(&answer, 0, self.original)? {
            let value = self.resolve_token(&answer[token.key_start..token.key_end], visited)?;
            let before = &answer[..token.start];
            let after = &answer[token.end..];
            answer = match value {
                Some(value) => format!("{}{}{}", before, value, after),
                None if before.is_empty() && after.is_empty() => return Ok(None),
                None => format!("{}{}", before, after),
            };
        }
        Ok(Some(answer))
    }

    /// Resolves the content of one placeholder, including nested values.
    fn resolve_token(&self, raw_key: &str, visited: &HashSet<String>) -> Result<Option<String>> {
        let (key, optional) = split_optional(raw_key);
        let nested = self.options.nested_placeholder;

        if nested && visited.contains(key) {
            if optional {
                tracing::debug!(
                    "Optional property with key [{}] refers to itself, ignoring it",
                    key
                );
                return Ok(None);
            }
            return Err(PropertiesError::CircularReference {
                key: key.to_string(),
                text: self.original.to_string(),
            });
        }

        let (value, looked_up) = self.resolve_key(key, optional, visited)?;
        match value {
            Some(value) if nested && value.contains(self.parser.prefix()) => {
                let mut branch = visited.clone();
                branch.insert(key.to_string());
                let resolved = self.parse_nested(&value, &branch)?;
                if let (Some(name), Some(resolved)) = (looked_up, resolved.as_deref()) {
                    self.lookup.on_resolved(name, resolved);
                }
                Ok(resolved)
            }
            other => Ok(other),
        }
    }

    /// Resolves a key without the optional marker.
    ///
    /// Returns the raw value and, for plain lookups, the key that was looked up.
    fn resolve_key<'k>(
        &self,
        key: &'k str,
        optional: bool,
        visited: &HashSet<String>,
    ) -> Result<(Option<String>, Option<&'k str>)> {
        if let Some((name, remainder)) = key.split_once(GET_OR_ELSE_TOKEN) {
            if let Some(function) = self.parser.function(name) {
                let value = self.apply_function(key, name, remainder, &function, optional, visited)?;
                return Ok((value, None));
            }
        }

        let (real_key, default) = match key.split_once(GET_OR_ELSE_TOKEN) {
            Some((real_key, default)) if self.options.default_fallback_enabled => {
                if real_key.is_empty() {
                    return Err(PropertiesError::InvalidGetOrElseSyntax {
                        key: key.to_string(),
                        text: self.original.to_string(),
                    });
                }
                (real_key, Some(default))
            }
            _ => (key, None),
        };

        if let Some(value) = self.lookup.get_property(real_key, default)? {
            return Ok((Some(value), Some(real_key)));
        }
        if let Some(default) = default {
            tracing::debug!(
                "Property with key [{}] not found, using default value: {}",
                real_key,
                default
            );
            return Ok((Some(default.to_string()), None));
        }
        Ok((self.missing(key, optional)?, None))
    }

    fn apply_function(
        &self,
        key: &str,
        name: &str,
        remainder: &str,
        function: &Arc<dyn PropertiesFunction>,
        optional: bool,
        visited: &HashSet<String>,
    ) -> Result<Option<String>> {
        let remainder_optional = remainder.starts_with(OPTIONAL_TOKEN);
        let mut argument = remainder.to_string();

        if function.lookup_first(remainder) {
            match self.resolve_token(remainder, visited)? {
                None => return Ok(None),
                Some(value) if value.contains(UNRESOLVED_PREFIX) => {
                    let content = if optional {
                        format!("{}{}", OPTIONAL_TOKEN, key)
                    } else {
                        key.to_string()
                    };
                    return Ok(Some(self.unresolved(&content)));
                }
                Some(value) => argument = value,
            }
        }

        tracing::debug!(
            "Property with key [{}] is applied by function [{}]",
            key,
            name
        );
        if let Some(value) = function.apply(&argument) {
            return Ok(Some(value));
        }

        let tolerated = optional || remainder_optional || function.optional(&argument);
        if tolerated {
            if optional && self.options.keep_unresolved_optional {
                return Ok(Some(self.unresolved(&format!("{}{}", OPTIONAL_TOKEN, key))));
            }
            return Ok(None);
        }
        if self.options.ignore_missing_property {
            return Ok(Some(self.unresolved(key)));
        }
        Err(PropertiesError::FunctionReturnedNull {
            key: key.to_string(),
            function: name.to_string(),
            text: self.original.to_string(),
        })
    }

    /// Outcome for a key no layer could resolve.
    fn missing(&self, key: &str, optional: bool) -> Result<Option<String>> {
        if optional {
            if self.options.keep_unresolved_optional {
                return Ok(Some(self.unresolved(&format!("{}{}", OPTIONAL_TOKEN, key))));
            }
            return Ok(None);
        }
        if self.options.ignore_missing_property {
            return Ok(Some(self.unresolved(key)));
        }
        Err(PropertiesError::KeyNotFound {
            key: key.to_string(),
            text: self.original.to_string(),
        })
    }
}
