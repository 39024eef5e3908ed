//! Scope-name values and the composition rule shared by both execution modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between path segments of a scope name.
pub const SEPARATOR: char = '/';

/// A `/`-separated scope path such as `block_0/attn/`.
///
/// The root scope is the empty string; every other scope name ends with a single trailing
/// separator so that operation names can be appended directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeName(String);

impl ScopeName {
    pub const fn root() -> Self {
        ScopeName(String::new())
    }

    /// Builds a scope name from a path, appending the trailing separator when it is missing.
    pub fn from_path(path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.is_empty() && !path.ends_with(SEPARATOR) {
            path.push(SEPARATOR);
        }
        ScopeName(path)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The path without its trailing separator (`"a/b/"` -> `"a/b"`).
    pub fn without_trailing_separator(&self) -> &str {
        self.0.strip_suffix(SEPARATOR).unwrap_or(&self.0)
    }

    /// Path segments from outermost to innermost. The root scope has none.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        let path = if self.is_root() {
            None
        } else {
            Some(self.without_trailing_separator())
        };
        path.into_iter().flat_map(|path| path.split(SEPARATOR))
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The enclosing scope, or `None` for the root.
    pub fn parent(&self) -> Option<ScopeName> {
        if self.is_root() {
            return None;
        }
        let path = self.without_trailing_separator();
        Some(match path.rfind(SEPARATOR) {
            Some(index) => ScopeName(path[..=index].to_owned()),
            None => ScopeName::root(),
        })
    }

    /// Qualifies an operation name with this scope (`"a/"` + `"add"` -> `"a/add"`).
    pub fn join_op(&self, name: &str) -> String {
        let mut qualified = String::with_capacity(self.0.len() + name.len());
        qualified.push_str(&self.0);
        qualified.push_str(name);
        qualified
    }
}

impl fmt::Display for ScopeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ScopeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeName {
    fn from(path: &str) -> Self {
        ScopeName::from_path(path)
    }
}

impl PartialEq<str> for ScopeName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ScopeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Picks `requested` unless it is absent or empty, in which case `default_name` is used.
///
/// An empty default is accepted and yields an empty effective name.
pub(crate) fn effective_name<'a>(requested: Option<&'a str>, default_name: &'a str) -> &'a str {
    match requested {
        Some(name) if !name.is_empty() => name,
        _ => default_name,
    }
}

/// Computes the scope entered below `current` for a requested name.
///
/// A name that already ends with `/` is taken as a fully qualified scope and replaces `current`.
/// Otherwise the name becomes a child of `current`. No uniqueness check happens here; repeated
/// names produce identical scopes.
pub fn compute_child_name(
    current: &ScopeName,
    requested: Option<&str>,
    default_name: &str,
) -> ScopeName {
    let name = effective_name(requested, default_name);
    if name.ends_with(SEPARATOR) {
        return ScopeName(name.to_owned());
    }
    let mut composed = String::with_capacity(current.0.len() + name.len() + 1);
    composed.push_str(&current.0);
    composed.push_str(name);
    composed.push(SEPARATOR);
    ScopeName(composed)
}
