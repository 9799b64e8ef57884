//! Explicit handler registry.
//!
//! Handlers are registered by path (`"ai/sd/generate"`) before the router
//! runs. Every proper prefix of a registered path becomes a namespace. The
//! identifier derived from the path (`AI::SD::Generate`) is the load key, so
//! a path that matches always loads. Lookups compare segments, never
//! joined keys, so a single token like `git/status` matches nothing.

use crate::context::Context;
use crate::error::{JikkoError, Result};
use crate::naming;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

pub const KEY_SEPARATOR: char = '/';

/// Entry point every handler exposes: residual args in, side effects out.
pub type Handler = fn(&Context, &[String]) -> anyhow::Result<()>;

// ---------------------------------------------------------------------------
// CommandPath
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandPath(Vec<String>);

impl CommandPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse `a/b/c`. Rejects empty segments and flag-like segments.
    pub fn parse(key: &str) -> Result<Self> {
        let segments: Vec<String> = key.split(KEY_SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty() || s.starts_with('-')) {
            return Err(JikkoError::InvalidCommandPath(key.to_string()));
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The path extended by one segment, leaving `self` untouched.
    pub fn with(&self, segment: &str) -> Self {
        let mut next = self.0.clone();
        next.push(segment.to_string());
        Self(next)
    }

    pub fn key(&self) -> String {
        self.0.join(&KEY_SEPARATOR.to_string())
    }

    pub fn identifier(&self) -> String {
        naming::handler_identifier(&self.0)
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for CommandPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// HandlerEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HandlerEntry {
    path: CommandPath,
    identifier: String,
    summary: String,
    handler: Handler,
}

impl HandlerEntry {
    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn invoke(&self, ctx: &Context, args: &[String]) -> anyhow::Result<()> {
        (self.handler)(ctx, args)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Registry {
    handlers: BTreeMap<CommandPath, HandlerEntry>,
    by_identifier: HashMap<String, CommandPath>,
    namespaces: BTreeSet<CommandPath>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, summary: &str, handler: Handler) -> Result<()> {
        let path = CommandPath::parse(key)?;
        if self.handlers.contains_key(&path) {
            return Err(JikkoError::DuplicateCommand(path.to_string()));
        }

        let identifier = path.identifier();
        if let Some(existing) = self.by_identifier.get(&identifier) {
            return Err(JikkoError::IdentifierCollision {
                path: path.to_string(),
                identifier,
                existing: existing.to_string(),
            });
        }

        for depth in 1..path.len() {
            let prefix: CommandPath = path.segments()[..depth].iter().cloned().collect();
            self.namespaces.insert(prefix);
        }

        self.by_identifier.insert(identifier.clone(), path.clone());
        self.handlers.insert(
            path.clone(),
            HandlerEntry {
                path,
                identifier,
                summary: summary.to_string(),
                handler,
            },
        );
        Ok(())
    }

    pub fn has_handler(&self, path: &CommandPath) -> bool {
        self.handlers.contains_key(path)
    }

    pub fn has_namespace(&self, path: &CommandPath) -> bool {
        self.namespaces.contains(path)
    }

    /// Look up a handler by its derived identifier.
    pub fn load(&self, identifier: &str) -> Option<&HandlerEntry> {
        self.by_identifier
            .get(identifier)
            .and_then(|path| self.handlers.get(path))
    }

    /// All handlers, sorted by path.
    pub fn entries(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.handlers.values()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
