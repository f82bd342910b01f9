// Agent Handoff - Path Sandbox
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Resolves caller-supplied relative paths against the document root.
// Two containment checks: lexical (before touching the filesystem) and
// canonical (after symlink resolution). Either failing = INVALID_PATH.
// The handoff document is reachable only through AliasTable.

use crate::error::{ToolError, ToolResult};
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` without touching the filesystem.
/// `..` at the filesystem root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Canonicalize the deepest existing ancestor and re-append the rest.
/// Input must already be normalized (no `..` left in the tail).
/// A component that exists as a symlink but cannot be resolved is rejected.
/// Components under a regular file (`f.md/x.md`) are treated as missing.
fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut tail: Vec<OsString> = Vec::new();

    loop {
        let err = match existing.canonicalize() {
            Ok(resolved) => {
                let mut out = resolved;
                for name in tail.iter().rev() {
                    out.push(name);
                }
                return Ok(out);
            }
            Err(e) => e,
        };

        // The entry is there but will not resolve
        if std::fs::symlink_metadata(&existing).is_ok() {
            if err.kind() == io::ErrorKind::NotFound {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("dangling symlink: {}", existing.display()),
                ));
            }
            return Err(err);
        }

        let name = match existing.file_name() {
            Some(name) => name.to_os_string(),
            None => return Err(err),
        };
        tail.push(name);
        if !existing.pop() {
            return Err(err);
        }
    }
}

/// A document root that caller paths cannot escape
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
    canonical_root: PathBuf,
}

impl PathSandbox {
    /// The root must exist
    pub fn new(root: &Path) -> ToolResult<Self> {
        let root = if root.is_absolute() {
            normalize_path(root)
        } else {
            normalize_path(&std::env::current_dir()?.join(root))
        };
        let canonical_root = root.canonicalize().map_err(|e| {
            ToolError::execution(format!("Document root {} unavailable: {}", root.display(), e))
        })?;
        Ok(Self { root, canonical_root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }

    fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root) || path.starts_with(&self.canonical_root)
    }

    /// Resolve a caller path to an absolute location inside the root.
    /// Empty string = the root itself.
    pub fn resolve(&self, requested: &str) -> ToolResult<PathBuf> {
        if requested.contains('\0') {
            return Err(escape_error(requested, "contains a NUL byte"));
        }
        let raw = Path::new(requested);

        let joined = if raw.is_absolute() {
            if !self.contains(&normalize_path(raw)) {
                return Err(escape_error(requested, "is outside the document root"));
            }
            raw.to_path_buf()
        } else {
            self.root.join(raw)
        };

        // Check 1: lexical containment
        let lexical = normalize_path(&joined);
        if !self.contains(&lexical) {
            return Err(escape_error(requested, "escapes the document root"));
        }

        // Check 2: containment after symlink resolution
        let canonical = canonicalize_lenient(&lexical).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidInput => escape_error(requested, &e.to_string()),
            _ => ToolError::from(e),
        })?;
        if !canonical.starts_with(&self.canonical_root) {
            return Err(escape_error(requested, "escapes the document root"));
        }

        Ok(canonical)
    }

    /// Root-relative display form with `/` separators ("" for the root)
    pub fn relative(&self, resolved: &Path) -> String {
        let rel = resolved
            .strip_prefix(&self.canonical_root)
            .or_else(|_| resolved.strip_prefix(&self.root))
            .unwrap_or(resolved);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn escape_error(requested: &str, reason: &str) -> ToolError {
    ToolError::invalid_path(format!("Path {} {}", requested, reason))
        .with_suggestion("Use paths relative to the docs directory only")
}

/// Fixed aliases that name files outside the sandbox.
/// Checked before sandbox resolution; exact string match only.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<(String, PathBuf)>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both spellings under which callers refer to the handoff document
    pub fn for_handoff(file_name: &str, handoff_path: &Path) -> Self {
        let mut table = Self::new();
        table.insert(file_name, handoff_path);
        table.insert(&format!("../{}", file_name), handoff_path);
        table
    }

    pub fn insert(&mut self, alias: &str, target: &Path) {
        self.entries.push((alias.to_string(), target.to_path_buf()));
    }

    pub fn lookup(&self, requested: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(alias, _)| alias == requested)
            .map(|(_, target)| target.as_path())
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(alias, _)| alias.as_str())
    }
}

/// Where a document tool call lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Fixed file reached through the alias table
    Alias(PathBuf),
    /// Validated location inside the document root
    Sandboxed(PathBuf),
}

impl Target {
    pub fn path(&self) -> &Path {
        match self {
            Target::Alias(p) | Target::Sandboxed(p) => p,
        }
    }
}

/// Alias table first, sandbox second
pub fn resolve_target(aliases: &AliasTable, sandbox: &PathSandbox, requested: &str) -> ToolResult<Target> {
    if let Some(target) = aliases.lookup(requested) {
        return Ok(Target::Alias(target.to_path_buf()));
    }
    sandbox.resolve(requested).map(Target::Sandboxed)
}

// ============================================================================
// TESTS
// ============================================================================
