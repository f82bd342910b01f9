// Agent Handoff - Path Resolution
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single source of truth for the project layout.
// Root resolution order: explicit flag, AGENT_HANDOFF_ROOT, current directory.
// Every other location is derived from the root plus HandoffConfig names.
//
// SECURITY NOTE: these are the trusted roots. Caller-supplied paths are never
// joined here; that happens in sandbox.rs.

use crate::config::HandoffConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const ROOT_ENV: &str = "AGENT_HANDOFF_ROOT";

/// Resolved layout of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub project_root: PathBuf,
    /// Sandboxed document root
    pub docs_dir: PathBuf,
    /// Server state (.agent-handoff/)
    pub state_dir: PathBuf,
    /// Archived session records
    pub history_dir: PathBuf,
    /// The handoff document, outside the document root
    pub handoff_path: PathBuf,
    pub config_path: PathBuf,
    pub call_log: PathBuf,
}

impl ProjectPaths {
    /// Derive the layout from a root and config names
    pub fn new(project_root: &Path, config: &HandoffConfig) -> Self {
        let state_dir = project_root.join(&config.state_dir);
        Self {
            project_root: project_root.to_path_buf(),
            docs_dir: project_root.join(&config.docs_dir),
            history_dir: state_dir.join(&config.history_dir),
            handoff_path: project_root.join(&config.handoff_file),
            config_path: state_dir.join(CONFIG_FILE),
            call_log: state_dir.join("calls.log"),
            state_dir,
        }
    }

    /// Create the directories the server writes into
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.docs_dir, &self.state_dir, &self.history_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {:?}", dir))?;
        }
        Ok(())
    }
}

pub const CONFIG_FILE: &str = "config.json";

/// Find the project root.
///
/// Resolution order:
///   1. Explicit path (CLI flag)
///   2. AGENT_HANDOFF_ROOT environment variable
///   3. Current working directory
///
/// Relative results are made absolute against the current directory.
pub fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;

    let chosen = match explicit {
        Some(p) => p.to_path_buf(),
        None => match std::env::var(ROOT_ENV) {
            Ok(root) if !root.trim().is_empty() => PathBuf::from(root),
            _ => cwd.clone(),
        },
    };

    if chosen.is_absolute() {
        Ok(chosen)
    } else {
        Ok(cwd.join(chosen))
    }
}

/// Config file location for a root, before the config itself is loaded.
/// The state directory name is fixed for this lookup.
pub fn config_path_for(project_root: &Path) -> PathBuf {
    project_root
        .join(HandoffConfig::default().state_dir)
        .join(CONFIG_FILE)
}
