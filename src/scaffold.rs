// Agent Handoff - Project Scaffolding
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// `agent-handoff init`: lays out the docs tree, the state directory,
// a default config.json and a starter handoff document, plus an editor
// MCP registration (.vscode/mcp.json) and, in git checkouts, a state-dir
// .gitignore. Existing files are never overwritten, with or without --force.

use crate::config::HandoffConfig;
use crate::paths::ProjectPaths;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Recommended docs layout: (directory, README body)
const DOC_SECTIONS: &[(&str, &str)] = &[
    (
        "01_Goals_and_Status",
        "# Goals and Status\n\n\
         This directory holds:\n\
         - Overall project goals and vision\n\
         - Current development progress\n\
         - Development conventions\n\n\
         ## Suggested documents\n\n\
         - `vision.md` - project vision and goals\n\
         - `current_progress.md` - current progress\n\
         - `development_guide.md` - conventions\n",
    ),
    (
        "02_Architecture_and_Usage",
        "# Architecture and Usage\n\n\
         This directory holds:\n\
         - Technical architecture\n\
         - API documentation\n\
         - Component usage notes\n\n\
         ## Suggested documents\n\n\
         - `architecture.md` - system architecture\n\
         - `api.md` - API reference\n\
         - `components.md` - component notes\n",
    ),
    (
        "03_History_and_Lessons",
        "# History and Lessons\n\n\
         This directory holds:\n\
         - Development history\n\
         - Decision records\n\
         - Bug tracking\n\
         - Lessons learned\n\n\
         ## Suggested documents\n\n\
         - `timeline.md` - development timeline\n\
         - `decisions.md` - key decisions\n\
         - `bug_tracker.md` - bug tracking\n\
         - `lessons_learned.md` - lessons learned\n",
    ),
    (
        "04_User_Facing",
        "# User-Facing Documentation\n\n\
         This directory holds:\n\
         - End-user documentation\n\
         - Usage guides\n\
         - FAQ\n\n\
         ## Suggested documents\n\n\
         - `README.md` - project introduction\n\
         - `user_guide.md` - usage guide\n\
         - `faq.md` - frequently asked questions\n",
    ),
];

const STARTER_HANDOFF: &str = "# Agent README

**Status**: Not Started
**Last Updated**: Project Initialization

## Project Overview

This is a new project. After the first agent completes a task, handoff notes will be written here.

## Current Status

- agent-handoff has been initialized
- Waiting for the first development task

## Next Steps

1. Fill in project goals and requirements in `docs/01_Goals_and_Status/`
2. Describe the technical architecture in `docs/02_Architecture_and_Usage/`
3. Call the `start_work` tool to begin the first task

---

This document is rewritten by the agent at the end of each task (`end_job`).
";

const STATE_GITIGNORE: &str = "# agent-handoff tool call log
calls.log

# Uncomment to keep session history out of the repository
# history/
";

/// Editor registration that launches this binary as a stdio MCP server
fn mcp_registration(project_root: &Path) -> Result<String> {
    let command = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "agent-handoff".to_string());
    let config = json!({
        "servers": {
            "agent-handoff": {
                "type": "stdio",
                "command": command,
                "args": ["serve"],
                "cwd": project_root.to_string_lossy(),
            }
        },
        "inputs": [],
    });
    Ok(serde_json::to_string_pretty(&config)?)
}

/// What init did
#[derive(Debug, Default)]
pub struct InitReport {
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// State directory already present and --force not given; nothing was touched
    pub already_initialized: bool,
}

fn write_new(path: &Path, content: &str, report: &mut InitReport) -> Result<()> {
    if path.exists() {
        report.skipped.push(path.to_path_buf());
        return Ok(());
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    report.created.push(path.to_path_buf());
    Ok(())
}

fn make_dir(dir: &Path, report: &mut InitReport) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    report.created.push(dir.to_path_buf());
    Ok(())
}

/// Create the project layout under `paths.project_root`
pub fn init_project(paths: &ProjectPaths, config: &HandoffConfig, force: bool) -> Result<InitReport> {
    let mut report = InitReport::default();

    if paths.state_dir.exists() && !force {
        report.already_initialized = true;
        return Ok(report);
    }

    for (section, readme) in DOC_SECTIONS {
        let dir = paths.docs_dir.join(section);
        make_dir(&dir, &mut report)?;
        write_new(&dir.join("README.md"), readme, &mut report)?;
    }
    make_dir(&paths.history_dir, &mut report)?;

    if paths.config_path.exists() {
        report.skipped.push(paths.config_path.clone());
    } else {
        config.save(&paths.config_path)?;
        report.created.push(paths.config_path.clone());
    }

    write_new(&paths.handoff_path, STARTER_HANDOFF, &mut report)?;

    let vscode_dir = paths.project_root.join(".vscode");
    make_dir(&vscode_dir, &mut report)?;
    write_new(&vscode_dir.join("mcp.json"), &mcp_registration(&paths.project_root)?, &mut report)?;

    if paths.project_root.join(".git").exists() {
        write_new(&paths.state_dir.join(".gitignore"), STATE_GITIGNORE, &mut report)?;
    }

    log::info!(
        "Initialized {:?}: {} created, {} kept",
        paths.project_root,
        report.created.len(),
        report.skipped.len()
    );
    Ok(report)
}
