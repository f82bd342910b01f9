// Agent Handoff - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI and MCP stdio server.
// Usage:
//   agent-handoff [serve]                 # Run MCP server (stdio)
//   agent-handoff init [--force]          # Create docs/ layout, config, handoff doc, .vscode/mcp.json
//   agent-handoff status                  # Handoff doc + archive summary
//   agent-handoff history [<session_id>]  # List archived sessions, or show one

use agent_handoff::{
    config::HandoffConfig,
    mcp::HandoffServer,
    paths::{self, ProjectPaths},
    scaffold,
    storage::{HandoffDoc, HistoryStore},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "agent-handoff")]
#[command(author = "Joseph Stone")]
#[command(version)]
#[command(about = "Agent Handoff - MCP workflow server for continuity between coding agents")]
struct Cli {
    /// Project root (default: $AGENT_HANDOFF_ROOT, then the current directory)
    #[arg(short, long, global = true)]
    project_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run MCP server (stdio JSON-RPC)
    Serve,

    /// Create the docs/ layout, state directory, config and starter handoff document
    Init {
        /// Re-run on an initialized project (existing files are still kept)
        #[arg(long)]
        force: bool,
    },

    /// Show handoff document and archive status
    Status,

    /// List archived sessions, or print one in full
    History {
        /// Session id to print
        session_id: Option<String>,
    },
}

/// Count .md documents under the docs root
fn count_docs(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    let mut count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => count += count_docs(&path),
            Ok(t) if t.is_file() => {
                if path.extension().and_then(|e| e.to_str()) == Some("md") {
                    count += 1;
                }
            }
            _ => {}
        }
    }
    count
}

fn main() -> Result<()> {
    // Logs to stderr; stdout carries JSON-RPC
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let cli = Cli::parse();

    let root = paths::project_root(cli.project_root.as_deref())?;
    let config_path = paths::config_path_for(&root);
    let config = HandoffConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    let layout = ProjectPaths::new(&root, &config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let mut server = HandoffServer::new(&layout, &config)
                .with_context(|| format!("Failed to start server for {:?}", root))?;
            log::info!("Project root: {:?}", root);
            log::info!("Document root: {:?}", layout.docs_dir);
            server.run()?;
        }

        Commands::Init { force } => {
            let report = scaffold::init_project(&layout, &config, force)?;
            if report.already_initialized {
                println!("Project already initialized at {:?}", layout.state_dir);
                println!("Run `agent-handoff init --force` to add missing files (existing files are kept).");
                return Ok(());
            }
            for path in &report.created {
                println!("  created  {}", path.display());
            }
            for path in &report.skipped {
                println!("  kept     {}", path.display());
            }
            println!();
            println!("Initialization complete. .vscode/mcp.json registers `agent-handoff serve` as an MCP stdio server;");
            println!("then have the agent call `start_work` to begin.");
        }

        Commands::Status => {
            let handoff = HandoffDoc::new(&layout.handoff_path);
            let history = HistoryStore::new(&layout.history_dir);

            println!("Agent Handoff v{}", env!("CARGO_PKG_VERSION"));
            println!("Project: {:?}", root);
            println!();
            if handoff.exists() {
                let content = handoff.read_or_empty()?;
                println!(
                    "Handoff document: {} ({} chars, {} lines)",
                    layout.handoff_path.display(),
                    content.chars().count(),
                    content.lines().count()
                );
            } else {
                println!("Handoff document: missing ({})", layout.handoff_path.display());
            }
            println!("Documents: {} .md files under {}", count_docs(&layout.docs_dir), layout.docs_dir.display());
            println!();

            let ids = history.list()?;
            println!("Archived sessions: {}", ids.len());
            for session in history.recent(3)? {
                let when = session
                    .completed_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("  {}  {}  {}", when, session.session_id, session.user_goal);
            }
        }

        Commands::History { session_id } => {
            let history = HistoryStore::new(&layout.history_dir);
            match session_id {
                Some(id) => match history.load(&id)? {
                    Some(session) => println!("{}", serde_json::to_string_pretty(&session)?),
                    None => anyhow::bail!("No archived session {} in {:?}", id, history.dir()),
                },
                None => {
                    let sessions = history.recent(usize::MAX)?;
                    if sessions.is_empty() {
                        println!("No archived sessions.");
                    }
                    for session in sessions {
                        println!("{}", session.status_summary());
                        if let Some(ref summary) = session.summary {
                            println!("  {}", summary);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
