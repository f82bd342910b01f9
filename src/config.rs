// Agent Handoff - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Layout names, hygiene thresholds and extension tables.
// Loaded from .agent-handoff/config.json, falling back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration for one project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HandoffConfig {
    pub version: String,
    /// Document root, relative to the project root
    pub docs_dir: String,
    /// Server state directory, relative to the project root
    pub state_dir: String,
    /// Archive directory, relative to state_dir
    pub history_dir: String,
    /// Handoff document, relative to the project root
    pub handoff_file: String,
    /// Minimum trimmed length of the handoff document accepted by end_job
    pub min_handoff_chars: usize,
    /// Advisory line ceiling for a single document
    pub max_doc_lines: usize,
    /// Advisory file ceiling for a single directory
    pub max_files_per_dir: usize,
    pub max_search_results: usize,
    /// Extensions visited by directory searches
    pub search_extensions: Vec<String>,
    /// Extensions that draw a "not documentation" warning on write
    pub code_extensions: Vec<String>,
    /// Credential inspection on written content
    pub inspect_content: bool,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            docs_dir: "docs".to_string(),
            state_dir: ".agent-handoff".to_string(),
            history_dir: "history".to_string(),
            handoff_file: "agentreadme.md".to_string(),
            min_handoff_chars: 50,
            max_doc_lines: 500,
            max_files_per_dir: 20,
            max_search_results: 500,
            search_extensions: ["md", "markdown", "txt", "rst", "json", "yaml", "yml"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            code_extensions: [
                // program source
                "py", "rs", "js", "jsx", "ts", "tsx", "c", "cc", "cpp", "cxx", "h", "hpp",
                "cs", "java", "kt", "go", "rb", "php", "swift", "scala", "lua", "sh", "bash",
                "ps1", "bat",
                // compiled / binary
                "exe", "dll", "so", "dylib", "o", "a", "bin", "class", "jar", "pyc", "wasm",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            inspect_content: true,
        }
    }
}

impl HandoffConfig {
    /// Load config from JSON file, falling back to defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            log::warn!("Config not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save config to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Case-insensitive extension lookup
    pub fn is_code_extension(&self, ext: &str) -> bool {
        self.code_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_search_extension(&self, ext: &str) -> bool {
        self.search_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

// ============================================================================
// TESTS
// ============================================================================
