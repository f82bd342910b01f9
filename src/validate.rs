// Agent Handoff - Document Hygiene Validator
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Advisory checks on document writes and listings:
// - Source code / binary extensions in the docs tree
// - Overlong documents
// - Overfull directories
// Warnings only. Nothing here blocks a call.

use crate::config::HandoffConfig;
use crate::inspect;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: String) {
        self.warnings.push(msg);
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Warn when the file looks like source code or a binary
pub fn check_extension(path: &Path, config: &HandoffConfig, result: &mut ValidationResult) {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return;
    };
    if config.is_code_extension(ext) {
        result.warn(format!(
            "WARNING: writing a .{} file into the docs directory. The docs tree is for \
             documentation; keep source code and binaries in the project tree.",
            ext.to_ascii_lowercase()
        ));
    }
}

/// Warn when a document grows past the line ceiling
pub fn check_line_count(lines: usize, config: &HandoffConfig, result: &mut ValidationResult) {
    if lines > config.max_doc_lines {
        result.warn(format!(
            "WARNING: document has {} lines (recommended max: {}). Consider splitting it by topic.",
            lines, config.max_doc_lines
        ));
    }
}

/// Warn when one directory holds too many files
pub fn check_directory_size(files: usize, config: &HandoffConfig, result: &mut ValidationResult) {
    if files > config.max_files_per_dir {
        result.warn(format!(
            "WARNING: directory holds {} files (recommended max: {}). Consider grouping them into subdirectories.",
            files, config.max_files_per_dir
        ));
    }
}

/// Full check for a document write or append
pub fn validate_document(path: &Path, content: &str, config: &HandoffConfig) -> ValidationResult {
    let mut result = ValidationResult::ok();
    check_extension(path, config, &mut result);
    check_line_count(content.lines().count(), config, &mut result);
    if config.inspect_content {
        result.merge(inspect::inspect_content(content));
    }
    result
}
