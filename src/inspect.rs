// Agent Handoff - Content Inspection
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Inspects document content for credential patterns (API keys, tokens,
// private keys). Docs are shared with every later agent; secrets in them leak.

use crate::validate::ValidationResult;

/// Token prefixes agents tend to paste from their shell or CI config
const TOKEN_PREFIXES: &[(&str, &str)] = &[
    ("sk-", "API secret key"),
    ("AKIA", "AWS access key"),
    ("ghp_", "GitHub personal access token"),
    ("github_pat_", "GitHub fine-grained token"),
    ("glpat-", "GitLab access token"),
    ("xoxb-", "Slack bot token"),
];

/// `name=value` / `name: value` settings copied out of .env files, matched case-insensitively
const SECRET_SETTINGS: &[&str] = &["password", "secret", "api_key", "access_token"];

/// Prefix patterns only count when followed by a token-like run
const MIN_TOKEN_TAIL: usize = 8;

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn has_token(content: &str, prefix: &str) -> bool {
    content.match_indices(prefix).any(|(idx, _)| {
        let tail = &content[idx + prefix.len()..];
        tail.chars().take_while(|c| is_token_char(*c)).count() >= MIN_TOKEN_TAIL
    })
}

/// A setting name directly followed by `=` or `:` and a non-empty value
fn has_setting(lowered: &str, name: &str) -> bool {
    lowered.match_indices(name).any(|(idx, _)| {
        let rest = lowered[idx + name.len()..].trim_start_matches(' ');
        let Some(value) = rest.strip_prefix('=').or_else(|| rest.strip_prefix(':')) else {
            return false;
        };
        !value.lines().next().unwrap_or("").trim().is_empty()
    })
}

fn has_private_key(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.starts_with("-----BEGIN ") && line.contains("PRIVATE KEY"))
}

/// Inspect content being written or appended
pub fn inspect_content(content: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for (prefix, description) in TOKEN_PREFIXES {
        if has_token(content, prefix) {
            result.warn(format!("WARNING: credential detected in document. Possible {}", description));
        }
    }

    let lowered = content.to_lowercase();
    for name in SECRET_SETTINGS {
        if has_setting(&lowered, name) {
            result.warn(format!("WARNING: credential detected in document. Hardcoded {} value", name));
        }
    }

    if has_private_key(content) {
        result.warn("WARNING: credential detected in document. Private key block".to_string());
    }
    result
}

// ============================================================================
// TESTS
// ============================================================================
