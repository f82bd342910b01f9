// Agent Handoff - Durable Storage
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Flat-file persistence:
//   .agent-handoff/history/session_<id>.json   one record per archived session
//   agentreadme.md                             the handoff document
// No transactions: end_job writes the handoff doc, then the archive.

use crate::session::Session;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const RECORD_PREFIX: &str = "session_";
const RECORD_SUFFIX: &str = ".json";

/// Archive of completed sessions, keyed by session id
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}{}{}", RECORD_PREFIX, session_id, RECORD_SUFFIX))
    }

    /// Write the full session record, creating the directory if needed
    pub fn archive(&self, session: &Session) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create history dir {:?}", self.dir))?;
        let path = self.record_path(&session.session_id.to_string());
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write session record {:?}", path))?;
        log::info!("Archived session {} to {:?}", session.session_id, path);
        Ok(path)
    }

    pub fn load(&self, session_id: &str) -> Result<Option<Session>> {
        let path = self.record_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session record {:?}", path))?;
        let session: Session = serde_json::from_str(&json)
            .with_context(|| format!("Malformed session record {:?}", path))?;
        Ok(Some(session))
    }

    /// Archived session ids, sorted by record name
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().to_string();
            if let Some(id) = name
                .strip_prefix(RECORD_PREFIX)
                .and_then(|rest| rest.strip_suffix(RECORD_SUFFIX))
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Archived sessions ordered by completion time, oldest first
    pub fn recent(&self, limit: usize) -> Result<Vec<Session>> {
        let mut sessions = Vec::new();
        for id in self.list()? {
            match self.load(&id) {
                Ok(Some(session)) => sessions.push(session),
                Ok(None) => {}
                Err(e) => log::warn!("Skipping unreadable session record {}: {:#}", id, e),
            }
        }
        sessions.sort_by_key(|s| s.completed_at.unwrap_or(s.started_at));
        let skip = sessions.len().saturating_sub(limit);
        Ok(sessions.into_iter().skip(skip).collect())
    }
}

/// The single handoff document outside the document root
#[derive(Debug, Clone)]
pub struct HandoffDoc {
    path: PathBuf,
}

impl HandoffDoc {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Current content, empty string if absent
    pub fn read_or_empty(&self) -> std::io::Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Full overwrite
    pub fn write(&self, content: &str) -> std::io::Result<()> {
        std::fs::write(&self.path, content)
    }
}

/// Hex SHA-256 of a document
pub fn checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
