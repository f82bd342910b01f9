// Agent Handoff - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary and tests.

pub mod config;
pub mod error;
pub mod paths;

// ============================================================================
// WORKFLOW - session state machine and its archive
// ============================================================================

pub mod session;
pub mod storage;
pub mod workflow;

// ============================================================================
// DOCUMENTS - sandboxed docs/ tree
// ============================================================================

pub mod docs;
pub mod inspect;
pub mod sandbox;
pub mod validate;

// ============================================================================
// SERVER
// ============================================================================

pub mod mcp;
pub mod scaffold;
pub mod tools;
