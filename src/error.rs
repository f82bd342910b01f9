// Agent Handoff - Tool Errors
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Closed error taxonomy for tool calls. Every failure a handler can produce is
// one of these kinds; the wire shape is built only in to_envelope().

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// Wire-level error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownTool,
    ExecutionError,
    WorkflowViolation,
    InvalidInput,
    MissingHandoffDoc,
    FileNotFound,
    InvalidPath,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnknownTool => "UNKNOWN_TOOL",
            ErrorCode::ExecutionError => "EXECUTION_ERROR",
            ErrorCode::WorkflowViolation => "WORKFLOW_VIOLATION",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::MissingHandoffDoc => "MISSING_HANDOFF_DOC",
            ErrorCode::FileNotFound => "FILE_NOT_FOUND",
            ErrorCode::InvalidPath => "INVALID_PATH",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message plus optional remediation hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), suggestion: None }
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(ErrorPayload),
    #[error("execution error: {0}")]
    Execution(ErrorPayload),
    #[error("workflow violation: {0}")]
    WorkflowViolation(ErrorPayload),
    #[error("invalid input: {0}")]
    InvalidInput(ErrorPayload),
    #[error("missing handoff document: {0}")]
    MissingHandoffDoc(ErrorPayload),
    #[error("file not found: {0}")]
    FileNotFound(ErrorPayload),
    #[error("invalid path: {0}")]
    InvalidPath(ErrorPayload),
}

impl ToolError {
    pub fn unknown_tool(name: &str) -> Self {
        ToolError::UnknownTool(ErrorPayload::new(format!("Unknown tool: {}", name)))
            .with_suggestion("Call tools/list to see the available tools")
    }

    pub fn execution(message: impl Into<String>) -> Self {
        ToolError::Execution(ErrorPayload::new(message))
    }

    pub fn workflow(message: impl Into<String>) -> Self {
        ToolError::WorkflowViolation(ErrorPayload::new(message))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ToolError::InvalidInput(ErrorPayload::new(message))
    }

    pub fn missing_handoff(message: impl Into<String>) -> Self {
        ToolError::MissingHandoffDoc(ErrorPayload::new(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ToolError::FileNotFound(ErrorPayload::new(message))
    }

    pub fn invalid_path(message: impl Into<String>) -> Self {
        ToolError::InvalidPath(ErrorPayload::new(message))
    }

    /// Attach a remediation hint
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.payload_mut().suggestion = Some(suggestion.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ToolError::UnknownTool(_) => ErrorCode::UnknownTool,
            ToolError::Execution(_) => ErrorCode::ExecutionError,
            ToolError::WorkflowViolation(_) => ErrorCode::WorkflowViolation,
            ToolError::InvalidInput(_) => ErrorCode::InvalidInput,
            ToolError::MissingHandoffDoc(_) => ErrorCode::MissingHandoffDoc,
            ToolError::FileNotFound(_) => ErrorCode::FileNotFound,
            ToolError::InvalidPath(_) => ErrorCode::InvalidPath,
        }
    }

    pub fn payload(&self) -> &ErrorPayload {
        match self {
            ToolError::UnknownTool(p)
            | ToolError::Execution(p)
            | ToolError::WorkflowViolation(p)
            | ToolError::InvalidInput(p)
            | ToolError::MissingHandoffDoc(p)
            | ToolError::FileNotFound(p)
            | ToolError::InvalidPath(p) => p,
        }
    }

    fn payload_mut(&mut self) -> &mut ErrorPayload {
        match self {
            ToolError::UnknownTool(p)
            | ToolError::Execution(p)
            | ToolError::WorkflowViolation(p)
            | ToolError::InvalidInput(p)
            | ToolError::MissingHandoffDoc(p)
            | ToolError::FileNotFound(p)
            | ToolError::InvalidPath(p) => p,
        }
    }

    pub fn message(&self) -> &str {
        &self.payload().message
    }

    /// Serialize to the wire shape `{"error": {code, message, suggestion?}}`
    pub fn to_envelope(&self) -> Value {
        let payload = self.payload();
        let mut error = json!({
            "code": self.code(),
            "message": payload.message,
        });
        if let Some(ref suggestion) = payload.suggestion {
            error["suggestion"] = json!(suggestion);
        }
        json!({ "error": error })
    }
}

impl From<std::io::Error> for ToolError {
    fn from(e: std::io::Error) -> Self {
        ToolError::execution(format!("I/O failure: {}", e))
    }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

// ============================================================================
// TESTS
// ============================================================================
