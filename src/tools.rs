// Agent Handoff - Tool Catalog
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// The fixed set of tools advertised through tools/list, and the typed
// argument records each call is parsed into before a handler runs.
// A call whose arguments do not fit its record is INVALID_INPUT.

use crate::error::{ToolError, ToolResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

pub const TOOL_NAMES: &[&str] = &[
    "start_work",
    "plan_setup",
    "proceed",
    "report_issue",
    "end_job",
    "read_file",
    "write_file",
    "append_file",
    "list_files",
    "search_files",
];

/// MCP tool definition helper
fn tool_def(name: &str, description: &str, properties: Value, required: Vec<&str>) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": required,
        }
    })
}

/// Return all tool definitions
pub fn tool_definitions() -> Vec<Value> {
    vec![
        // ====== WORKFLOW TOOLS ======
        tool_def(
            "start_work",
            "Start a tracked work session. Returns the existing handoff document as onboarding context. \
             Call this first, before anything else.",
            json!({
                "goal": {"type": "string", "description": "What the user asked for, in their words"}
            }),
            vec!["goal"],
        ),
        tool_def(
            "plan_setup",
            "Submit the development plan for the current session. Only legal right after start_work.",
            json!({
                "steps": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Ordered plan steps, e.g. ['Step 1: ...', 'Step 2: ...']"
                }
            }),
            vec!["steps"],
        ),
        tool_def(
            "proceed",
            "Report that the current plan step is done. Advances exactly one step.",
            json!({
                "completed_work": {"type": "string", "description": "What was accomplished in this step"}
            }),
            vec!["completed_work"],
        ),
        tool_def(
            "report_issue",
            "Record a problem hit during the session. Advisory; does not change workflow state.",
            json!({
                "issue_description": {"type": "string", "description": "The problem encountered"},
                "attempted_solutions": {"type": "string", "description": "What has been tried so far (optional)", "default": ""}
            }),
            vec!["issue_description"],
        ),
        tool_def(
            "end_job",
            "Archive the session. Requires every planned step completed and the full updated handoff document.",
            json!({
                "summary": {"type": "string", "description": "Summary of the work done"},
                "handoff_doc": {"type": "string", "description": "Complete content of the updated handoff document"}
            }),
            vec!["summary", "handoff_doc"],
        ),

        // ====== DOCUMENT TOOLS ======
        tool_def(
            "read_file",
            "Read a document under docs/. 'agentreadme.md' reads the handoff document.",
            json!({
                "path": {"type": "string", "description": "Path relative to docs/"}
            }),
            vec!["path"],
        ),
        tool_def(
            "write_file",
            "Create or overwrite a document under docs/. Parent directories are created. \
             Returns advisory warnings for non-documentation files.",
            json!({
                "path": {"type": "string", "description": "Path relative to docs/"},
                "content": {"type": "string", "description": "Full file content"}
            }),
            vec!["path", "content"],
        ),
        tool_def(
            "append_file",
            "Append to an existing document under docs/. The file must already exist.",
            json!({
                "path": {"type": "string", "description": "Path relative to docs/"},
                "content": {"type": "string", "description": "Content to append (joined with a newline)"}
            }),
            vec!["path", "content"],
        ),
        tool_def(
            "list_files",
            "List files and subdirectories of a directory under docs/.",
            json!({
                "path": {"type": "string", "description": "Directory relative to docs/ (default: docs root)", "default": ""}
            }),
            vec![],
        ),
        tool_def(
            "search_files",
            "Case-insensitive text search across documentation files under docs/.",
            json!({
                "query": {"type": "string", "description": "Text to search for"},
                "path": {"type": "string", "description": "File or directory relative to docs/ (default: docs root)", "default": ""}
            }),
            vec!["query"],
        ),
    ]
}

// ============================================================================
// TYPED ARGUMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartWorkArgs {
    #[serde(alias = "user_goal")]
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanSetupArgs {
    #[serde(alias = "plan_steps")]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProceedArgs {
    pub completed_work: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportIssueArgs {
    pub issue_description: String,
    #[serde(default)]
    pub attempted_solutions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndJobArgs {
    pub summary: String,
    #[serde(alias = "agentreadme_content")]
    pub handoff_doc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteArgs {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListArgs {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub path: String,
}

/// One validated tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    StartWork(StartWorkArgs),
    PlanSetup(PlanSetupArgs),
    Proceed(ProceedArgs),
    ReportIssue(ReportIssueArgs),
    EndJob(EndJobArgs),
    ReadFile(PathArgs),
    WriteFile(WriteArgs),
    AppendFile(WriteArgs),
    ListFiles(ListArgs),
    SearchFiles(SearchArgs),
}

fn args<T: DeserializeOwned>(tool: &str, raw: &Value) -> ToolResult<T> {
    serde_json::from_value(raw.clone()).map_err(|e| {
        ToolError::invalid_input(format!("Invalid arguments for {}: {}", tool, e))
            .with_suggestion("Check the tool's inputSchema from tools/list")
    })
}

impl ToolCall {
    /// Unknown name -> UNKNOWN_TOOL; wrong argument shape -> INVALID_INPUT.
    /// Missing (null) arguments are treated as an empty object.
    pub fn parse(name: &str, raw: &Value) -> ToolResult<ToolCall> {
        let empty = json!({});
        let raw = if raw.is_null() { &empty } else { raw };

        let call = match name {
            "start_work" => ToolCall::StartWork(args(name, raw)?),
            "plan_setup" => ToolCall::PlanSetup(args(name, raw)?),
            "proceed" => ToolCall::Proceed(args(name, raw)?),
            "report_issue" => ToolCall::ReportIssue(args(name, raw)?),
            "end_job" => ToolCall::EndJob(args(name, raw)?),
            "read_file" => ToolCall::ReadFile(args(name, raw)?),
            "write_file" => ToolCall::WriteFile(args(name, raw)?),
            "append_file" => ToolCall::AppendFile(args(name, raw)?),
            "list_files" => ToolCall::ListFiles(args(name, raw)?),
            "search_files" => ToolCall::SearchFiles(args(name, raw)?),
            _ => return Err(ToolError::unknown_tool(name)),
        };
        Ok(call)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::StartWork(_) => "start_work",
            ToolCall::PlanSetup(_) => "plan_setup",
            ToolCall::Proceed(_) => "proceed",
            ToolCall::ReportIssue(_) => "report_issue",
            ToolCall::EndJob(_) => "end_job",
            ToolCall::ReadFile(_) => "read_file",
            ToolCall::WriteFile(_) => "write_file",
            ToolCall::AppendFile(_) => "append_file",
            ToolCall::ListFiles(_) => "list_files",
            ToolCall::SearchFiles(_) => "search_files",
        }
    }
}
