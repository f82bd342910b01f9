// Agent Handoff - MCP Server (JSON-RPC 2.0 over stdio)
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// ALL tool calls route through HandoffServer.
// Exposes: start_work, plan_setup, proceed, report_issue, end_job,
//          read_file, write_file, append_file, list_files, search_files
// Every call yields exactly one envelope: the handler's result object,
// or {"error": {code, message, suggestion?}}.

use crate::config::HandoffConfig;
use crate::docs::DocumentStore;
use crate::error::ToolResult;
use crate::paths::ProjectPaths;
use crate::sandbox::{AliasTable, PathSandbox};
use crate::storage::{HandoffDoc, HistoryStore};
use crate::tools::{self, ToolCall};
use crate::workflow::WorkflowEngine;
use anyhow::{Context, Result};
use chrono::Local;
use serde_json::{json, Value};
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "agent-handoff";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Truncate to `max` characters, marking the cut
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}…", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

fn len_arg(args: &Value, key: &str) -> usize {
    str_arg(args, key).map(|s| s.chars().count()).unwrap_or(0)
}

/// Summarize tool params for logging (document bodies by length only)
fn param_summary(name: &str, args: &Value) -> String {
    match name {
        "start_work" => format!("goal={}", clip(str_arg(args, "goal").or(str_arg(args, "user_goal")).unwrap_or("?"), 150)),
        "plan_setup" => {
            let steps = args.get("steps").or_else(|| args.get("plan_steps"));
            match steps.and_then(|v| v.as_array()) {
                Some(list) => format!("steps={}", list.len()),
                None => "steps=?".to_string(),
            }
        }
        "proceed" => format!("work={}", clip(str_arg(args, "completed_work").unwrap_or("?"), 150)),
        "report_issue" => format!("issue={}", clip(str_arg(args, "issue_description").unwrap_or("?"), 150)),
        "end_job" => format!(
            "summary_len={} handoff_len={}",
            len_arg(args, "summary"),
            len_arg(args, "handoff_doc").max(len_arg(args, "agentreadme_content"))
        ),
        "write_file" | "append_file" => format!(
            "path={} content_len={}",
            str_arg(args, "path").unwrap_or("?"),
            len_arg(args, "content")
        ),
        "search_files" => format!(
            "query={} path={}",
            clip(str_arg(args, "query").unwrap_or("?"), 100),
            str_arg(args, "path").unwrap_or("")
        ),
        "read_file" | "list_files" => format!("path={}", str_arg(args, "path").unwrap_or("")),
        _ => clip(&args.to_string(), 300),
    }
}

/// Build a JSON-RPC response
fn rpc_result(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

/// Build a JSON-RPC error response
fn rpc_error(id: &Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// The tool dispatcher. Owns the workflow engine and the document store;
/// nothing here is global.
pub struct HandoffServer {
    workflow: WorkflowEngine,
    docs: DocumentStore,
    call_log: Option<PathBuf>,
}

impl HandoffServer {
    /// Build from a resolved project layout. Creates the directories the server writes into.
    pub fn new(paths: &ProjectPaths, config: &HandoffConfig) -> Result<Self> {
        paths.ensure_dirs()?;
        let sandbox = PathSandbox::new(&paths.docs_dir)
            .with_context(|| format!("Cannot open document root {:?}", paths.docs_dir))?;
        let aliases = AliasTable::for_handoff(&config.handoff_file, &paths.handoff_path);

        let workflow = WorkflowEngine::new(
            HistoryStore::new(&paths.history_dir),
            HandoffDoc::new(&paths.handoff_path),
            config.min_handoff_chars,
        );
        let docs = DocumentStore::new(sandbox, aliases, config.clone());

        Ok(Self {
            workflow,
            docs,
            call_log: Some(paths.call_log.clone()),
        })
    }

    /// Disable the persistent call log
    pub fn without_call_log(mut self) -> Self {
        self.call_log = None;
        self
    }

    pub fn workflow(&self) -> &WorkflowEngine {
        &self.workflow
    }

    /// Persistent call log → .agent-handoff/calls.log
    fn cmd_log(&self, msg: &str) {
        let Some(ref log_path) = self.call_log else {
            return;
        };
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(log_path) {
            let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(f, "[{}] {}", ts, msg);
        }
    }

    /// Parse, then route to the owning handler
    fn dispatch(&mut self, name: &str, args: &Value) -> ToolResult<Value> {
        match ToolCall::parse(name, args)? {
            // ====== WORKFLOW ======
            ToolCall::StartWork(a) => self.workflow.start(&a.goal),
            ToolCall::PlanSetup(a) => self.workflow.submit_plan(a.steps),
            ToolCall::Proceed(a) => self.workflow.report_progress(&a.completed_work),
            ToolCall::ReportIssue(a) => {
                self.workflow.report_issue(&a.issue_description, &a.attempted_solutions)
            }
            ToolCall::EndJob(a) => self.workflow.end(&a.summary, &a.handoff_doc),

            // ====== DOCUMENTS ======
            ToolCall::ReadFile(a) => self.docs.read(&a.path),
            ToolCall::WriteFile(a) => self.docs.write(&a.path, &a.content),
            ToolCall::AppendFile(a) => self.docs.append(&a.path, &a.content),
            ToolCall::ListFiles(a) => self.docs.list(&a.path),
            ToolCall::SearchFiles(a) => self.docs.search(&a.query, &a.path),
        }
    }

    fn call(&mut self, name: &str, args: &Value) -> ToolResult<Value> {
        self.cmd_log(&format!("CALL {} | {}", name, param_summary(name, args)));
        let result = self.dispatch(name, args);
        if let Err(ref e) = result {
            self.cmd_log(&format!("FAIL {} | {}", name, e.code()));
            log::debug!("{} failed: {}", name, e);
        }
        result
    }

    /// One tool invocation → one envelope (result object or error object)
    pub fn call_tool(&mut self, name: &str, args: &Value) -> Value {
        match self.call(name, args) {
            Ok(value) => value,
            Err(e) => e.to_envelope(),
        }
    }

    /// Handle one JSON-RPC message. None for notifications.
    pub fn handle_message(&mut self, msg: &Value) -> Option<Value> {
        let method = msg["method"].as_str().unwrap_or("");
        let id = &msg["id"];
        let params = &msg["params"];

        log::debug!("Received: {}", method);

        match method {
            "initialize" => Some(rpc_result(id, json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION,
                }
            }))),

            "notifications/initialized" => None,

            "tools/list" => Some(rpc_result(id, json!({ "tools": tools::tool_definitions() }))),

            "tools/call" => {
                let name = params["name"].as_str().unwrap_or("");
                let args = params.get("arguments").cloned().unwrap_or(Value::Null);

                let (body, is_error) = match self.call(name, &args) {
                    Ok(value) => (value, false),
                    Err(e) => (e.to_envelope(), true),
                };
                let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());

                Some(rpc_result(id, json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": is_error,
                })))
            }

            "ping" => Some(rpc_result(id, json!({}))),

            _ => {
                if id.is_null() {
                    None
                } else {
                    Some(rpc_error(id, -32601, &format!("Unknown method: {}", method)))
                }
            }
        }
    }

    /// Line-delimited JSON-RPC loop. Returns at end of input.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    log::warn!("stdin read error: {}", e);
                    continue;
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let msg: Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("JSON parse error: {}", e);
                    continue;
                }
            };

            if let Some(response) = self.handle_message(&msg) {
                let text = serde_json::to_string(&response)?;
                writeln!(output, "{}", text).context("Failed to write response")?;
                output.flush().context("Failed to flush response")?;
            }
        }
        Ok(())
    }

    /// Serve on the process stdin/stdout
    pub fn run(&mut self) -> Result<()> {
        log::info!("Starting {} v{}", SERVER_NAME, SERVER_VERSION);
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())?;
        log::info!("Input closed, shutting down");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
