// Agent Handoff - Workflow State Machine
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// start_work -> plan_setup -> proceed (once per planned step) -> end_job
// report_issue is legal at any point while a session is current.
// Every precondition failure is a reported ToolError, never a panic.

use crate::error::{ToolError, ToolResult};
use crate::session::{Session, SessionStore, WorkflowState};
use crate::storage::{self, HandoffDoc, HistoryStore};
use serde_json::{json, Value};

const RECOMMENDED_PLAN: &[&str] = &[
    "Step 1: Confirm environment and check dependencies",
    "Step 2: Read relevant docs/ files and understand project structure",
    "Step 3: Break down the task into sub-tasks",
    "Step 4: Implement the feature or fix with tests",
    "Step 5: Debug and confirm functionality (call report_issue for problems)",
    "Step 6: Clean up temporary files",
    "Step 7: Organize documentation with the document tools",
    "Step 8: Update the handoff document",
];

/// Owns the current-session pointer and the durable stores it archives into
pub struct WorkflowEngine {
    sessions: SessionStore,
    history: HistoryStore,
    handoff: HandoffDoc,
    min_handoff_chars: usize,
}

impl WorkflowEngine {
    pub fn new(history: HistoryStore, handoff: HandoffDoc, min_handoff_chars: usize) -> Self {
        Self {
            sessions: SessionStore::new(),
            history,
            handoff,
            min_handoff_chars,
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.sessions.current()
    }

    pub fn handoff(&self) -> &HandoffDoc {
        &self.handoff
    }

    fn no_session() -> ToolError {
        ToolError::workflow("No active work session. Call start_work first.")
            .with_suggestion("Call start_work with your goal to open a session")
    }

    fn current_mut(&mut self) -> ToolResult<&mut Session> {
        self.sessions.current_mut().ok_or_else(Self::no_session)
    }

    /// Open a new session. Always legal; a previous unarchived session is dropped.
    pub fn start(&mut self, goal: &str) -> ToolResult<Value> {
        let handoff_content = self.handoff.read_or_empty()?;

        let session = Session::new(goal);
        let session_id = session.session_id;
        if let Some(abandoned) = self.sessions.begin(session) {
            log::warn!(
                "Abandoning unarchived session {} ({})",
                abandoned.session_id,
                abandoned.state
            );
        }
        log::info!("Session {} started", session_id);

        Ok(json!({
            "session_id": session_id,
            "status": "work_started",
            "user_goal": goal,
            "handoff_content": handoff_content,
            "next_step": "plan_setup",
            "recommended_plan_steps": RECOMMENDED_PLAN,
            "instruction": "Work session started. You are now in a tracked workflow.\n\n\
                NEXT: call 'plan_setup' with your development steps as a list.\n\n\
                The workflow is: start_work -> plan_setup -> proceed (once per step) -> end_job.\n\
                Do not begin code changes until the plan is submitted.",
        }))
    }

    pub fn submit_plan(&mut self, steps: Vec<String>) -> ToolResult<Value> {
        let session = self.current_mut()?;
        if session.state != WorkflowState::Started {
            return Err(ToolError::workflow(format!(
                "Invalid state for plan_setup. Current state: {}",
                session.state
            ))
            .with_suggestion("A plan can only be submitted once, right after start_work"));
        }
        if steps.is_empty() {
            return Err(ToolError::invalid_input("steps must be a non-empty list of strings")
                .with_suggestion("Provide your plan as a list: ['Step 1: ...', 'Step 2: ...']"));
        }

        let total = steps.len();
        let first = steps[0].clone();
        session.submit_plan(steps);

        Ok(json!({
            "status": "plan_accepted",
            "session_id": session.session_id,
            "total_steps": total,
            "plan_steps": session.plan_steps,
            "current_step": format!("Step 1/{}: {}", total, first),
            "instruction": format!(
                "Plan recorded with {} steps.\n\nCurrent objective: {}\n\n\
                 Call 'proceed' after finishing each step.",
                total, first
            ),
        }))
    }

    pub fn report_progress(&mut self, work: &str) -> ToolResult<Value> {
        let session = self.current_mut()?;
        if !matches!(session.state, WorkflowState::PlanSubmitted | WorkflowState::InProgress) {
            return Err(ToolError::workflow(format!(
                "Invalid state for proceed. Current state: {}",
                session.state
            ))
            .with_suggestion("Submit a plan with plan_setup first"));
        }

        let just_completed = session.record_progress(work);
        let done = session.completed_steps.len();
        let total = session.plan_steps.len();
        let next_step = session.pending_step().map(|s| s.to_string());

        let mut instruction = format!("Progress recorded ({}/{} steps completed).\n\n", done, total);
        if let Some(ref step) = just_completed {
            instruction.push_str(&format!("Just completed: {}\n\n", step));
        }
        match next_step {
            Some(ref next) => {
                instruction.push_str(&format!("Next objective: {}\n\nCall 'proceed' when it is done.", next));
            }
            None => {
                instruction.push_str(
                    "All planned steps completed. You can now call end_job.\n\n\
                     end_job requires the complete updated handoff document.",
                );
            }
        }

        Ok(json!({
            "status": "progress_recorded",
            "session_id": session.session_id,
            "completed_work": work,
            "steps_completed": done,
            "total_steps": total,
            "completed_steps": session.completed_steps,
            "just_completed": just_completed,
            "next_step": next_step,
            "instruction": instruction,
        }))
    }

    /// Advisory; never changes state
    pub fn report_issue(&mut self, description: &str, attempted: &str) -> ToolResult<Value> {
        let session = self.current_mut()?;
        session.record_issue(description, attempted);
        log::info!("Session {} issue: {}", session.session_id, description);

        Ok(json!({
            "status": "issue_recorded",
            "session_id": session.session_id,
            "issue_description": description,
            "total_issues": session.issues.len(),
            "instruction": "Issue logged. Continue debugging, or call proceed once the step is done.",
        }))
    }

    /// Archive the current session. Preconditions checked in order; first failure wins.
    pub fn end(&mut self, summary: &str, handoff_doc: &str) -> ToolResult<Value> {
        let min_chars = self.min_handoff_chars;
        let session = self.sessions.current().ok_or_else(Self::no_session)?;

        if session.state != WorkflowState::InProgress {
            return Err(ToolError::workflow(format!(
                "Cannot end job without completing work. Current state: {}",
                session.state
            ))
            .with_suggestion("Call 'proceed' to report completed work before calling 'end_job'"));
        }
        if session.progress.is_empty() {
            return Err(ToolError::workflow("Cannot end job without any completed work reported.")
                .with_suggestion("Call 'proceed' to report your completed work first"));
        }
        if !session.is_plan_complete() {
            return Err(ToolError::workflow(format!(
                "Cannot end job with incomplete plan. Completed {}/{} steps.",
                session.completed_steps.len(),
                session.plan_steps.len()
            ))
            .with_suggestion(format!(
                "{} steps remain. Complete them with 'proceed'.",
                session.remaining_steps()
            )));
        }
        if handoff_doc.trim().chars().count() < min_chars {
            return Err(ToolError::missing_handoff(format!(
                "You must provide the complete handoff document (at least {} characters).",
                min_chars
            ))
            .with_suggestion(
                "Read the existing agentreadme.md with read_file, update it, \
                 and pass the full content as handoff_doc",
            ));
        }

        // Commit on a copy; the current pointer is cleared only once both writes land
        let mut archived = session.clone();
        let sha = storage::checksum(handoff_doc);
        archived.mark_archived(summary, handoff_doc, &sha);

        self.handoff.write(handoff_doc)?;
        let history_path = self
            .history
            .archive(&archived)
            .map_err(|e| ToolError::execution(format!("Failed to archive session: {:#}", e)))?;
        self.sessions.clear();

        let done = archived.completed_steps.len();
        let total = archived.plan_steps.len();
        let handoff_path = self.handoff.path().display().to_string();

        Ok(json!({
            "status": "job_completed",
            "session_id": archived.session_id,
            "summary": summary,
            "steps_completed": done,
            "total_steps": total,
            "progress_entries": archived.progress.len(),
            "issues_reported": archived.issues.len(),
            "handoff_doc_path": handoff_path,
            "handoff_sha256": sha,
            "history_path": history_path.display().to_string(),
            "instruction": format!(
                "Job completed. {}/{} planned steps done.\nHandoff document saved to {}\nSession history saved to {}",
                done, total, handoff_path, history_path.display()
            ),
        }))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::{tempdir, TempDir};

    const DOC: &str = "# Agent README\n\nEverything the next agent needs to pick this up cleanly.";

    fn engine() -> (TempDir, WorkflowEngine) {
        let dir = tempdir().unwrap();
        let engine = WorkflowEngine::new(
            HistoryStore::new(&dir.path().join(".agent-handoff/history")),
            HandoffDoc::new(&dir.path().join("agentreadme.md")),
            50,
        );
        (dir, engine)
    }

    fn steps(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn start_returns_empty_handoff_on_fresh_project() {
        let (_dir, mut engine) = engine();
        let res = engine.start("X").unwrap();
        assert_eq!(res["status"], "work_started");
        assert_eq!(res["handoff_content"], "");
        assert!(res["session_id"].as_str().is_some());
    }

    #[test]
    fn start_returns_existing_handoff() {
        let (dir, mut engine) = engine();
        std::fs::write(dir.path().join("agentreadme.md"), "# Prior notes").unwrap();
        let res = engine.start("X").unwrap();
        assert_eq!(res["handoff_content"], "# Prior notes");
    }

    #[test]
    fn plan_without_session_is_violation() {
        let (_dir, mut engine) = engine();
        let err = engine.submit_plan(steps(&["a", "b"])).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WorkflowViolation);
    }

    #[test]
    fn plan_twice_is_violation() {
        let (_dir, mut engine) = engine();
        engine.start("X").unwrap();
        let res = engine.submit_plan(steps(&["a", "b"])).unwrap();
        assert_eq!(res["status"], "plan_accepted");
        assert_eq!(res["total_steps"], 2);
        assert_eq!(res["current_step"], "Step 1/2: a");

        let err = engine.submit_plan(steps(&["c"])).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WorkflowViolation);
    }

    #[test]
    fn empty_plan_is_invalid_input() {
        let (_dir, mut engine) = engine();
        engine.start("X").unwrap();
        let err = engine.submit_plan(Vec::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        // Still in STARTED, a real plan is accepted afterwards
        assert!(engine.submit_plan(steps(&["a"])).is_ok());
    }

    #[test]
    fn proceed_before_plan_is_violation() {
        let (_dir, mut engine) = engine();
        engine.start("X").unwrap();
        let err = engine.report_progress("early").unwrap_err();
        assert_eq!(err.code(), ErrorCode::WorkflowViolation);
    }

    #[test]
    fn proceed_walks_the_plan() {
        let (_dir, mut engine) = engine();
        engine.start("X").unwrap();
        engine.submit_plan(steps(&["a", "b", "c"])).unwrap();

        let r1 = engine.report_progress("did a").unwrap();
        assert_eq!(r1["steps_completed"], 1);
        assert_eq!(r1["just_completed"], "a");
        assert_eq!(r1["next_step"], "b");

        engine.report_progress("did b").unwrap();
        let r3 = engine.report_progress("did c").unwrap();
        assert_eq!(r3["steps_completed"], 3);
        assert!(r3["next_step"].is_null());
        assert!(r3["instruction"].as_str().unwrap().contains("end_job"));

        // Beyond the plan: recorded, cursor stays put
        let r4 = engine.report_progress("polish").unwrap();
        assert_eq!(r4["steps_completed"], 3);
        assert!(r4["just_completed"].is_null());
        assert_eq!(engine.current().unwrap().progress.len(), 4);
    }

    #[test]
    fn issue_requires_session_but_not_state() {
        let (_dir, mut engine) = engine();
        let err = engine.report_issue("broken", "").unwrap_err();
        assert_eq!(err.code(), ErrorCode::WorkflowViolation);

        engine.start("X").unwrap();
        let res = engine.report_issue("broken", "restarted").unwrap();
        assert_eq!(res["total_issues"], 1);
        assert_eq!(engine.current().unwrap().state, WorkflowState::Started);
    }

    #[test]
    fn end_precondition_order() {
        let (_dir, mut engine) = engine();
        assert_eq!(engine.end("s", DOC).unwrap_err().code(), ErrorCode::WorkflowViolation);

        engine.start("X").unwrap();
        let err = engine.end("s", DOC).unwrap_err();
        assert!(err.message().contains("without completing work"));

        engine.submit_plan(steps(&["a", "b"])).unwrap();
        engine.report_progress("a").unwrap();
        let err = engine.end("s", DOC).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WorkflowViolation);
        assert!(err.message().contains("incomplete plan"));

        engine.report_progress("b").unwrap();
        let err = engine.end("s", "# README").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingHandoffDoc);
        let err = engine.end("s", &format!("{}\n", " ".repeat(80))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingHandoffDoc);

        // Failed attempts leave the session current
        assert!(engine.current().is_some());
    }

    #[test]
    fn end_archives_and_clears() {
        let (dir, mut engine) = engine();
        engine.start("X").unwrap();
        engine.submit_plan(steps(&["a", "b"])).unwrap();
        engine.report_progress("a").unwrap();
        engine.report_issue("hiccup", "").unwrap();
        engine.report_progress("b").unwrap();

        let res = engine.end("all done", DOC).unwrap();
        assert_eq!(res["status"], "job_completed");
        assert_eq!(res["steps_completed"], 2);
        assert_eq!(res["issues_reported"], 1);
        assert_eq!(res["handoff_sha256"], storage::checksum(DOC));
        assert!(engine.current().is_none());

        assert_eq!(std::fs::read_to_string(dir.path().join("agentreadme.md")).unwrap(), DOC);
        let record: Session = serde_json::from_str(
            &std::fs::read_to_string(res["history_path"].as_str().unwrap()).unwrap(),
        )
        .unwrap();
        assert_eq!(record.state, WorkflowState::Archived);
        assert_eq!(record.summary.as_deref(), Some("all done"));
        assert!(record.completed_at.is_some());

        // Single-flight: nothing to end any more
        assert_eq!(engine.end("again", DOC).unwrap_err().code(), ErrorCode::WorkflowViolation);
    }

    #[test]
    fn restart_abandons_previous_session() {
        let (dir, mut engine) = engine();
        let first = engine.start("one").unwrap();
        engine.submit_plan(steps(&["a"])).unwrap();
        let second = engine.start("two").unwrap();
        assert_ne!(first["session_id"], second["session_id"]);
        assert_eq!(engine.current().unwrap().state, WorkflowState::Started);
        assert!(!dir.path().join(".agent-handoff/history").exists());
    }
}
