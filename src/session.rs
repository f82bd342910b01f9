// Agent Handoff - Session State
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// In-memory session record. Persisted only when archived by end_job.
// Tracks: goal, plan, step cursor, progress reports, issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Workflow position of a session. "Idle" is the absence of a current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[serde(rename = "work_started")]
    Started,
    PlanSubmitted,
    InProgress,
    Archived,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Started => "work_started",
            WorkflowState::PlanSubmitted => "plan_submitted",
            WorkflowState::InProgress => "in_progress",
            WorkflowState::Archived => "archived",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub timestamp: DateTime<Utc>,
    pub work: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueEntry {
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub attempted_solutions: String,
}

/// One tracked work interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub state: WorkflowState,
    pub user_goal: String,
    pub started_at: DateTime<Utc>,
    pub plan_steps: Vec<String>,
    /// Always a prefix of plan_steps
    pub completed_steps: Vec<String>,
    /// Never exceeds plan_steps.len()
    pub current_step_index: usize,
    pub progress: Vec<ProgressEntry>,
    pub issues: Vec<IssueEntry>,
    pub summary: Option<String>,
    /// Archive records name the handoff body `agentreadme_content`
    #[serde(rename = "agentreadme_content", alias = "handoff_doc")]
    pub handoff_doc: Option<String>,
    pub handoff_sha256: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_goal: &str) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: WorkflowState::Started,
            user_goal: user_goal.to_string(),
            started_at: Utc::now(),
            plan_steps: Vec::new(),
            completed_steps: Vec::new(),
            current_step_index: 0,
            progress: Vec::new(),
            issues: Vec::new(),
            summary: None,
            handoff_doc: None,
            handoff_sha256: None,
            completed_at: None,
        }
    }

    /// Store the plan and reset the step cursor
    pub fn submit_plan(&mut self, steps: Vec<String>) {
        self.plan_steps = steps;
        self.completed_steps.clear();
        self.current_step_index = 0;
        self.state = WorkflowState::PlanSubmitted;
    }

    /// Record a progress report. Advances at most one planned step and
    /// returns the step it completed, if any.
    pub fn record_progress(&mut self, work: &str) -> Option<String> {
        self.progress.push(ProgressEntry {
            timestamp: Utc::now(),
            work: work.to_string(),
        });
        self.state = WorkflowState::InProgress;

        let step = self.plan_steps.get(self.current_step_index)?.clone();
        self.completed_steps.push(step.clone());
        self.current_step_index += 1;
        Some(step)
    }

    pub fn record_issue(&mut self, description: &str, attempted_solutions: &str) {
        self.issues.push(IssueEntry {
            timestamp: Utc::now(),
            description: description.to_string(),
            attempted_solutions: attempted_solutions.to_string(),
        });
    }

    /// Next step not yet reported, None once the plan is exhausted
    pub fn pending_step(&self) -> Option<&str> {
        self.plan_steps.get(self.current_step_index).map(|s| s.as_str())
    }

    pub fn remaining_steps(&self) -> usize {
        self.plan_steps.len() - self.completed_steps.len()
    }

    pub fn is_plan_complete(&self) -> bool {
        self.completed_steps.len() == self.plan_steps.len()
    }

    /// Fill the completion fields and move to the terminal state
    pub fn mark_archived(&mut self, summary: &str, handoff_doc: &str, handoff_sha256: &str) {
        self.summary = Some(summary.to_string());
        self.handoff_doc = Some(handoff_doc.to_string());
        self.handoff_sha256 = Some(handoff_sha256.to_string());
        self.completed_at = Some(Utc::now());
        self.state = WorkflowState::Archived;
    }

    /// Status summary string
    pub fn status_summary(&self) -> String {
        format!(
            "Session: {} | State: {} | Steps: {}/{} | Progress: {} | Issues: {}",
            self.session_id,
            self.state,
            self.completed_steps.len(),
            self.plan_steps.len(),
            self.progress.len(),
            self.issues.len(),
        )
    }
}

/// Holds at most one current session
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `session` current; returns the session it displaced, unarchived
    pub fn begin(&mut self, session: Session) -> Option<Session> {
        self.current.replace(session)
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Session> {
        self.current.as_mut()
    }

    /// Clear the current pointer
    pub fn clear(&mut self) -> Option<Session> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned(steps: &[&str]) -> Session {
        let mut session = Session::new("goal");
        session.submit_plan(steps.iter().map(|s| s.to_string()).collect());
        session
    }

    #[test]
    fn new_session_is_started() {
        let session = Session::new("write docs");
        assert_eq!(session.state, WorkflowState::Started);
        assert_eq!(session.user_goal, "write docs");
        assert!(session.plan_steps.is_empty());
        assert!(session.completed_at.is_none());
    }

    #[test]
    fn progress_advances_one_step_per_report() {
        let mut session = planned(&["a", "b"]);
        assert_eq!(session.record_progress("did a").as_deref(), Some("a"));
        assert_eq!(session.pending_step(), Some("b"));
        assert_eq!(session.record_progress("did b").as_deref(), Some("b"));
        assert_eq!(session.pending_step(), None);
        assert!(session.is_plan_complete());
        assert_eq!(session.state, WorkflowState::InProgress);
    }

    #[test]
    fn extra_progress_does_not_overrun_plan() {
        let mut session = planned(&["only"]);
        session.record_progress("one");
        assert_eq!(session.record_progress("two"), None);
        assert_eq!(session.record_progress("three"), None);
        assert_eq!(session.current_step_index, 1);
        assert_eq!(session.completed_steps, vec!["only".to_string()]);
        assert_eq!(session.progress.len(), 3);
    }

    #[test]
    fn completed_steps_stay_a_prefix() {
        let mut session = planned(&["a", "b", "c"]);
        session.record_progress("x");
        session.record_progress("y");
        assert_eq!(session.completed_steps[..], session.plan_steps[..2]);
        assert_eq!(session.remaining_steps(), 1);
    }

    #[test]
    fn issues_do_not_touch_state() {
        let mut session = planned(&["a"]);
        session.record_issue("flaky build", "retried");
        assert_eq!(session.state, WorkflowState::PlanSubmitted);
        assert_eq!(session.issues[0].attempted_solutions, "retried");
    }

    #[test]
    fn state_serializes_snake_case() {
        assert_eq!(serde_json::to_value(WorkflowState::Started).unwrap(), "work_started");
        assert_eq!(serde_json::to_value(WorkflowState::InProgress).unwrap(), "in_progress");
    }

    #[test]
    fn archived_record_names_handoff_body() {
        let mut session = planned(&["a"]);
        session.mark_archived("done", "# Handoff", "abc");
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["agentreadme_content"], "# Handoff");
        assert!(value.get("handoff_doc").is_none());

        let back: Session = serde_json::from_value(value).unwrap();
        assert_eq!(back.handoff_doc.as_deref(), Some("# Handoff"));

        let mut older = serde_json::to_value(&session).unwrap();
        let body = older.as_object_mut().unwrap().remove("agentreadme_content").unwrap();
        older["handoff_doc"] = body;
        let back: Session = serde_json::from_value(older).unwrap();
        assert_eq!(back.handoff_doc.as_deref(), Some("# Handoff"));
    }

    #[test]
    fn store_holds_single_current() {
        let mut store = SessionStore::new();
        assert!(store.current().is_none());
        let first = Session::new("one");
        let first_id = first.session_id;
        assert!(store.begin(first).is_none());
        let displaced = store.begin(Session::new("two")).unwrap();
        assert_eq!(displaced.session_id, first_id);
        assert_eq!(store.current().unwrap().user_goal, "two");
        assert!(store.clear().is_some());
        assert!(store.current().is_none());
    }
}
