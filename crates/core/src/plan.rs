//! Planner output: either a task plan or a final answer.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Literal prefix marking planner output as terminal.
pub const FINAL_ANSWER_PREFIX: &str = "FINAL ANSWER:";

/// One unit of work dispatched to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Caller-assigned label, echoed back in result messages
    pub id: i64,

    pub description: String,
}

/// An ordered task list. Order is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub plan: Vec<Task>,
}

impl Plan {
    /// Parse planner content as a JSON plan.
    ///
    /// A single surrounding markdown code fence is stripped first.
    pub fn parse(content: &str) -> Result<Self, AgentError> {
        let body = strip_code_fence(content.trim());
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| AgentError::PlanParse(e.to_string()))?;

        if value.get("plan").is_none() {
            return Err(AgentError::PlanParse("missing `plan` key".into()));
        }

        serde_json::from_value(value).map_err(|e| AgentError::PlanParse(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }
}

/// What the planner asked for in one PLANNING step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerOutput {
    FinalAnswer(String),
    Plan(Plan),
}

impl PlannerOutput {
    pub fn parse(content: &str) -> Result<Self, AgentError> {
        match final_answer(content) {
            Some(answer) => Ok(Self::FinalAnswer(answer)),
            None => Plan::parse(content).map(Self::Plan),
        }
    }
}

/// Extract the answer if `content` starts with the final-answer sentinel.
///
/// The match ignores letter case and leading whitespace; the answer is
/// everything after the first colon, trimmed.
pub fn final_answer(content: &str) -> Option<String> {
    let head = content.trim_start().get(..FINAL_ANSWER_PREFIX.len())?;
    if !head.eq_ignore_ascii_case(FINAL_ANSWER_PREFIX) {
        return None;
    }
    content
        .split_once(':')
        .map(|(_, answer)| answer.trim().to_string())
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return s;
    };
    // Drop an info string such as `json` on the opening fence line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}
