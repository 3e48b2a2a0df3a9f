//! The planner cycle: plan, dispatch, repeat until a final answer.
//!
//! ```text
//!   PLANNING ──plan──▶ DISPATCHING ──results + nudge──▶ PLANNING
//!      │
//!      └──FINAL ANSWER:──▶ DONE
//! ```
//!
//! Each PLANNING step is one backend call with no tool schema. Tasks in a
//! plan run strictly in order, each through one executor cycle, sharing a
//! fresh executor transcript per plan.

use std::sync::Arc;

use chrono::Utc;
use tandem_core::error::AgentError;
use tandem_core::event::{DomainEvent, EventBus};
use tandem_core::memory::MemoryRecord;
use tandem_core::message::{ChatMessage, Session};
use tandem_core::plan::{Plan, PlannerOutput};
use tandem_core::tool::ToolRegistry;
use tandem_providers::ChatBackend;
use tracing::{debug, info, warn};

use crate::executor::Executor;
use crate::prompts;

pub const DEFAULT_MAX_CYCLES: u32 = 5;

enum PlannerState {
    Planning,
    Dispatching(Plan),
    Done(String),
}

pub struct Planner {
    backend: ChatBackend,
    executor: Executor,
    max_cycles: u32,
    event_bus: Arc<EventBus>,
}

impl Planner {
    pub fn new(backend: ChatBackend, executor: Executor, event_bus: Arc<EventBus>) -> Self {
        Self {
            backend,
            executor,
            max_cycles: DEFAULT_MAX_CYCLES,
            event_bus,
        }
    }

    pub fn with_max_cycles(mut self, max: u32) -> Self {
        self.max_cycles = max;
        self
    }

    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }

    /// A fresh transcript: instruction, question, then recalled memory.
    pub fn seed(question: &str, memory: &[MemoryRecord]) -> Session {
        let mut session = Session::new();
        session.push(ChatMessage::system(prompts::PLANNER_SYSTEM_PROMPT));
        session.push(ChatMessage::user(question));
        if let Some(context) = prompts::memory_context(memory) {
            session.push(context);
        }
        session
    }

    /// Drive `session` until the planner emits a final answer.
    pub async fn run(
        &self,
        session: &mut Session,
        question: &str,
        tools: &[serde_json::Value],
        registry: Option<&ToolRegistry>,
    ) -> tandem_core::Result<String> {
        let session_id = session.id.to_string();
        let mut state = PlannerState::Planning;
        let mut cycle = 0;

        loop {
            state = match state {
                PlannerState::Planning => {
                    if cycle >= self.max_cycles {
                        warn!(session_id = %session_id, cycles = cycle, "No final answer within cycle budget");
                        return Err(AgentError::CycleBudgetExceeded { cycles: cycle }.into());
                    }
                    cycle += 1;
                    self.plan(session, cycle).await?
                }
                PlannerState::Dispatching(plan) => {
                    self.dispatch(session, question, &plan, tools, registry)
                        .await?;
                    PlannerState::Planning
                }
                PlannerState::Done(answer) => {
                    info!(session_id = %session_id, cycle, "Final answer produced");
                    self.event_bus.publish(DomainEvent::FinalAnswer {
                        session_id,
                        cycle,
                        answer: answer.clone(),
                        timestamp: Utc::now(),
                    });
                    return Ok(answer);
                }
            };
        }
    }

    async fn plan(&self, session: &mut Session, cycle: u32) -> tandem_core::Result<PlannerState> {
        debug!(session_id = %session.id, cycle, messages = session.messages.len(), "Planning");

        let reply = self.backend.chat(&session.messages, &[], None).await?;
        let content = reply.content.unwrap_or_default();

        let output = PlannerOutput::parse(&content)?;
        session.push(ChatMessage::assistant(content));

        Ok(match output {
            PlannerOutput::FinalAnswer(answer) => PlannerState::Done(answer),
            PlannerOutput::Plan(plan) => {
                info!(session_id = %session.id, cycle, tasks = plan.len(), "Plan produced");
                self.event_bus.publish(DomainEvent::PlanProduced {
                    session_id: session.id.to_string(),
                    cycle,
                    tasks: plan.len(),
                    timestamp: Utc::now(),
                });
                PlannerState::Dispatching(plan)
            }
        })
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        question: &str,
        plan: &Plan,
        tools: &[serde_json::Value],
        registry: Option<&ToolRegistry>,
    ) -> tandem_core::Result<()> {
        let mut exec_messages = vec![
            ChatMessage::system(prompts::EXECUTOR_SYSTEM_PROMPT),
            ChatMessage::user(question),
        ];

        for task in &plan.plan {
            info!(session_id = %session.id, task_id = task.id, "Executing task");
            self.event_bus.publish(DomainEvent::TaskStarted {
                session_id: session.id.to_string(),
                task_id: task.id,
                description: task.description.clone(),
                timestamp: Utc::now(),
            });

            exec_messages.push(ChatMessage::assistant(&task.description));
            let result = self
                .executor
                .run_once(&exec_messages, tools, registry)
                .await?;

            let line = prompts::task_result(task.id, &result);
            exec_messages.push(ChatMessage::assistant(&line));
            session.push(ChatMessage::assistant(line));

            self.event_bus.publish(DomainEvent::TaskCompleted {
                session_id: session.id.to_string(),
                task_id: task.id,
                result,
                timestamp: Utc::now(),
            });
        }

        session.push(ChatMessage::user(prompts::NUDGE_PROMPT));
        Ok(())
    }
}
