//! A role-scoped agent: `forward` answers, `backward` learns.
//!
//! `forward` recalls the role's recent memory, then drives the planner.
//! `backward` distills the last session plus user feedback into one memory
//! record and appends it to the store.

use std::sync::Arc;

use chrono::Utc;
use tandem_config::AppConfig;
use tandem_core::error::AgentError;
use tandem_core::event::{DomainEvent, EventBus};
use tandem_core::memory::{MemoryRecord, MemoryStore, UserId};
use tandem_core::message::{ChatMessage, Role, Session};
use tandem_core::tool::ToolRegistry;
use tandem_memory::JsonlMemoryStore;
use tandem_providers::{Backends, ChatBackend};
use tracing::{debug, info};

use crate::executor::Executor;
use crate::planner::Planner;
use crate::prompts;

pub const DEFAULT_RECENT_K: usize = 10;

pub struct Agent {
    role: String,
    planner: Planner,
    memory_backend: ChatBackend,
    store: Arc<dyn MemoryStore>,
    recent_k: usize,
    session: Option<Session>,
    event_bus: Arc<EventBus>,
}

impl Agent {
    /// Create an agent with default cycle, tool-round and recall limits.
    pub fn new(
        role: impl Into<String>,
        backends: Backends,
        store: Arc<dyn MemoryStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let executor = Executor::new(backends.executor, event_bus.clone());
        Self {
            role: role.into(),
            planner: Planner::new(backends.planner, executor, event_bus.clone()),
            memory_backend: backends.memory,
            store,
            recent_k: DEFAULT_RECENT_K,
            session: None,
            event_bus,
        }
    }

    /// Build every collaborator from configuration: the HTTP backends and
    /// the JSONL store at `memory.path`.
    pub fn from_config(
        config: &AppConfig,
        role: impl Into<String>,
        event_bus: Arc<EventBus>,
    ) -> tandem_core::Result<Self> {
        let backends = Backends::from_config(config)?;
        let store = Arc::new(JsonlMemoryStore::new(&config.memory.path));
        Ok(Self::with_config(config, role, backends, store, event_bus))
    }

    /// Wire explicit collaborators, taking limits from configuration.
    pub fn with_config(
        config: &AppConfig,
        role: impl Into<String>,
        backends: Backends,
        store: Arc<dyn MemoryStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let executor = Executor::new(backends.executor, event_bus.clone())
            .with_max_tool_rounds(config.agent.max_tool_rounds);
        let planner = Planner::new(backends.planner, executor, event_bus.clone())
            .with_max_cycles(config.agent.max_cycles);
        Self {
            role: role.into(),
            planner,
            memory_backend: backends.memory,
            store,
            recent_k: config.memory.recent_k,
            session: None,
            event_bus,
        }
    }

    pub fn with_recent_k(mut self, recent_k: usize) -> Self {
        self.recent_k = recent_k;
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// The transcript of the most recent `forward`, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Answer `question`, planning and dispatching tasks as needed.
    ///
    /// Replaces any previous session. The transcript is kept even when the
    /// run fails, so `backward` can still learn from it.
    pub async fn forward(
        &mut self,
        question: &str,
        tools: &[serde_json::Value],
        registry: Option<&ToolRegistry>,
    ) -> tandem_core::Result<String> {
        let memory = self.store.read(&self.role, self.recent_k).await?;
        debug!(role = %self.role, records = memory.len(), "Recalled memory");

        let session = self.session.insert(Planner::seed(question, &memory));
        info!(session_id = %session.id, role = %self.role, "Starting forward pass");

        self.planner.run(session, question, tools, registry).await
    }

    /// Distill the last session plus `feedback` into one memory record.
    ///
    /// Fails with `NoSession` if `forward` has never run. The record is
    /// appended exactly once and returned.
    pub async fn backward(
        &mut self,
        user_id: impl Into<UserId>,
        feedback: &str,
    ) -> tandem_core::Result<MemoryRecord> {
        let session = self.session.as_mut().ok_or(AgentError::NoSession)?;

        session.push(ChatMessage::user(feedback));
        if session.messages.first().map(|m| m.role) == Some(Role::System) {
            session.messages.remove(0);
        }

        let history = prompts::render_history(&session.messages);
        let request = [
            ChatMessage::system(prompts::MEMORY_UPDATER_PROMPT),
            ChatMessage::user(history),
        ];
        let reply = self.memory_backend.chat(&request, &[], None).await?;

        let lines: Vec<String> = reply
            .content_str()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        let record = MemoryRecord::new(user_id.into(), self.role.clone(), lines);
        self.store.append(&record).await?;

        info!(role = %self.role, user_id = %record.user_id, lines = record.memory.len(), "Memory saved");
        self.event_bus.publish(DomainEvent::MemoryAppended {
            role: self.role.clone(),
            lines: record.memory.len(),
            timestamp: Utc::now(),
        });

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tandem_core::error::{Error, MemoryError};
    use tandem_core::provider::ChatReply;
    use tandem_memory::InMemoryStore;

    fn backends(provider: &Arc<SequentialMockProvider>) -> Backends {
        Backends {
            planner: backend(provider.clone()),
            executor: backend(provider.clone()),
            memory: backend(provider.clone()),
        }
    }

    fn agent(provider: &Arc<SequentialMockProvider>, store: Arc<dyn MemoryStore>) -> Agent {
        Agent::new("user_agent", backends(provider), store, Arc::new(EventBus::default()))
    }

    #[tokio::test]
    async fn backward_before_forward_is_no_session() {
        let provider = SequentialMockProvider::new(vec![]);
        let mut agent = agent(&provider, Arc::new(InMemoryStore::new()));

        let err = agent.backward(1_i64, "great").await.unwrap_err();
        assert!(matches!(err, Error::Agent(AgentError::NoSession)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn forward_then_backward_appends_one_record() {
        let provider = SequentialMockProvider::new(vec![
            ChatReply::text("FINAL ANSWER: accept"),
            ChatReply::text("  Likes sci-fi \n\n Dislikes horror\n"),
        ]);
        let store = Arc::new(InMemoryStore::new());
        let mut agent = agent(&provider, store.clone());

        let answer = agent.forward("Watch Alien?", &[], None).await.unwrap();
        assert_eq!(answer, "accept");

        let record = agent.backward(346_i64, "User accepted").await.unwrap();
        assert_eq!(record.user_id, UserId::Numeric(346));
        assert_eq!(record.role, "user_agent");
        assert_eq!(record.memory, vec!["Likes sci-fi", "Dislikes horror"]);
        assert_eq!(store.all().await, vec![record]);

        // Memory updater sees the script without the planner instruction
        let requests = provider.requests();
        let updater = &requests[1];
        assert_eq!(updater.messages.len(), 2);
        assert_eq!(updater.messages[0].content_str(), prompts::MEMORY_UPDATER_PROMPT);
        let script = updater.messages[1].content_str();
        assert!(script.starts_with("\nuser:Watch Alien?\n"));
        assert!(script.contains("\nassistant:FINAL ANSWER: accept\n"));
        assert!(script.contains("\nuser:User accepted\n-"));
        assert!(script.ends_with('-'));
        assert!(!script.contains("META-PLANNER"));
    }

    #[tokio::test]
    async fn forward_recalls_role_memory() {
        let store = Arc::new(InMemoryStore::with_records(vec![
            MemoryRecord::new(UserId::Numeric(1), "user_agent", vec!["mine".into()]),
            MemoryRecord::new(UserId::Numeric(1), "item_agent", vec!["theirs".into()]),
        ]));
        let provider = SequentialMockProvider::new(vec![ChatReply::text("FINAL ANSWER: ok")]);
        let mut agent = agent(&provider, store);

        agent.forward("q", &[], None).await.unwrap();

        let planner_request = &provider.requests()[0];
        assert_eq!(planner_request.messages.len(), 3);
        let context = planner_request.messages[2].content_str();
        assert!(context.contains("mine"));
        assert!(!context.contains("theirs"));
    }

    #[tokio::test]
    async fn no_memory_no_context_message() {
        let provider = SequentialMockProvider::new(vec![ChatReply::text("FINAL ANSWER: ok")]);
        let mut agent = agent(&provider, Arc::new(InMemoryStore::new()));

        agent.forward("q", &[], None).await.unwrap();
        assert_eq!(provider.requests()[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn backward_with_null_reply_still_appends() {
        let provider = SequentialMockProvider::new(vec![
            ChatReply::text("FINAL ANSWER: ok"),
            ChatReply::default(),
        ]);
        let store = Arc::new(InMemoryStore::new());
        let mut agent = agent(&provider, store.clone());

        agent.forward("q", &[], None).await.unwrap();
        let record = agent.backward("alice", "meh").await.unwrap();

        assert!(record.memory.is_empty());
        assert_eq!(record.user_id, UserId::Named("alice".into()));
        assert_eq!(store.all().await.len(), 1);
    }

    #[tokio::test]
    async fn backward_surfaces_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonlMemoryStore::new(dir.path().join("missing").join("m.jsonl")));
        let provider = SequentialMockProvider::new(vec![
            ChatReply::text("FINAL ANSWER: ok"),
            ChatReply::text("fact"),
        ]);
        let mut agent = agent(&provider, store);

        agent.forward("q", &[], None).await.unwrap();
        let err = agent.backward(1_i64, "fb").await.unwrap_err();
        assert!(matches!(err, Error::Memory(MemoryError::Storage(_))));
    }

    #[tokio::test]
    async fn session_survives_failed_forward() {
        let provider = SequentialMockProvider::new(vec![
            ChatReply::text("not a plan"),
            ChatReply::text("learned something"),
        ]);
        let mut agent = agent(&provider, Arc::new(InMemoryStore::new()));

        assert!(agent.forward("q", &[], None).await.is_err());
        assert!(agent.session().is_some());
        let record = agent.backward(1_i64, "that failed").await.unwrap();
        assert_eq!(record.memory, vec!["learned something"]);
    }

    #[tokio::test]
    async fn with_config_applies_limits() {
        let mut config = AppConfig::default();
        config.agent.max_cycles = 2;
        config.memory.recent_k = 1;

        let provider = SequentialMockProvider::new(vec![
            ChatReply::text(plan_json(&[(1, "a")])),
            ChatReply::text("r"),
            ChatReply::text(plan_json(&[(2, "b")])),
            ChatReply::text("r"),
        ]);
        let store = Arc::new(InMemoryStore::with_records(vec![
            MemoryRecord::new(UserId::Numeric(1), "r", vec!["old".into()]),
            MemoryRecord::new(UserId::Numeric(1), "r", vec!["new".into()]),
        ]));
        let mut agent = Agent::with_config(
            &config,
            "r",
            backends(&provider),
            store,
            Arc::new(EventBus::default()),
        );

        let err = agent.forward("q", &[], None).await.unwrap_err();
        assert!(matches!(err, Error::Agent(AgentError::CycleBudgetExceeded { cycles: 2 })));

        let context = provider.requests()[0].messages[2].content_str().to_string();
        assert!(context.contains("new"));
        assert!(!context.contains("old"));
    }
}
