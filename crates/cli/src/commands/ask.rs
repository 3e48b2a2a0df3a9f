//! `tandem ask`: one forward pass, optionally followed by backward.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tandem_agent::Agent;
use tandem_config::AppConfig;
use tandem_core::event::{DomainEvent, EventBus};
use tandem_core::memory::UserId;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to answer
    pub question: String,

    /// Agent role; scopes which memory is recalled and written
    #[arg(short, long)]
    pub role: Option<String>,

    /// Feedback on the answer, distilled into a memory record
    #[arg(short, long)]
    pub feedback: Option<String>,

    /// User the feedback comes from
    #[arg(short, long, requires = "feedback")]
    pub user_id: Option<String>,

    /// Give up on the answer after this many seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

pub async fn run(config: &AppConfig, args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY = 'sk-...'");
        eprintln!("    TANDEM_API_KEY = 'sk-...'   (takes precedence)");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let role = args.role.unwrap_or_else(|| config.agent.role.clone());
    debug!(role = %role, timeout = ?args.timeout, memory = %config.memory.path.display(), "Running ask");
    let event_bus = Arc::new(EventBus::default());
    let printer = tokio::spawn(print_progress(event_bus.subscribe()));

    let mut agent = Agent::from_config(config, role, event_bus)?;

    let forward = agent.forward(&args.question, &[], None);
    let answer = match args.timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), forward)
            .await
            .map_err(|_| format!("No answer within {secs}s"))??,
        None => forward.await?,
    };
    println!("{answer}");

    if let Some(feedback) = args.feedback {
        let user_id = args
            .user_id
            .as_deref()
            .map(UserId::from)
            .unwrap_or(UserId::Numeric(0));
        let record = agent.backward(user_id, &feedback).await?;
        eprintln!("[MEMORY] saved {} line(s) for {}", record.memory.len(), record.role);
    }

    // Dropping the agent closes the bus; the printer drains and exits
    drop(agent);
    let _ = printer.await;

    Ok(())
}

async fn print_progress(mut rx: tokio::sync::broadcast::Receiver<Arc<DomainEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(line) = progress_line(&event) {
                    eprintln!("{line}");
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

/// The progress line printed for `event`, if any.
pub fn progress_line(event: &DomainEvent) -> Option<String> {
    match event {
        DomainEvent::PlanProduced { cycle, tasks, .. } => {
            Some(format!("[PLAN] cycle {cycle}: {tasks} task(s)"))
        }
        DomainEvent::TaskStarted { task_id, description, .. } => {
            Some(format!("[EXECUTE] Task {task_id}: {description}"))
        }
        DomainEvent::TaskCompleted { task_id, result, .. } => {
            Some(format!("[RESULT] Task {task_id}: {result}"))
        }
        DomainEvent::ToolExecuted { tool_name, success: false, .. } => {
            Some(format!("[TOOL] {tool_name} failed"))
        }
        _ => None,
    }
}
