//! `tandem memory`: inspect the memory log.

use tandem_config::AppConfig;
use tandem_core::memory::{MemoryRecord, MemoryStore};
use tandem_memory::JsonlMemoryStore;

pub async fn show(
    config: &AppConfig,
    role: Option<String>,
    recent_k: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let role = role.unwrap_or_else(|| config.agent.role.clone());
    let recent_k = recent_k.unwrap_or(config.memory.recent_k);
    let store = JsonlMemoryStore::new(&config.memory.path);

    let records = store.read(&role, recent_k).await?;

    println!("Memory for role '{role}' ({})", store.path().display());
    println!("==================");
    if records.is_empty() {
        println!("  No records.");
    } else {
        print!("{}", render(&records));
    }

    Ok(())
}

fn render(records: &[MemoryRecord]) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        let when = record
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!("{:>3}. user {} at {when}\n", i + 1, record.user_id));
        for line in &record.memory {
            out.push_str(&format!("       {line}\n"));
        }
    }
    out
}
