//! Fixed instructions for the three backends, plus transcript rendering.

use tandem_core::memory::MemoryRecord;
use tandem_core::message::ChatMessage;

/// System instruction for the planner backend.
pub const PLANNER_SYSTEM_PROMPT: &str = "\
You are the META-PLANNER in a hierarchical AI system. A user will ask a
high-level question. First, break the problem into a minimal sequence of
executable tasks. Reply ONLY in JSON with the schema:
{ \"plan\": [ {\"id\": INT, \"description\": STRING} ... ] }

After each task is executed by the EXECUTOR you will receive its result.
Pay attention to dates of web pages and events mentioned in the tasks, and
take them into account when planning and when giving the final answer.
When the final answer is complete, output it with the template:
FINAL ANSWER: <answer>

The final answer should be a number OR as few words as possible OR a comma
separated list of numbers and/or strings. For numbers, do not use commas or
units such as $ or percent signs unless asked. For strings, do not use
articles or abbreviations (e.g. for cities), and write digits in plain text
unless asked. For lists, apply the rules above to each element.
The final answer must follow the question's requirements exactly, without
additional analysis.
If the final answer is not complete yet, emit a new JSON plan for the
remaining work. Keep cycles as few as possible. Never call tools yourself;
that is the EXECUTOR's job.
Reply with pure JSON only.";

/// System instruction for the executor backend.
pub const EXECUTOR_SYSTEM_PROMPT: &str = "\
You are the EXECUTOR sub-agent. You will first receive the user's original \
question, then one subtask at a time from the meta-planner. \
Complete the subtask, using the available tools via function calling if needed. \
If no tools are available or none are necessary, analyze the question and the \
history so far and answer in natural language. \
If you must call a tool, emit the function call instead of natural language. \
When done, do NOT output FINAL ANSWER.";

/// System instruction for the memory-updater backend.
pub const MEMORY_UPDATER_PROMPT: &str = "\
You are a memory-updater sub-agent. You receive a dialogue between the user \
and the assistant. Using the feedback the user gives at the end, extract all \
useful information from the whole conversation and return it one item per \
line. Keep each line as short as possible.";

/// Appended to the planner transcript after every dispatched plan.
pub const NUDGE_PROMPT: &str = "All task results have been given above, try if you can give the FINAL answer. If can't create another plan instead";

const RULE: &str = "-------------------------------------------------";

/// `Result for task {id}: {text}`
pub fn task_result(task_id: i64, text: &str) -> String {
    format!("Result for task {task_id}: {text}")
}

/// Render recalled memory as one context message, or `None` when there is
/// nothing to recall.
pub fn memory_context(records: &[MemoryRecord]) -> Option<ChatMessage> {
    if records.is_empty() {
        return None;
    }

    let mut text = String::from("Memory from earlier sessions:");
    for record in records {
        for line in &record.memory {
            text.push_str("\n- ");
            text.push_str(line);
        }
    }
    Some(ChatMessage::user(text))
}

/// Flatten a transcript into the script the memory updater reads.
pub fn render_history(messages: &[ChatMessage]) -> String {
    let mut history = String::new();
    for message in messages {
        history.push('\n');
        history.push_str(message.role.as_str());
        history.push(':');
        history.push_str(message.content_str());
        history.push('\n');
        history.push_str(RULE);
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::memory::UserId;

    #[test]
    fn history_is_role_colon_content_with_rules() {
        let rendered = render_history(&[
            ChatMessage::user("q"),
            ChatMessage::assistant("FINAL ANSWER: 7"),
        ]);
        assert_eq!(
            rendered,
            format!("\nuser:q\n{RULE}\nassistant:FINAL ANSWER: 7\n{RULE}")
        );
    }

    #[test]
    fn memory_context_lists_every_line() {
        let records = vec![
            MemoryRecord::new(UserId::Numeric(1), "user_agent", vec!["likes sci-fi".into()]),
            MemoryRecord::new(
                UserId::Numeric(2),
                "user_agent",
                vec!["dislikes horror".into(), "age 25".into()],
            ),
        ];
        let msg = memory_context(&records).unwrap();
        let text = msg.content_str();
        assert!(text.contains("- likes sci-fi"));
        assert!(text.contains("- dislikes horror"));
        assert!(text.contains("- age 25"));
    }

    #[test]
    fn no_records_no_context() {
        assert!(memory_context(&[]).is_none());
    }

    #[test]
    fn task_result_format() {
        assert_eq!(task_result(3, "done"), "Result for task 3: done");
    }
}
