//! The Tandem agent: a planner/executor loop with feedback-driven memory.
//!
//! A question flows through two nested cycles:
//!
//! 1. **Recall** the role's recent memory records
//! 2. **Plan**: the planner backend replies with a JSON task list, or with
//!    `FINAL ANSWER: ...`
//! 3. **Execute** each task in order; the executor backend may call tools
//!    and sees their results before answering
//! 4. **Report** task results to the planner and loop back to step 2
//!
//! After the answer, `Agent::backward` turns user feedback into a memory
//! record that future runs recall in step 1.

pub mod agent;
pub mod executor;
pub mod planner;
pub mod prompts;

#[cfg(test)]
mod test_helpers;

pub use agent::Agent;
pub use executor::Executor;
pub use planner::Planner;
