//! Memory stores for Tandem.
//!
//! All stores implement the `tandem_core::MemoryStore` trait.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::JsonlMemoryStore;
pub use in_memory::InMemoryStore;
