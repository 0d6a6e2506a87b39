//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod chunk_source;
pub mod conversation_logger;
pub mod history;
pub mod renderer;
pub mod session_store;
pub mod surface;
