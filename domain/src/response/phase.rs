//! Lifecycle of one response.
//!
//! ```text
//! Idle ─► AwaitingFirstByte ─► Streaming ─► Finalizing ─► Complete
//!               │                   │            ▲
//!               └───────────────────┼────────────┘  (empty answer)
//!   any non-complete phase ─► Errored (absorbing)
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponsePhase {
    /// Created, query not yet sent.
    Idle,
    /// Query sent, working indicator visible.
    AwaitingFirstByte,
    /// At least one fragment arrived.
    Streaming,
    /// End-of-stream seen; the pacing buffer may still be draining.
    Finalizing,
    /// Final pass rendered.
    Complete,
    /// Transport failed before any data; nothing more happens on this stream.
    Errored,
}

impl ResponsePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponsePhase::Idle => "idle",
            ResponsePhase::AwaitingFirstByte => "awaiting-first-byte",
            ResponsePhase::Streaming => "streaming",
            ResponsePhase::Finalizing => "finalizing",
            ResponsePhase::Complete => "complete",
            ResponsePhase::Errored => "errored",
        }
    }

    /// No further transitions are possible from a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResponsePhase::Complete | ResponsePhase::Errored)
    }

    pub fn can_transition_to(&self, next: ResponsePhase) -> bool {
        use ResponsePhase::*;
        match (self, next) {
            (Idle, AwaitingFirstByte) => true,
            (AwaitingFirstByte, Streaming) => true,
            (AwaitingFirstByte, Finalizing) => true,
            (Streaming, Finalizing) => true,
            (Finalizing, Complete) => true,
            (from, Errored) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for ResponsePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
