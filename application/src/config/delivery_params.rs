//! Delivery parameters: how answers are fetched and revealed.
//!
//! [`DeliveryParams`] groups the static knobs the response controller and
//! the chat session read. These are application-layer concerns assembled
//! from the config file and CLI flags by the binary.

use relay_domain::PacingConfig;

#[derive(Debug, Clone)]
pub struct DeliveryParams {
    /// Try the streaming transport first. When off, every query goes
    /// straight to the single-shot call.
    pub streaming: bool,
    /// Reveal rate and tick period of the pacing buffer.
    pub pacing: PacingConfig,
    /// Default number of messages fetched by `/history`.
    pub history_limit: usize,
    /// Ask the server to delete the old history when the session is reset.
    pub clear_history_on_reset: bool,
}

impl Default for DeliveryParams {
    fn default() -> Self {
        Self {
            streaming: true,
            pacing: PacingConfig::default(),
            history_limit: 50,
            clear_history_on_reset: true,
        }
    }
}

impl DeliveryParams {
    // ==================== Builder Methods ====================

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_clear_history_on_reset(mut self, clear: bool) -> Self {
        self.clear_history_on_reset = clear;
        self
    }
}
