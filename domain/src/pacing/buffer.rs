//! FIFO character queue drained on a fixed tick.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Reveal rate and tick period.
///
/// The reference setting is 200 characters per second in 20ms ticks, i.e.
/// 4 characters per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    chars_per_second: u32,
    tick_interval: Duration,
}

impl PacingConfig {
    pub fn new(chars_per_second: u32, tick_interval: Duration) -> Result<Self, DomainError> {
        if chars_per_second == 0 {
            return Err(DomainError::InvalidPacing(
                "chars_per_second must be positive".to_string(),
            ));
        }
        if tick_interval.is_zero() {
            return Err(DomainError::InvalidPacing(
                "tick interval must be positive".to_string(),
            ));
        }
        Ok(Self {
            chars_per_second,
            tick_interval,
        })
    }

    pub fn chars_per_second(&self) -> u32 {
        self.chars_per_second
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Characters released per tick: `rate × interval`, rounded, at least 1.
    pub fn chars_per_tick(&self) -> usize {
        const NANOS_PER_SEC: u128 = 1_000_000_000;
        let scaled = u128::from(self.chars_per_second) * self.tick_interval.as_nanos();
        let rounded = (scaled + NANOS_PER_SEC / 2) / NANOS_PER_SEC;
        usize::try_from(rounded).unwrap_or(usize::MAX).max(1)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            chars_per_second: 200,
            tick_interval: Duration::from_millis(20),
        }
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Up to `chars_per_tick` characters, in arrival order.
    Emit(String),
    /// Queue empty but more data may arrive.
    Idle,
    /// Queue empty and finished. Returned exactly once.
    Finished,
    /// Completion was already reported; the ticker should have stopped.
    Stopped,
}

/// Pending characters plus a "stream finished" flag.
#[derive(Debug, Clone)]
pub struct PacingBuffer {
    pending: VecDeque<char>,
    per_tick: usize,
    finished: bool,
    completion_reported: bool,
}

impl PacingBuffer {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            pending: VecDeque::new(),
            per_tick: config.chars_per_tick(),
            finished: false,
            completion_reported: false,
        }
    }

    /// Queue `text` behind everything already pending. Text offered after
    /// [`mark_finished`](Self::mark_finished) is refused and `false` returned.
    pub fn enqueue(&mut self, text: &str) -> bool {
        if self.finished {
            return false;
        }
        self.pending.extend(text.chars());
        true
    }

    /// No more text will arrive. Completion follows once the queue drains.
    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.completion_reported
    }

    pub fn tick(&mut self) -> Tick {
        if !self.pending.is_empty() {
            let take = self.per_tick.min(self.pending.len());
            return Tick::Emit(self.pending.drain(..take).collect());
        }
        if self.completion_reported {
            return Tick::Stopped;
        }
        if self.finished {
            self.completion_reported = true;
            return Tick::Finished;
        }
        Tick::Idle
    }
}
