//! Time-partitioned node-sequence strategy
//!
//! Layout of the 64-bit identifier, high bits first:
//!
//! ```text
//! | 42 bits timestamp (ms since epoch_ms) | 10 bits node | 12 bits sequence |
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{trace, warn};

use super::base62;
use super::clock::Clock;
use crate::errors::{LinkforgeError, Result};

pub const TIMESTAMP_BITS: u32 = 42;
pub const NODE_BITS: u32 = 10;
pub const SEQUENCE_BITS: u32 = 12;

pub const MAX_NODE_ID: u64 = (1 << NODE_BITS) - 1;
pub const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;

const NODE_SHIFT: u32 = SEQUENCE_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + NODE_BITS;

/// Fields packed into one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnowflakeParts {
    pub timestamp: u64,
    pub node_id: u64,
    pub sequence: u64,
}

pub fn compose(timestamp: u64, node_id: u64, sequence: u64) -> u64 {
    ((timestamp & TIMESTAMP_MASK) << TIMESTAMP_SHIFT)
        | ((node_id & MAX_NODE_ID) << NODE_SHIFT)
        | (sequence & MAX_SEQUENCE)
}

pub fn decompose(id: u64) -> SnowflakeParts {
    SnowflakeParts {
        timestamp: (id >> TIMESTAMP_SHIFT) & TIMESTAMP_MASK,
        node_id: (id >> NODE_SHIFT) & MAX_NODE_ID,
        sequence: id & MAX_SEQUENCE,
    }
}

#[derive(Debug, Default)]
struct State {
    last_timestamp: Option<u64>,
    sequence: u64,
}

/// Snowflake-style generator for one node
///
/// All state sits behind a single mutex; `next_id` is the only serialized
/// section in code generation.
pub struct SnowflakeGenerator {
    node_id: u64,
    epoch_ms: u64,
    max_backward_wait: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl SnowflakeGenerator {
    pub fn new(
        node_id: u64,
        epoch_ms: u64,
        max_backward_wait: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if node_id > MAX_NODE_ID {
            return Err(LinkforgeError::validation(format!(
                "Node id must be within 0..={}, got {}",
                MAX_NODE_ID, node_id
            )));
        }

        Ok(Self {
            node_id,
            epoch_ms,
            max_backward_wait,
            clock,
            state: Mutex::new(State::default()),
        })
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    pub fn next_id(&self) -> Result<u64> {
        let mut state = self.state.lock();
        let mut timestamp = self.current_timestamp();

        if let Some(last) = state.last_timestamp
            && timestamp < last
        {
            timestamp = self.wait_for_clock(last)?;
        }

        match state.last_timestamp {
            Some(last) if timestamp == last => {
                state.sequence = (state.sequence + 1) & MAX_SEQUENCE;
                if state.sequence == 0 {
                    trace!("Sequence exhausted at {}ms, waiting for next tick", last);
                    timestamp = self.wait_next_millis(last);
                }
            }
            _ => state.sequence = 0,
        }

        state.last_timestamp = Some(timestamp);
        Ok(compose(timestamp, self.node_id, state.sequence))
    }

    pub fn next_code(&self) -> Result<String> {
        self.next_id().map(base62::encode)
    }

    fn current_timestamp(&self) -> u64 {
        self.clock.now_millis().saturating_sub(self.epoch_ms) & TIMESTAMP_MASK
    }

    /// Spin until the clock passes `last`.
    fn wait_next_millis(&self, last: u64) -> u64 {
        loop {
            let timestamp = self.current_timestamp();
            if timestamp > last {
                return timestamp;
            }
            std::hint::spin_loop();
        }
    }

    /// Give a regressed clock up to `max_backward_wait` to catch up with
    /// `last`. The wait is measured on the monotonic clock.
    fn wait_for_clock(&self, last: u64) -> Result<u64> {
        let deadline = Instant::now() + self.max_backward_wait;
        loop {
            let timestamp = self.current_timestamp();
            if timestamp >= last {
                return Ok(timestamp);
            }
            if Instant::now() >= deadline {
                warn!(
                    "Clock moved backwards by {}ms on node {}",
                    last - timestamp,
                    self.node_id
                );
                return Err(LinkforgeError::clock_moved_backwards(format!(
                    "Clock is {}ms behind the last issued timestamp on node {}",
                    last - timestamp,
                    self.node_id
                )));
            }
            std::hint::spin_loop();
        }
    }
}
