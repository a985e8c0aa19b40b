//! Short code generation
//!
//! Two strategies behind one closed enum, chosen once at startup:
//! - `Counter`: process-local atomic counter
//! - `Distributed`: time + node + sequence, collision free across nodes

pub mod base62;
pub mod clock;
pub mod counter;
pub mod snowflake;

use std::sync::Arc;

use tracing::info;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::CounterGenerator;
pub use snowflake::{MAX_NODE_ID, MAX_SEQUENCE, SnowflakeGenerator, SnowflakeParts};

use crate::config::{GeneratorConfig, GeneratorStrategy};
use crate::errors::Result;

pub enum CodeGenerator {
    Counter(CounterGenerator),
    Distributed(SnowflakeGenerator),
}

impl CodeGenerator {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &GeneratorConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let generator = match config.strategy {
            GeneratorStrategy::Counter => {
                CodeGenerator::Counter(CounterGenerator::new(config.counter_offset))
            }
            GeneratorStrategy::Distributed => CodeGenerator::Distributed(SnowflakeGenerator::new(
                config.node_id,
                config.epoch_ms,
                config.max_backward_wait(),
                clock,
            )?),
        };

        info!(
            "Code generator ready: strategy={}, node_id={}",
            generator.strategy(),
            config.node_id
        );
        Ok(generator)
    }

    pub fn strategy(&self) -> GeneratorStrategy {
        match self {
            CodeGenerator::Counter(_) => GeneratorStrategy::Counter,
            CodeGenerator::Distributed(_) => GeneratorStrategy::Distributed,
        }
    }

    pub fn next_code(&self) -> Result<String> {
        match self {
            CodeGenerator::Counter(generator) => Ok(generator.next_code()),
            CodeGenerator::Distributed(generator) => generator.next_code(),
        }
    }
}
