//! Collision-checked code allocation

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{LinkforgeError, Result};
use crate::generator::CodeGenerator;
use crate::storage::LinkStore;

/// Longest code the `links.code` column accepts
pub const MAX_CODE_LEN: usize = 10;

/// Draws codes from a generator until one is absent from the store
///
/// The existence check is the authority on uniqueness; the generator only
/// makes collisions unlikely. Insert-time conflicts are still possible when
/// two writers race past the check, see [`crate::services::LinkService`].
pub struct CodeAllocator {
    store: Arc<dyn LinkStore>,
    max_attempts: u32,
}

impl CodeAllocator {
    pub fn new(store: Arc<dyn LinkStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn allocate(&self, generator: &CodeGenerator) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            let code = generator.next_code()?;

            if code.len() > MAX_CODE_LEN {
                return Err(LinkforgeError::validation(format!(
                    "Generated code '{}' exceeds {} characters; check the generator epoch",
                    code, MAX_CODE_LEN
                )));
            }

            if !self.store.exists(&code).await? {
                return Ok(code);
            }

            debug!(
                "Code '{}' already taken (attempt {}/{})",
                code, attempt, self.max_attempts
            );
        }

        warn!(
            "Code allocation gave up after {} attempts ({} strategy)",
            self.max_attempts,
            generator.strategy()
        );
        Err(LinkforgeError::allocation_exhausted(format!(
            "No free code found after {} attempts",
            self.max_attempts
        )))
    }
}
