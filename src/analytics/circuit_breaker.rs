//! Call-wrapping circuit breaker
//!
//! ```text
//! Closed --(failure rate >= threshold over the window)--> Open
//! Open   --(wait duration elapsed, next call)-----------> HalfOpen
//! HalfOpen --(all trial calls succeed)------------------> Closed
//! HalfOpen --(any trial call fails)---------------------> Open
//! ```
//!
//! Outcomes are kept in a count-based sliding window. Every wrapped call is
//! bounded by a timeout, and a timeout counts as a failure. A half-open trial
//! whose caller drops the future before it settles counts as failed too.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use strum::{AsRefStr, Display};
use tracing::{debug, info, warn};

use crate::config::CircuitBreakerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Why a wrapped call produced no value
#[derive(Debug)]
pub enum CallError<E> {
    /// The circuit is open; the call was never attempted
    Rejected,
    TimedOut(Duration),
    Failed(E),
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Rejected => write!(f, "circuit open, call not permitted"),
            CallError::TimedOut(after) => write!(f, "call timed out after {:?}", after),
            CallError::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for CallError<E> {}

#[derive(Debug)]
enum Inner {
    /// `true` entries are failures
    Closed { window: VecDeque<bool> },
    Open { reopen_at: Instant },
    HalfOpen { in_flight: usize, succeeded: usize },
}

#[derive(Debug)]
struct Machine {
    inner: Inner,
    /// Bumped on every transition so late outcomes from an earlier state are ignored
    generation: u64,
}

/// Admission ticket for one call. Dropped unsettled, it abandons the call.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    trial: bool,
    settled: bool,
}

impl Permit<'_> {
    fn succeeded(mut self) {
        self.settled = true;
        self.breaker.on_success(self.generation, self.trial);
    }

    fn failed(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.generation, self.trial);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.on_abandoned(self.generation, self.trial);
        }
    }
}

pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    call_timeout: Duration,
    machine: Mutex<Machine>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig, call_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            config,
            call_timeout,
            machine: Mutex::new(Machine {
                inner: Inner::Closed {
                    window: VecDeque::new(),
                },
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        match self.machine.lock().inner {
            Inner::Closed { .. } => CircuitState::Closed,
            Inner::Open { .. } => CircuitState::Open,
            Inner::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Run `operation` if the circuit admits it.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(permit) = self.acquire() else {
            debug!("Circuit '{}' is open, short-circuiting call", self.name);
            return Err(CallError::Rejected);
        };

        match tokio::time::timeout(self.call_timeout, operation()).await {
            Ok(Ok(value)) => {
                permit.succeeded();
                Ok(value)
            }
            Ok(Err(e)) => {
                permit.failed();
                Err(CallError::Failed(e))
            }
            Err(_) => {
                permit.failed();
                Err(CallError::TimedOut(self.call_timeout))
            }
        }
    }

    /// Open the circuit now, for operators and tests.
    pub fn force_open(&self) {
        let mut machine = self.machine.lock();
        self.transition_to_open(&mut machine);
    }

    /// Close the circuit and forget all recorded outcomes.
    pub fn reset(&self) {
        let mut machine = self.machine.lock();
        self.transition_to_closed(&mut machine);
    }

    fn acquire(&self) -> Option<Permit<'_>> {
        let mut machine = self.machine.lock();
        let permitted = self.config.permitted_calls_half_open;

        let trial = match &mut machine.inner {
            Inner::Closed { .. } => false,
            Inner::Open { reopen_at } => {
                if Instant::now() < *reopen_at {
                    return None;
                }
                machine.inner = Inner::HalfOpen {
                    in_flight: 1,
                    succeeded: 0,
                };
                machine.generation += 1;
                info!(
                    "Circuit '{}' OPEN -> HALF_OPEN, allowing {} trial calls",
                    self.name, permitted
                );
                true
            }
            Inner::HalfOpen {
                in_flight,
                succeeded,
            } => {
                if *in_flight + *succeeded >= permitted {
                    return None;
                }
                *in_flight += 1;
                true
            }
        };

        Some(Permit {
            breaker: self,
            generation: machine.generation,
            trial,
            settled: false,
        })
    }

    fn on_success(&self, generation: u64, trial: bool) {
        let mut machine = self.machine.lock();
        if machine.generation != generation {
            return;
        }

        match &mut machine.inner {
            Inner::Closed { window } => self.push_outcome(window, false),
            Inner::HalfOpen {
                in_flight,
                succeeded,
            } if trial => {
                *in_flight = in_flight.saturating_sub(1);
                *succeeded += 1;
                if *succeeded >= self.config.permitted_calls_half_open {
                    self.transition_to_closed(&mut machine);
                }
            }
            _ => {}
        }
    }

    fn on_failure(&self, generation: u64, trial: bool) {
        let mut machine = self.machine.lock();
        if machine.generation != generation {
            return;
        }

        match &mut machine.inner {
            Inner::Closed { window } => {
                self.push_outcome(window, true);
                if let Some(rate) = self.failure_rate(window)
                    && rate >= self.config.failure_rate_threshold
                {
                    warn!(
                        "Circuit '{}' failure rate {:.1}% >= {:.1}%",
                        self.name, rate, self.config.failure_rate_threshold
                    );
                    self.transition_to_open(&mut machine);
                }
            }
            Inner::HalfOpen { .. } if trial => {
                warn!("Circuit '{}' trial call failed", self.name);
                self.transition_to_open(&mut machine);
            }
            _ => {}
        }
    }

    /// The caller stopped waiting. Closed-state calls leave no outcome.
    fn on_abandoned(&self, generation: u64, trial: bool) {
        let mut machine = self.machine.lock();
        if machine.generation != generation {
            return;
        }

        if trial && matches!(machine.inner, Inner::HalfOpen { .. }) {
            warn!("Circuit '{}' trial call abandoned before settling", self.name);
            self.transition_to_open(&mut machine);
        }
    }

    fn push_outcome(&self, window: &mut VecDeque<bool>, failed: bool) {
        window.push_back(failed);
        while window.len() > self.config.sliding_window_size {
            window.pop_front();
        }
    }

    /// Failure percentage, or `None` until enough calls were recorded
    fn failure_rate(&self, window: &VecDeque<bool>) -> Option<f64> {
        let minimum = self
            .config
            .minimum_calls
            .min(self.config.sliding_window_size)
            .max(1);
        if window.len() < minimum {
            return None;
        }
        let failures = window.iter().filter(|failed| **failed).count();
        Some(failures as f64 * 100.0 / window.len() as f64)
    }

    fn transition_to_open(&self, machine: &mut Machine) {
        let wait = self.config.wait_duration_open();
        machine.inner = Inner::Open {
            reopen_at: Instant::now() + wait,
        };
        machine.generation += 1;
        warn!("Circuit '{}' -> OPEN for {:?}", self.name, wait);
    }

    fn transition_to_closed(&self, machine: &mut Machine) {
        machine.inner = Inner::Closed {
            window: VecDeque::with_capacity(self.config.sliding_window_size),
        };
        machine.generation += 1;
        info!("Circuit '{}' -> CLOSED", self.name);
    }
}
