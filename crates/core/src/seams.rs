//! Injection points for the only non-deterministic inputs of generation:
//! identifiers, placeholder confidence scores and timestamps.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rand::Rng;

pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

pub trait ConfidenceSource: Send + Sync {
    fn next_confidence(&self) -> f64;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4())
    }
}

/// Yields `prefix-1`, `prefix-2`, ... with one counter shared across prefixes.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let value = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{value}")
    }
}

pub const MIN_CONFIDENCE: f64 = 0.7;
pub const MAX_CONFIDENCE: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct RandomConfidence;

impl ConfidenceSource for RandomConfidence {
    fn next_confidence(&self) -> f64 {
        rand::thread_rng().gen_range(MIN_CONFIDENCE..MAX_CONFIDENCE)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedConfidence(pub f64);

impl ConfidenceSource for FixedConfidence {
    fn next_confidence(&self) -> f64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
