//! Node identifier generation

use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

/// Source of fresh, opaque node identifiers.
pub trait IdGenerator: Send + Sync {
    /// Mint a new identifier.
    fn mint(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn mint(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Always returns the same identifier.
#[derive(Debug, Clone)]
pub struct FixedIdGenerator(String);

impl FixedIdGenerator {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl IdGenerator for FixedIdGenerator {
    fn mint(&self) -> String {
        self.0.clone()
    }
}

/// Identifiers `n0`, `n1`, ... in minting order.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIdGenerator {
    fn mint(&self) -> String {
        format!("n{}", self.next.fetch_add(1, Ordering::Relaxed))
    }
}
