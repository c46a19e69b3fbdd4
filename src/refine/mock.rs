//! Scripted text generator for tests and offline runs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::TextGenerator;
use crate::error::{Error, Result};

/// Behavior mode for the mock generator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always answers with this text
    Reply(String),
    /// Always fails as if the network were down
    Failing,
}

/// Generator that answers from a script instead of a service
#[derive(Debug)]
pub struct MockGenerator {
    behavior: MockBehavior,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Hold every answer back for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of generate calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.behavior {
            MockBehavior::Reply(text) => Ok(text.clone()),
            MockBehavior::Failing => Err(Error::General("simulated network error".to_string())),
        }
    }
}
