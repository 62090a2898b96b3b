//! Mock translator for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::translation::{TranslationContext, TranslationError, Translator};

/// Mock implementation of the Translator trait.
///
/// Provides controllable behavior for testing:
/// - Return a fixed reply
/// - Record every context it was asked to translate
/// - Simulate failures and slow responses
/// - Track how many requests overlapped
pub struct MockTranslator {
    reply: Mutex<String>,
    fail: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    contexts: Mutex<Vec<TranslationContext>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl std::fmt::Debug for MockTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTranslator")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new("תרגום")
    }
}

impl MockTranslator {
    /// Create a mock that answers every request with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(reply.into()),
            fail: Mutex::new(false),
            delay: Mutex::new(None),
            contexts: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Create a mock whose requests all fail.
    pub fn failing() -> Self {
        let translator = Self::default();
        translator.set_failing(true);
        translator
    }

    /// Make every request take at least `delay`.
    pub fn with_delay(self, delay: Duration) -> Self {
        *lock(&self.delay) = Some(delay);
        self
    }

    pub fn set_reply(&self, reply: impl Into<String>) {
        *lock(&self.reply) = reply.into();
    }

    pub fn set_failing(&self, fail: bool) {
        *lock(&self.fail) = fail;
    }

    /// Contexts received so far, oldest first.
    pub fn recorded_contexts(&self) -> Vec<TranslationContext> {
        lock(&self.contexts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.contexts).len()
    }

    /// Highest number of requests that were running at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, context: &TranslationContext) -> Result<String, TranslationError> {
        lock(&self.contexts).push(context.clone());

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        if *lock(&self.fail) {
            return Err(TranslationError::Api {
                status: 503,
                message: "mock translator unavailable".to_string(),
            });
        }
        Ok(lock(&self.reply).clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ticket;
    use chrono::Utc;

    #[tokio::test]
    async fn test_mock_records_and_fails_on_demand() {
        let translator = MockTranslator::new("שלום");
        let context = TranslationContext::from_ticket(&Ticket::seed(Utc::now()), "Hebrew");

        assert_eq!(translator.translate(&context).await.unwrap(), "שלום");

        translator.set_failing(true);
        assert!(translator.translate(&context).await.is_err());
        assert_eq!(translator.call_count(), 2);
        assert_eq!(translator.max_concurrent(), 1);
    }
}
