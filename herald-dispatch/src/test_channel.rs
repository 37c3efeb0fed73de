use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use herald_contact::EmailMessage;

use crate::{DispatchChannel, DispatchError};

/// Testing double for the dispatch channel.
///
/// Records every dispatched email in memory, can be scripted to fail
/// upcoming sends, and lets tests wait for dispatches to land.
#[derive(Clone, Debug, Default)]
pub struct TestChannel {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    sent: Mutex<Vec<EmailMessage>>,
    script: Mutex<VecDeque<Result<(), DispatchError>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TestChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next dispatch to fail with `error`. Multiple calls queue
    /// up, consumed in order; once the queue is empty, dispatches succeed
    /// again.
    pub fn fail_next(&self, error: DispatchError) {
        lock(&self.inner.script).push_back(Err(error));
    }

    /// Scripts the next dispatch to succeed, holding its place in the
    /// queue. Lets a test fail only a later dispatch.
    pub fn succeed_next(&self) {
        lock(&self.inner.script).push_back(Ok(()));
    }

    /// Every email dispatched so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.inner.sent).clone()
    }

    #[must_use]
    pub fn sent_count(&self) -> usize {
        lock(&self.inner.sent).len()
    }

    /// Waits until at least `expected` emails have been dispatched.
    ///
    /// Polls the recorded sends until enough have landed or the timeout
    /// expires.
    ///
    /// # Errors
    ///
    /// When the timeout elapses first.
    pub async fn wait_for_count(
        &self,
        expected: usize,
        timeout: Duration,
    ) -> Result<(), DispatchError> {
        let start = tokio::time::Instant::now();

        loop {
            if self.sent_count() >= expected {
                return Ok(());
            }

            if start.elapsed() > timeout {
                return Err(DispatchError::Channel(format!(
                    "Timeout waiting for dispatches. Channel recorded {} of {expected}",
                    self.sent_count()
                )));
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl DispatchChannel for TestChannel {
    async fn dispatch(&self, email: &EmailMessage) -> Result<(), DispatchError> {
        if let Some(Err(error)) = lock(&self.inner.script).pop_front() {
            return Err(error);
        }
        lock(&self.inner.sent).push(email.clone());
        Ok(())
    }

    async fn probe(&self) -> Result<(), DispatchError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "test"
    }
}
