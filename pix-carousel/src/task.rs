//! Deferred work returned by controller updates.
//!
//! Controllers never await inside an update. Anything that suspends
//! (remote commands, image probes, scraping) is returned as a [`Task`] whose
//! futures resolve to the message that continues the flow.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

#[must_use = "a task does nothing unless its futures are driven"]
pub struct Task<M> {
    futures: Vec<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    pub fn perform<T, F>(
        future: F,
        map: impl FnOnce(T) -> M + Send + 'static,
    ) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            futures: vec![future.map(map).boxed()],
        }
    }

    /// A message delivered on the next settle.
    pub fn done(message: M) -> Self {
        Self {
            futures: vec![futures::future::ready(message).boxed()],
        }
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task<M>>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|task| task.futures).collect(),
        }
    }

    pub fn map<N: Send + 'static>(
        self,
        f: impl Fn(M) -> N + Clone + Send + 'static,
    ) -> Task<N> {
        Task {
            futures: self
                .futures
                .into_iter()
                .map(|future| future.map(f.clone()).boxed())
                .collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn into_futures(self) -> Vec<BoxFuture<'static, M>> {
        self.futures
    }
}

impl<M> fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_and_map_preserve_messages() {
        let task = Task::batch([
            Task::done(1u32),
            Task::perform(async { 2u32 }, |n| n * 10),
            Task::none(),
        ])
        .map(|n| n + 1);
        assert_eq!(task.len(), 2);

        let mut out = Vec::new();
        for future in task.into_futures() {
            out.push(future.await);
        }
        assert_eq!(out, vec![2, 21]);
    }
}
