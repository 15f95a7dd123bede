use std::collections::VecDeque;

use pix_model::Command;
use tokio::sync::oneshot;

use super::transport::Completion;

/// A command waiting for the session, plus where to hand its completion.
#[derive(Debug)]
pub(crate) struct Pending {
    pub(crate) command: Command,
    pub(crate) deliver: oneshot::Sender<Completion>,
}

/// FIFO of commands issued before a session exists.
#[derive(Debug, Default)]
pub(crate) struct SessionGate {
    established: bool,
    queue: VecDeque<Pending>,
}

impl SessionGate {
    pub(crate) fn is_established(&self) -> bool {
        self.established
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Queues `command`; the receiver yields its completion once flushed.
    pub(crate) fn enqueue(
        &mut self,
        command: Command,
    ) -> oneshot::Receiver<Completion> {
        let (deliver, rx) = oneshot::channel();
        self.queue.push_back(Pending { command, deliver });
        rx
    }

    /// Marks the session live and hands back the queue in issue order.
    /// Only the first call returns anything.
    pub(crate) fn open(&mut self) -> VecDeque<Pending> {
        if self.established {
            return VecDeque::new();
        }
        self.established = true;
        std::mem::take(&mut self.queue)
    }
}
