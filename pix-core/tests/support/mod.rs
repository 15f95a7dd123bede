#![allow(dead_code)]

use parking_lot::Mutex;
use pix_core::sync::{Completion, Responder, Transport, completion};
use pix_model::{Command, Response};

/// Transport whose responses are released by the test, in any order.
#[derive(Debug, Default)]
pub struct ManualTransport {
    sent: Mutex<Vec<Command>>,
    waiting: Mutex<Vec<Option<Responder>>>,
}

impl ManualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Command> {
        self.sent.lock().clone()
    }

    /// Answers the `index`-th sent command.
    pub fn respond(&self, index: usize, response: Response) {
        let responder = self
            .waiting
            .lock()
            .get_mut(index)
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("no pending command at {index}"));
        responder.respond(response);
    }

    /// Fails the `index`-th sent command.
    pub fn fail(&self, index: usize) {
        if let Some(responder) =
            self.waiting.lock().get_mut(index).and_then(Option::take)
        {
            responder.fail();
        }
    }
}

impl Transport for ManualTransport {
    fn send(&self, command: Command) -> Completion {
        let (responder, completion) = completion();
        self.sent.lock().push(command);
        self.waiting.lock().push(Some(responder));
        completion
    }
}
