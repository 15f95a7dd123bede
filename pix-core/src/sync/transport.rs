use pix_model::{Command, Response};
use tokio::sync::oneshot;

/// Single-fire handle for a command's result. A dropped sender reads as an
/// empty [`Response`].
pub type Completion = oneshot::Receiver<Response>;

/// The network or bridge channel commands travel over.
///
/// `send` must not block and must not call back into the engine that owns
/// it. The returned completion fires at most once.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, command: Command) -> Completion;
}

/// Sending half of a [`Completion`].
#[derive(Debug)]
pub struct Responder(oneshot::Sender<Response>);

impl Responder {
    /// Delivers `response`. Returns false if nobody is waiting anymore.
    pub fn respond(self, response: Response) -> bool {
        self.0.send(response).is_ok()
    }

    /// Reports a transport failure, which callers see as an empty response.
    pub fn fail(self) {
        drop(self);
    }
}

pub fn completion() -> (Responder, Completion) {
    let (tx, rx) = oneshot::channel();
    (Responder(tx), rx)
}

/// Waits for a completion, mapping a dropped sender to an empty response.
pub async fn resolve(completion: Completion) -> Response {
    completion.await.unwrap_or_default()
}
