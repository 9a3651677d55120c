use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::transport::{Transport, TransportError, TransportResponse};

type Reply = Result<TransportResponse, TransportError>;

enum Script {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// In-memory transport with per-key scripted replies and call counting.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Script>>>,
    defaults: Mutex<HashMap<String, (u16, String)>>,
    calls: Mutex<HashMap<String, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reply with `status`/`body` to every call not covered by a queued reply.
    pub(crate) fn respond(&self, key: &str, status: u16, body: &str) {
        lock(&self.defaults).insert(key.to_string(), (status, body.to_string()));
    }

    pub(crate) fn push(&self, key: &str, reply: Reply) {
        lock(&self.queued)
            .entry(key.to_string())
            .or_default()
            .push_back(Script::Ready(reply));
    }

    pub(crate) fn fail(&self, key: &str, error: TransportError) {
        self.push(key, Err(error));
    }

    /// Queue a reply that is held until the returned sender fires.
    pub(crate) fn gate(&self, key: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        lock(&self.queued)
            .entry(key.to_string())
            .or_default()
            .push_back(Script::Gated(rx));
        tx
    }

    pub(crate) fn calls(&self, key: &str) -> usize {
        lock(&self.calls).get(key).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, key: &str) -> Result<TransportResponse, TransportError> {
        *lock(&self.calls).entry(key.to_string()).or_default() += 1;

        let script = lock(&self.queued)
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        match script {
            Some(Script::Ready(reply)) => reply,
            Some(Script::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Other("gate dropped".to_string()))),
            None => match lock(&self.defaults).get(key) {
                Some((status, body)) => Ok(TransportResponse::new(*status, body.clone())),
                None => Err(TransportError::Other(format!(
                    "no scripted response for {key}"
                ))),
            },
        }
    }
}
