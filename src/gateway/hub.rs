use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::trace::Tracer;

pub type SessionId = Uuid;

/// A room member as seen by the hub: the sending half of its outbox.
pub struct Member<M> {
    pub id: SessionId,
    pub outbox: mpsc::Sender<M>,
}

enum Command<M> {
    Join(Member<M>),
    Leave(SessionId),
    Forward(M),
    Members(oneshot::Sender<Vec<SessionId>>),
}

/// Owns room membership and fans out every forwarded payload.
///
/// All state lives inside the task running [`Hub::run`]; everything else
/// talks to it through a [`HubHandle`]. Commands are processed one at a time
/// in submission order, so a session's join is always handled before any
/// message it forwards. The payload type is opaque to the hub.
pub struct Hub<M> {
    members: HashMap<SessionId, mpsc::Sender<M>>,
    rx: mpsc::UnboundedReceiver<Command<M>>,
    tracer: Arc<dyn Tracer>,
}

/// Cloneable submission side of a [`Hub`].
pub struct HubHandle<M> {
    tx: mpsc::UnboundedSender<Command<M>>,
}

impl<M> Clone for HubHandle<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M: Clone + Send + 'static> Hub<M> {
    pub fn new(tracer: Arc<dyn Tracer>) -> (Self, HubHandle<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                members: HashMap::new(),
                rx,
                tracer,
            },
            HubHandle { tx },
        )
    }

    /// Create a hub and run it on a background task.
    pub fn spawn(tracer: Arc<dyn Tracer>) -> HubHandle<M> {
        let (hub, handle) = Self::new(tracer);
        tokio::spawn(hub.run());
        handle
    }

    /// Process commands until every handle has been dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            self.handle(command);
        }
        tracing::debug!("room hub stopped with {} member(s)", self.members.len());
    }

    fn handle(&mut self, command: Command<M>) {
        match command {
            Command::Join(member) => {
                if self.members.insert(member.id, member.outbox).is_some() {
                    tracing::warn!(session = %member.id, "session joined twice, outbox replaced");
                }
                self.tracer.trace(format_args!("new client joined: {}", member.id));
            }
            Command::Leave(id) => {
                // Dropping the sender closes the outbox and ends the write path.
                if self.members.remove(&id).is_some() {
                    self.tracer.trace(format_args!("client left: {id}"));
                }
            }
            Command::Forward(payload) => self.broadcast(payload),
            Command::Members(reply) => {
                let _ = reply.send(self.members.keys().copied().collect());
            }
        }
    }

    fn broadcast(&self, payload: M) {
        self.tracer.trace(format_args!(
            "message received, fanning out to {} client(s)",
            self.members.len()
        ));
        let mut dropped = 0usize;
        for (id, outbox) in &self.members {
            match outbox.try_send(payload.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    dropped += 1;
                    tracing::debug!(session = %id, "outbox full, dropping message");
                }
                // Write path already gone; its leave is on the way.
                Err(TrySendError::Closed(_)) => {}
            }
        }
        if dropped > 0 {
            self.tracer
                .trace(format_args!(" -- dropped for {dropped} slow client(s)"));
        }
    }
}

impl<M> HubHandle<M> {
    /// Ask the hub to admit a member. Never blocks.
    pub fn join(&self, member: Member<M>) {
        if self.tx.send(Command::Join(member)).is_err() {
            tracing::warn!("join submitted after room hub stopped");
        }
    }

    /// Ask the hub to remove a member. Removing an unknown member is a no-op.
    pub fn leave(&self, id: SessionId) {
        let _ = self.tx.send(Command::Leave(id));
    }

    /// Submit a payload for delivery to every current member.
    pub fn forward(&self, payload: M) {
        if self.tx.send(Command::Forward(payload)).is_err() {
            tracing::warn!("message submitted after room hub stopped");
        }
    }

    /// Current member ids, as seen after every previously submitted command.
    pub async fn members(&self) -> Vec<SessionId> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Members(reply)).is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }
}
