use std::fmt;
use std::time::Duration;

use axum::extract::ws::{Message, Utf8Bytes};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use super::hub::{HubHandle, Member, SessionId};
use crate::config::SessionConfig;
use crate::models::message::{ChatMessage, IncomingMessage};
use crate::models::user::Identity;

/// One connected chat user.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub identity: Identity,
}

/// Why the read path stopped.
#[derive(Debug)]
enum ReadEnd {
    Closed,
    Timeout,
    Protocol(String),
    Transport(String),
}

impl fmt::Display for ReadEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadEnd::Closed => write!(f, "closed by peer"),
            ReadEnd::Timeout => write!(f, "read timeout"),
            ReadEnd::Protocol(e) => write!(f, "protocol error: {e}"),
            ReadEnd::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

enum Ended {
    Read(ReadEnd),
    Write,
}

/// Submits the session's leave exactly once, when dropped.
struct LeaveGuard<'a> {
    hub: &'a HubHandle<Utf8Bytes>,
    id: SessionId,
}

impl Drop for LeaveGuard<'_> {
    fn drop(&mut self) {
        self.hub.leave(self.id);
    }
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
        }
    }

    /// Join the room and pump frames until the connection ends.
    ///
    /// `sink` is only ever written by the write path and `stream` only read
    /// by the read path. Whichever path stops first ends the session; the
    /// write path is the one that closes the connection.
    pub async fn run<K, S, E>(
        self,
        sink: K,
        stream: S,
        hub: HubHandle<Utf8Bytes>,
        config: &SessionConfig,
    ) where
        K: Sink<Message> + Unpin,
        K::Error: fmt::Display,
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        let (outbox, outbox_rx) = mpsc::channel(config.outbox_capacity);
        hub.join(Member {
            id: self.id,
            outbox,
        });
        let guard = LeaveGuard { hub: &hub, id: self.id };
        tracing::debug!(session = %self.id, user = %self.identity.name, "session started");

        let read = read_path(stream, &hub, &self.identity, config.read_timeout);
        let write = write_path(
            sink,
            outbox_rx,
            config.ping_interval,
            config.write_timeout,
            self.id,
        );
        tokio::pin!(read, write);

        let ended = tokio::select! {
            end = &mut read => Ended::Read(end),
            () = &mut write => Ended::Write,
        };
        drop(guard);

        match ended {
            Ended::Read(end) => {
                tracing::debug!(session = %self.id, "read path ended: {end}");
                // The hub closes the outbox on leave; flush what is queued,
                // but never wait on a peer that stopped reading.
                let flush = config.write_timeout * 2;
                if tokio::time::timeout(flush, &mut write).await.is_err() {
                    tracing::debug!(session = %self.id, "write path did not drain in {flush:?}, dropping connection");
                }
            }
            Ended::Write => {
                tracing::debug!(session = %self.id, "write path ended");
            }
        }
        tracing::debug!(session = %self.id, user = %self.identity.name, "session finished");
    }
}

async fn read_path<S, E>(
    mut stream: S,
    hub: &HubHandle<Utf8Bytes>,
    identity: &Identity,
    read_timeout: Duration,
) -> ReadEnd
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    loop {
        let frame = match tokio::time::timeout(read_timeout, stream.next()).await {
            Err(_) => return ReadEnd::Timeout,
            Ok(None) => return ReadEnd::Closed,
            Ok(Some(Err(e))) => return ReadEnd::Transport(e.to_string()),
            Ok(Some(Ok(frame))) => frame,
        };
        match frame {
            Message::Text(text) => {
                let incoming: IncomingMessage = match serde_json::from_str(text.as_str()) {
                    Ok(incoming) => incoming,
                    Err(e) => return ReadEnd::Protocol(e.to_string()),
                };
                let chat = ChatMessage::from_sender(identity, incoming.message);
                match serde_json::to_string(&chat) {
                    Ok(json) => hub.forward(json.into()),
                    Err(e) => tracing::warn!("failed to encode chat message: {e}"),
                }
            }
            Message::Close(_) => return ReadEnd::Closed,
            // Pings, pongs and binary frames only count as activity.
            _ => {}
        }
    }
}

async fn write_path<K>(
    mut sink: K,
    mut outbox: mpsc::Receiver<Utf8Bytes>,
    ping_interval: Duration,
    write_timeout: Duration,
    id: SessionId,
) where
    K: Sink<Message> + Unpin,
    K::Error: fmt::Display,
{
    let mut ping = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);
    loop {
        let frame = tokio::select! {
            next = outbox.recv() => match next {
                Some(payload) => Message::Text(payload),
                None => break,
            },
            _ = ping.tick() => Message::Ping(Default::default()),
        };
        match tokio::time::timeout(write_timeout, sink.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(session = %id, "write failed: {e}");
                break;
            }
            Err(_) => {
                tracing::debug!(session = %id, "write timed out after {write_timeout:?}");
                break;
            }
        }
    }
    if tokio::time::timeout(write_timeout, sink.close()).await.is_err() {
        tracing::debug!(session = %id, "close timed out after {write_timeout:?}");
    }
}
