// Session lifecycle: handshake, ID negotiation, and the actor that owns
// the connection's mutable state for its whole life.
//
// Per-session state (the pending-reply table, the packet id counter, the
// negotiated ID widths) is confined to a single task reachable only
// through channels, so a session can run atop a multi-threaded executor
// without any of that state needing its own lock. Two satellite tasks
// do I/O: a reader loop (folded into the actor below) and a dedicated
// writer task that owns the write half and drains an mpsc queue of
// already-encoded packets.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use tokio::io::{split, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, oneshot, watch, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::builder::HEADER_SIZE;
use crate::error::{JdwpError, JdwpResult};
use crate::ids::IdSizes;
use crate::protocol::{JDWP_HANDSHAKE, MAX_PACKET_SIZE};
use crate::reader::PacketReader;

/// Where a session sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Ready,
    Closed,
}

/// A handle to a live JDWP connection. Cheap to clone; every clone talks
/// to the same underlying actor and I/O tasks.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    next_id: Mutex<u32>,
    id_sizes: RwLock<IdSizes>,
    actor_tx: mpsc::UnboundedSender<ActorMsg>,
    state_tx: watch::Sender<SessionState>,
    state_rx: watch::Receiver<SessionState>,
    closed: Arc<Notify>,
    shutdown: CancellationToken,
}

enum ActorMsg {
    Execute { id: u32, bytes: Bytes, reply_tx: oneshot::Sender<JdwpResult<PacketReader>> },
    Cancel(u32),
    RegisterStop(Box<dyn FnOnce() + Send>),
}

impl Session {
    /// Perform the JDWP handshake over `stream`, negotiate ID widths, and
    /// spawn the tasks that keep the connection alive.
    ///
    /// `cancel`, if given, aborts the handshake/negotiation sequence
    /// itself; once `open` returns `Ok`, it has no further effect (use
    /// [`Session::close`] to tear down a live session).
    pub async fn open<S>(mut stream: S, cancel: Option<CancellationToken>) -> JdwpResult<Session>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let bootstrap = async move {
            debug!("performing JDWP handshake");
            stream.write_all(JDWP_HANDSHAKE).await?;
            stream.flush().await?;

            let mut reply = [0u8; 14];
            stream.read_exact(&mut reply).await?;
            if &reply[..] != JDWP_HANDSHAKE {
                return Err(JdwpError::Protocol("Unexpected handshake reply".to_string()));
            }
            info!("JDWP handshake complete");
            Ok(stream)
        };

        let stream = match cancel.as_ref() {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(JdwpError::Cancelled),
                result = bootstrap => result?,
            },
            None => bootstrap.await?,
        };

        let (read_half, write_half) = split(stream);

        let (actor_tx, actor_rx) = mpsc::unbounded_channel();
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (fault_tx, fault_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Created);
        let closed = Arc::new(Notify::new());
        let shutdown = CancellationToken::new();

        tokio::spawn(run_writer(write_half, write_rx, fault_tx, shutdown.clone()));
        tokio::spawn(run_actor(
            read_half,
            actor_rx,
            write_tx,
            fault_rx,
            state_tx.clone(),
            closed.clone(),
            shutdown.clone(),
        ));

        let session = Session {
            inner: Arc::new(SessionInner {
                next_id: Mutex::new(1),
                id_sizes: RwLock::new(IdSizes::new_unknown()),
                actor_tx,
                state_tx,
                state_rx,
                closed,
                shutdown,
            }),
        };

        session.negotiate_id_sizes(cancel.as_ref()).await?;
        Ok(session)
    }

    async fn negotiate_id_sizes(&self, cancel: Option<&CancellationToken>) -> JdwpResult<()> {
        use crate::commands::{command_sets, vm_commands};
        use crate::builder::CommandBuilder;

        let mut reply = self
            .execute(
                |id| CommandBuilder::new(id, command_sets::VIRTUAL_MACHINE, vm_commands::ID_SIZES).finalize(),
                cancel,
            )
            .await?;

        let field = reply.read_i32()?;
        let method = reply.read_i32()?;
        let object = reply.read_i32()?;
        let reference_type = reply.read_i32()?;
        let frame = reply.read_i32()?;
        let sizes = IdSizes::new(field, method, object, reference_type, frame)?;

        *self.inner.id_sizes.write().unwrap() = sizes;
        let _ = self.inner.state_tx.send(SessionState::Ready);
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.inner.state_rx.borrow()
    }

    /// A watch stream of lifecycle transitions, for callers that want to
    /// react to READY or CLOSED without polling.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.inner.state_rx.clone()
    }

    /// Resolves once the session has fully torn down.
    pub async fn closed(&self) {
        let notified = self.inner.closed.notified();
        if self.state() == SessionState::Closed {
            return;
        }
        notified.await;
    }

    /// Registers a callback invoked once, during teardown, after every
    /// pending request has been failed. Not invoked if the session is
    /// already CLOSED by the time this is called.
    pub fn on_stop(&self, callback: impl FnOnce() + Send + 'static) {
        let _ = self.inner.actor_tx.send(ActorMsg::RegisterStop(Box::new(callback)));
    }

    /// Idempotent. Signals the reader/writer tasks to stop, yields once
    /// so they can observe the signal, then lets them close the
    /// underlying stream (ignoring any error doing so).
    pub async fn close(&self) {
        if self.state() == SessionState::Closed {
            return;
        }
        self.inner.shutdown.cancel();
        tokio::task::yield_now().await;
    }

    pub(crate) fn id_sizes(&self) -> IdSizes {
        *self.inner.id_sizes.read().unwrap()
    }

    /// Builds and enqueues a command, then awaits its reply.
    ///
    /// `build` receives the packet id this call was assigned and must
    /// return the fully finalized wire bytes; id allocation and the
    /// handoff to the writer task happen under the same lock so that ids
    /// are always assigned in the order commands actually reach the wire.
    pub(crate) async fn execute(
        &self,
        build: impl FnOnce(u32) -> Bytes,
        cancel: Option<&CancellationToken>,
    ) -> JdwpResult<PacketReader> {
        if self.state() == SessionState::Closed {
            return Err(JdwpError::InvalidOperation("connection is closed".to_string()));
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let id = {
            let mut next_id = self.inner.next_id.lock().unwrap();
            let id = *next_id;
            *next_id = next_id.wrapping_add(1);
            let bytes = build(id);
            self.inner
                .actor_tx
                .send(ActorMsg::Execute { id, bytes, reply_tx })
                .map_err(|_| JdwpError::InvalidOperation("connection is closed".to_string()))?;
            id
        };

        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => {
                        let _ = self.inner.actor_tx.send(ActorMsg::Cancel(id));
                        Err(JdwpError::Cancelled)
                    }
                    result = reply_rx => result.unwrap_or_else(|_| {
                        Err(JdwpError::Transport("connection closed".to_string()))
                    }),
                }
            }
            None => reply_rx.await.unwrap_or_else(|_| Err(JdwpError::Transport("connection closed".to_string()))),
        }
    }
}

async fn run_writer<W>(
    mut write_half: WriteHalf<W>,
    mut write_rx: mpsc::UnboundedReceiver<Bytes>,
    fault_tx: mpsc::UnboundedSender<JdwpError>,
    shutdown: CancellationToken,
) where
    W: AsyncWrite,
{
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            maybe_bytes = write_rx.recv() => {
                match maybe_bytes {
                    Some(bytes) => {
                        if let Err(e) = write_half.write_all(&bytes).await {
                            warn!("write failed: {e}");
                            let _ = fault_tx.send(JdwpError::from(e));
                            break;
                        }
                        if let Err(e) = write_half.flush().await {
                            warn!("flush failed: {e}");
                            let _ = fault_tx.send(JdwpError::from(e));
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }
    let _ = write_half.shutdown().await;
}

#[allow(clippy::too_many_arguments)]
async fn run_actor<S>(
    mut read_half: ReadHalf<S>,
    mut actor_rx: mpsc::UnboundedReceiver<ActorMsg>,
    write_tx: mpsc::UnboundedSender<Bytes>,
    mut fault_rx: mpsc::UnboundedReceiver<JdwpError>,
    state_tx: watch::Sender<SessionState>,
    closed: Arc<Notify>,
    shutdown: CancellationToken,
) where
    S: AsyncRead,
{
    let mut pending: HashMap<u32, oneshot::Sender<JdwpResult<PacketReader>>> = HashMap::new();
    let mut stop_observers: Vec<Box<dyn FnOnce() + Send>> = Vec::new();

    let teardown_err = loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break JdwpError::Transport("connection closed".to_string()),
            msg = actor_rx.recv() => {
                match msg {
                    Some(ActorMsg::Execute { id, bytes, reply_tx }) => {
                        pending.insert(id, reply_tx);
                        if write_tx.send(bytes).is_err() {
                            if let Some(tx) = pending.remove(&id) {
                                let _ = tx.send(Err(JdwpError::Transport("writer task gone".to_string())));
                            }
                        }
                    }
                    Some(ActorMsg::Cancel(id)) => {
                        pending.remove(&id);
                    }
                    Some(ActorMsg::RegisterStop(cb)) => stop_observers.push(cb),
                    None => break JdwpError::Transport("connection closed".to_string()),
                }
            }
            fault = fault_rx.recv() => {
                match fault {
                    Some(err) => break err,
                    None => break JdwpError::Transport("connection closed".to_string()),
                }
            }
            result = read_packet(&mut read_half) => {
                match result {
                    Ok((id, error_code, payload)) => {
                        if let Some(tx) = pending.remove(&id) {
                            let outcome = if error_code == 0 {
                                Ok(PacketReader::new(payload))
                            } else {
                                Err(JdwpError::CommandFailed(error_code))
                            };
                            let _ = tx.send(outcome);
                        } else {
                            debug!("dropping packet for unknown id={id}");
                        }
                    }
                    Err(e) => break e,
                }
            }
        }
    };

    info!("session tearing down: {teardown_err}");
    let _ = state_tx.send(SessionState::Closed);
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(clone_error(&teardown_err)));
    }
    for cb in stop_observers.drain(..) {
        cb();
    }
    closed.notify_waiters();
}

fn clone_error(err: &JdwpError) -> JdwpError {
    match err {
        JdwpError::Transport(s) => JdwpError::Transport(s.clone()),
        JdwpError::Protocol(s) => JdwpError::Protocol(s.clone()),
        JdwpError::InvalidOperation(s) => JdwpError::InvalidOperation(s.clone()),
        JdwpError::InvalidArgument(s) => JdwpError::InvalidArgument(s.clone()),
        JdwpError::CommandFailed(c) => JdwpError::CommandFailed(*c),
        JdwpError::Cancelled => JdwpError::Cancelled,
    }
}

/// Reads one packet's header and payload. The 2-byte slot at header
/// offset 9 is interpreted as an error code; this crate only ever reads
/// replies off the wire (not commands), so that's always the right
/// reading.
async fn read_packet<R>(read_half: &mut R) -> JdwpResult<(u32, u16, Bytes)>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    read_half.read_exact(&mut header).await.map_err(JdwpError::from)?;

    let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if length < HEADER_SIZE {
        return Err(JdwpError::Protocol(format!("packet length {length} is shorter than the header")));
    }
    if length > MAX_PACKET_SIZE {
        return Err(JdwpError::Protocol(format!("packet length {length} exceeds the {MAX_PACKET_SIZE} byte cap")));
    }

    let id = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    let error_code = u16::from_be_bytes([header[9], header[10]]);

    let payload_len = length - HEADER_SIZE;
    let payload = if payload_len > 0 {
        let mut buf = vec![0u8; payload_len];
        read_half.read_exact(&mut buf).await.map_err(JdwpError::from)?;
        Bytes::from(buf)
    } else {
        Bytes::new()
    };

    Ok((id, error_code, payload))
}
