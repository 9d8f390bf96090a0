//! TCP listener adapter.
//!
//! Binds the command port and hands every accepted connection to its own
//! [`Session`] thread.  All sessions share one [`AppService`], whose mutex
//! is the single serialization point for register access.
//!
//! ## Connection model
//!
//! 1. `bind()` opens a non-blocking listener on the configured address.
//! 2. `run()` polls `accept()` every [`ACCEPT_POLL`] and checks the
//!    shutdown flag between polls.
//! 3. At `max_sessions` active sessions the loop stops accepting; new
//!    clients wait in the kernel backlog.  `max_sessions = 1` therefore
//!    serves one client at a time, draining it before the next.
//! 4. An authorized `exit` raises the shutdown flag when
//!    `exit_stops_server` is set, and `run()` returns.

use core::fmt;
use core::time::Duration;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use log::{error, info, warn};

use crate::adapters::log_sink::LogEventSink;
use crate::app::ports::CredentialStore;
use crate::app::service::AppService;
use crate::config::ServerConfig;
use crate::session::{Session, SessionEnd};

/// Interval between accept polls.
pub const ACCEPT_POLL: Duration = Duration::from_millis(50);

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

/// Errors that stop the listener itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerError {
    /// The listen address could not be bound.
    Bind(ErrorKind),
    /// Listener socket setup or query failed.
    Io(ErrorKind),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(kind) => write!(f, "bind failed: {}", kind),
            Self::Io(kind) => write!(f, "listener I/O error: {}", kind),
        }
    }
}

impl std::error::Error for ServerError {}

// ───────────────────────────────────────────────────────────────
// Shutdown handle
// ───────────────────────────────────────────────────────────────

/// Cloneable flag that stops [`TcpServer::run`].
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Decrements the active-session count when the session thread ends.
struct ActiveSession(Arc<AtomicUsize>);

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// ───────────────────────────────────────────────────────────────
// TcpServer
// ───────────────────────────────────────────────────────────────

/// Multi-session TCP front end for an [`AppService`].
pub struct TcpServer<C> {
    listener: TcpListener,
    service: Arc<AppService<C>>,
    config: ServerConfig,
    shutdown: ShutdownHandle,
    active: Arc<AtomicUsize>,
    next_session: u64,
}

impl<C> TcpServer<C>
where
    C: CredentialStore + Send + Sync + 'static,
{
    /// Bind the listener.  Port `0` lets the OS pick; see [`local_addr`](Self::local_addr).
    pub fn bind(config: ServerConfig, service: Arc<AppService<C>>) -> Result<Self, ServerError> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(addr).map_err(|e| ServerError::Bind(e.kind()))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| ServerError::Io(e.kind()))?;
        info!("bind done on {}", addr);

        Ok(Self {
            listener,
            service,
            config,
            shutdown: ShutdownHandle::default(),
            active: Arc::new(AtomicUsize::new(0)),
            next_session: 1,
        })
    }

    /// The actual bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(|e| ServerError::Io(e.kind()))
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Sessions currently running.
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Accept connections until shut down.
    pub fn run(&mut self) -> Result<(), ServerError> {
        info!(
            "Listening on {} (max {} session(s))",
            self.local_addr()?,
            self.config.max_sessions
        );

        while !self.shutdown.is_shutdown() {
            if self.active_sessions() >= self.config.max_sessions {
                thread::sleep(ACCEPT_POLL);
                continue;
            }
            match self.listener.accept() {
                Ok((stream, peer)) => self.spawn_session(stream, peer),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL);
                }
            }
        }

        info!("listener stopped");
        Ok(())
    }

    fn spawn_session(&mut self, stream: TcpStream, peer: SocketAddr) {
        let id = self.next_session;
        self.next_session += 1;

        if let Err(e) = self.prepare_stream(&stream) {
            warn!("[{}] dropping {}: socket setup failed: {}", id, peer, e);
            return;
        }
        info!("[{}] connect from {}", id, peer);

        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveSession(Arc::clone(&self.active));
        let service = Arc::clone(&self.service);
        let shutdown = self.shutdown.clone();
        let max_line_len = self.config.max_line_len;
        let exit_stops_server = self.config.exit_stops_server;

        let spawned = thread::Builder::new()
            .name(format!("session-{id}"))
            .spawn(move || {
                let _guard = guard;
                let mut stream = stream;
                let mut session = Session::new(id, &service, LogEventSink::new(id), max_line_len);
                let end = session.run(&mut stream);
                if end == SessionEnd::Exit && exit_stops_server {
                    info!("[{}] exit requested, shutting down listener", id);
                    shutdown.shutdown();
                }
            });

        // On failure the closure (and its guard) is dropped, restoring the count.
        if let Err(e) = spawned {
            error!("[{}] cannot spawn session thread: {}", id, e);
        }
    }

    fn prepare_stream(&self, stream: &TcpStream) -> std::io::Result<()> {
        // Some platforms hand back accepted sockets in non-blocking mode.
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(self.config.read_timeout_secs.map(Duration::from_secs))?;
        Ok(())
    }
}
