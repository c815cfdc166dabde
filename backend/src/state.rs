use crate::config::ServerConfig;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct AppState {
    /// Immutable for the life of the process.
    pub config: ServerConfig,

    /// Fired once on Ctrl-C; every live session closes its socket.
    pub shutdown_tx: broadcast::Sender<()>,
    stopping: AtomicBool,

    next_session: AtomicU64,
    connected: AtomicUsize,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            shutdown_tx: broadcast::channel(1).0,
            stopping: AtomicBool::new(false),
            next_session: AtomicU64::new(1),
            connected: AtomicUsize::new(0),
        }
    }

    /// Register a client. The returned guard unregisters it when dropped.
    pub fn open_session(self: &Arc<Self>) -> SessionGuard {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        self.connected.fetch_add(1, Ordering::Relaxed);
        SessionGuard {
            id,
            state: Arc::clone(self),
        }
    }

    pub fn connected_clients(&self) -> usize {
        self.connected.load(Ordering::Relaxed)
    }

    /// True once `shutdown` has been called. Covers sessions that subscribe
    /// to `shutdown_tx` after the broadcast went out.
    pub fn is_shutting_down(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        // Set before the broadcast: a session subscribes first and checks the
        // flag second, so it sees one or the other.
        self.stopping.store(true, Ordering::SeqCst);
        // No receivers just means no client is connected.
        let _ = self.shutdown_tx.send(());
    }
}

pub struct SessionGuard {
    id: u64,
    state: Arc<AppState>,
}

impl SessionGuard {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.connected.fetch_sub(1, Ordering::Relaxed);
    }
}
