use std::collections::HashMap;
use std::sync::Arc;

use shared::types::ProductEvent;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identity of one live connection. Nothing about it is persisted.
pub type ListenerId = Uuid;

/// Serialized event frame, shared by every listener it is queued for.
pub type Frame = Arc<str>;

/// Receiving half handed to a connection task by [`NotificationHub::subscribe`].
#[derive(Debug)]
pub struct Listener {
    pub id: ListenerId,
    pub rx: mpsc::Receiver<Frame>,
}

// ---------------------------------------------------------------------------
// NotificationHub
// ---------------------------------------------------------------------------

/// Set of currently connected listeners, each with its own bounded queue.
///
/// `broadcast` never awaits a listener: a full queue drops the frame for
/// that listener only, and a closed queue gets the listener reaped.
#[derive(Debug)]
pub struct NotificationHub {
    /// listener id → outbound queue
    listeners: RwLock<HashMap<ListenerId, mpsc::Sender<Frame>>>,
    buffer: usize,
}

impl NotificationHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
        }
    }

    /// Create a queue for a new connection and register it.
    pub async fn subscribe(&self) -> Listener {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();
        self.register(id, tx).await;
        Listener { id, rx }
    }

    /// Add a listener to the active set. Registering the same id again
    /// keeps a single entry; returns false in that case.
    pub async fn register(&self, id: ListenerId, tx: mpsc::Sender<Frame>) -> bool {
        let mut listeners = self.listeners.write().await;
        let added = listeners.insert(id, tx).is_none();
        if added {
            info!("Listener {} registered ({} active)", id, listeners.len());
        }
        added
    }

    /// Remove a listener. Unknown or already-removed ids are a no-op.
    pub async fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().await;
        let removed = listeners.remove(&id).is_some();
        if removed {
            info!("Listener {} unregistered ({} active)", id, listeners.len());
        }
        removed
    }

    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Queue the event for every open listener; returns how many accepted it.
    pub async fn broadcast(&self, event: &ProductEvent) -> usize {
        let frame: Frame = Arc::from(event.to_json());
        let mut delivered = 0;
        let mut closed = Vec::new();

        {
            let listeners = self.listeners.read().await;
            for (id, tx) in listeners.iter() {
                match tx.try_send(frame.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!("Listener {} is not keeping up, dropped {} event", id, event.kind());
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut listeners = self.listeners.write().await;
            for id in &closed {
                listeners.remove(id);
            }
            info!(
                "Reaped {} closed listeners ({} remaining)",
                closed.len(),
                listeners.len()
            );
        }

        debug!("Broadcast {} event to {} listeners", event.kind(), delivered);
        delivered
    }
}
