use std::sync::Arc;

use shared::types::{
    AddOrAccumulate, EditRecord, Product, ProductEvent, RecordScan, Remove, SetStock,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::CommandError;
use crate::handlers::hub::NotificationHub;
use crate::inventory::registry;
use crate::store::JsonFileStore;

/// Result of a scan: the record as it now stands, and whether it was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub product: Product,
    pub is_new: bool,
}

/// Runs each command end to end against the store.
///
/// Mutations hold `write_lock` from load to broadcast, so no two commands
/// interleave their read-modify-write on the document and listeners see
/// events in commit order. A failed save is never broadcast.
///
/// Each mutation runs on its own task. Dropping the caller's future does
/// not stop a command halfway between its save and its broadcast.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    store: JsonFileStore,
    hub: Arc<NotificationHub>,
    write_lock: Mutex<()>,
}

impl CommandProcessor {
    pub fn new(store: JsonFileStore, hub: Arc<NotificationHub>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                hub,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.inner.hub
    }

    /// Current list. Unlike mutations, a read failure is surfaced here.
    /// Reads queue behind in-flight mutations and see their result.
    pub async fn list(&self) -> Result<Vec<Product>, CommandError> {
        let _guard = self.inner.write_lock.lock().await;
        Ok(self.inner.store.load().await?)
    }

    pub async fn add_or_accumulate(
        &self,
        cmd: AddOrAccumulate,
    ) -> Result<Vec<Product>, CommandError> {
        self.commit("add-product", move |current| {
            let next = registry::upsert_by_sum(current, &cmd.id, &cmd.name, cmd.stock);
            let event = ProductEvent::Updated {
                products: next.clone(),
            };
            Ok((next.clone(), event, next))
        })
        .await
    }

    pub async fn set_stock(&self, cmd: SetStock) -> Result<Vec<Product>, CommandError> {
        self.commit("update-stock", move |current| {
            let next = registry::set_stock(current, &cmd.id, cmd.stock)?;
            let event = ProductEvent::Updated {
                products: next.clone(),
            };
            Ok((next.clone(), event, next))
        })
        .await
    }

    /// Returns the edited record together with the full list.
    pub async fn edit_record(
        &self,
        cmd: EditRecord,
    ) -> Result<(Product, Vec<Product>), CommandError> {
        self.commit("edit-product", move |current| {
            let next = registry::edit_record(current, &cmd.id, &cmd.name, cmd.stock)?;
            let edited = next
                .iter()
                .find(|p| p.id == cmd.id)
                .cloned()
                .ok_or_else(|| CommandError::NotFound(cmd.id.clone()))?;
            let event = ProductEvent::Updated {
                products: next.clone(),
            };
            Ok((next.clone(), event, (edited, next)))
        })
        .await
    }

    pub async fn remove(&self, cmd: Remove) -> Result<Vec<Product>, CommandError> {
        self.commit("delete-product", move |current| {
            let next = registry::remove(current, &cmd.id)?;
            let event = ProductEvent::Deleted {
                product_id: cmd.id.clone(),
                products: next.clone(),
            };
            Ok((next.clone(), event, next))
        })
        .await
    }

    pub async fn record_scan(&self, cmd: RecordScan) -> Result<ScanOutcome, CommandError> {
        self.commit("save-scan", move |current| {
            let (next, product, is_new) =
                registry::record_scan(current, &cmd.id, cmd.name.as_deref())?;
            let event = ProductEvent::Scanned {
                product: product.clone(),
            };
            Ok((next, event, ScanOutcome { product, is_new }))
        })
        .await
    }

    async fn commit<T, F>(&self, command: &'static str, apply: F) -> Result<T, CommandError>
    where
        F: FnOnce(&[Product]) -> Result<(Vec<Product>, ProductEvent, T), CommandError>
            + Send
            + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        let task = tokio::spawn(async move { inner.commit(command, apply).await });
        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!("{} interrupted: {}", command, e);
                Err(CommandError::Interrupted(command))
            }
        }
    }
}

impl Inner {
    // -----------------------------------------------------------------------
    // load → apply → save → broadcast
    // -----------------------------------------------------------------------

    async fn commit<T, F>(&self, command: &'static str, apply: F) -> Result<T, CommandError>
    where
        F: FnOnce(&[Product]) -> Result<(Vec<Product>, ProductEvent, T), CommandError>,
    {
        let _guard = self.write_lock.lock().await;
        debug!("Processing {} command", command);

        let current = self.load_or_empty().await;

        let (next, event, outcome) = apply(&current).inspect_err(|e| {
            debug!("{} rejected: {}", command, e);
        })?;

        if let Err(e) = self.store.save(&next).await {
            error!("{} not committed, save failed: {}", command, e);
            return Err(e.into());
        }

        let delivered = self.hub.broadcast(&event).await;
        info!(
            "{} committed ({} products, {} event to {} listeners)",
            command,
            next.len(),
            event.kind(),
            delivered
        );

        Ok(outcome)
    }

    /// Mutations keep serving when the document cannot be read.
    async fn load_or_empty(&self) -> Vec<Product> {
        match self.store.load().await {
            Ok(products) => products,
            Err(e) => {
                error!("Error loading products: {}", e);
                warn!("Continuing with an empty product list");
                Vec::new()
            }
        }
    }
}
