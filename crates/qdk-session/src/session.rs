use std::fmt;
use std::sync::Arc;

use qdk_catalog::CatalogReader;
use qdk_config::PricingPolicy;
use qdk_lifecycle::{apply_mutation, MutationError};
use qdk_reconcile::VisibleSet;
use qdk_schemas::{Actor, Quote, QuotePatch};
use qdk_store::{ChangeEvent, ChangeFeed, ChangeKind, QuoteStore, ScopeFilter, StoreError};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SessionError {
    /// The lifecycle engine refused the mutation; the write was blocked.
    Mutation(MutationError),
    /// The store failed the read or write backing a command.
    Store(StoreError),
    /// The session task is gone.
    Closed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Mutation(e) => write!(f, "{e}"),
            SessionError::Store(e) => write!(f, "{e}"),
            SessionError::Closed => write!(f, "viewer session closed"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Mutation(e) => Some(e),
            SessionError::Store(e) => Some(e),
            SessionError::Closed => None,
        }
    }
}

impl From<MutationError> for SessionError {
    fn from(e: MutationError) -> Self {
        SessionError::Mutation(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

enum Command {
    Mutate {
        id: Uuid,
        patch: QuotePatch,
        reply: oneshot::Sender<Result<Quote, SessionError>>,
    },
    VisibleQuotes {
        reply: oneshot::Sender<Vec<Quote>>,
    },
    Contains {
        id: Uuid,
        reply: oneshot::Sender<bool>,
    },
    Rescope {
        actor: Actor,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Session handle
// ---------------------------------------------------------------------------

/// Cheap-to-clone front door to a running session task.  All methods
/// round-trip through the session loop, so callers observe the same
/// serialized view the loop maintains.
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Validate, persist and optimistically apply a patch.
    pub async fn mutate(&self, id: Uuid, patch: QuotePatch) -> Result<Quote, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Mutate { id, patch, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// The currently visible quotes, in stable id order.
    pub async fn visible_quotes(&self) -> Result<Vec<Quote>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::VisibleQuotes { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn contains(&self, id: Uuid) -> Result<bool, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Contains { id, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Swap the viewing actor (role/city/assignment scope may all change)
    /// and re-seed from a fresh scoped snapshot.
    pub async fn rescope(&self, actor: Actor) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Rescope { actor, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(Command::Shutdown).await;
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The state owned by one session task.
pub struct ViewerSession {
    actor: Actor,
    store: Arc<dyn QuoteStore>,
    catalog: Arc<dyn CatalogReader>,
    policy: PricingPolicy,
    set: VisibleSet,
    feed_rx: broadcast::Receiver<ChangeEvent>,
    cmd_rx: mpsc::Receiver<Command>,
}

impl ViewerSession {
    /// Subscribe, fetch the scoped snapshot, seed the set, and spawn the
    /// loop task.  Subscription happens **before** the snapshot query so
    /// no commit can fall between them; anything double-covered is
    /// discarded by the watermark.
    pub async fn start(
        actor: Actor,
        store: Arc<dyn QuoteStore>,
        catalog: Arc<dyn CatalogReader>,
        feed: &dyn ChangeFeed,
        policy: PricingPolicy,
    ) -> Result<SessionHandle, SessionError> {
        let feed_rx = feed.subscribe();
        let snapshot = store.query_snapshot(&ScopeFilter::for_actor(&actor)).await?;

        let mut set = VisibleSet::new();
        set.seed(&actor, snapshot);
        info!(
            actor = %actor.id,
            role = ?actor.role,
            quotes = set.len(),
            "viewer session started"
        );

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let session = ViewerSession {
            actor,
            store,
            catalog,
            policy,
            set,
            feed_rx,
            cmd_rx,
        };
        tokio::spawn(session.run());
        Ok(SessionHandle { cmd_tx })
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        None | Some(Command::Shutdown) => {
                            debug!(actor = %self.actor.id, "viewer session shutting down");
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd).await,
                    }
                }
                event = self.feed_rx.recv() => {
                    match event {
                        Ok(event) => self.handle_event(event).await,
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "change feed lagged; resyncing from snapshot");
                            self.resync().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!(actor = %self.actor.id, "change feed closed; ending session");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Mutate { id, patch, reply } => {
                let _ = reply.send(self.mutate(id, patch).await);
            }
            Command::VisibleQuotes { reply } => {
                let _ = reply.send(self.set.iter().cloned().collect());
            }
            Command::Contains { id, reply } => {
                let _ = reply.send(self.set.contains(&id));
            }
            Command::Rescope { actor, reply } => {
                let _ = reply.send(self.rescope(actor).await);
            }
            Command::Shutdown => {}
        }
    }

    /// Validate → write → optimistic local apply.  The later feed echo of
    /// this commit carries the same version and lands as a discarded
    /// duplicate.
    async fn mutate(&mut self, id: Uuid, patch: QuotePatch) -> Result<Quote, SessionError> {
        let current = match self.set.get(&id) {
            Some(q) => q.clone(),
            None => self
                .store
                .read(id)
                .await?
                .ok_or(SessionError::Store(StoreError::NotFound(id)))?,
        };

        let next = apply_mutation(
            &current,
            &patch,
            &self.actor,
            self.catalog.as_ref(),
            &self.policy,
        )?;
        let committed = self.store.write(id, next).await?;

        let outcome = self
            .set
            .apply(&self.actor, &ChangeEvent::update(committed.clone()));
        debug!(quote = %id, version = committed.version, ?outcome, "optimistic apply");
        Ok(committed)
    }

    async fn handle_event(&mut self, event: ChangeEvent) {
        // A feed may publish bare notifications; resolve the record before
        // reconciling.  A failed refetch drops the event — the next event
        // for the record self-corrects the set, so no retry queue exists.
        let event = match (event.kind, event.snapshot.is_some()) {
            (ChangeKind::Delete, _) | (_, true) => event,
            (_, false) => match self.store.read(event.quote_id).await {
                Ok(Some(q)) => ChangeEvent {
                    kind: event.kind,
                    quote_id: event.quote_id,
                    // The refetched record is at least as new as the event.
                    version: q.version,
                    snapshot: Some(q),
                },
                Ok(None) => {
                    debug!(quote = %event.quote_id, "record gone before refetch; dropping event");
                    return;
                }
                Err(e) => {
                    warn!(
                        quote = %event.quote_id,
                        error = %e,
                        "dropping event after failed refetch; next event will self-correct"
                    );
                    return;
                }
            },
        };

        let outcome = self.set.apply(&self.actor, &event);
        if outcome.is_stale() {
            debug!(quote = %event.quote_id, version = event.version, "duplicate delivery discarded");
        } else if outcome.changed_set() {
            debug!(quote = %event.quote_id, version = event.version, ?outcome, "event reconciled");
        }
    }

    /// Re-seed from a fresh scoped snapshot (feed lag or actor change).
    async fn resync(&mut self) {
        match self
            .store
            .query_snapshot(&ScopeFilter::for_actor(&self.actor))
            .await
        {
            Ok(snapshot) => {
                self.set.seed(&self.actor, snapshot);
                info!(quotes = self.set.len(), "resynced from snapshot");
            }
            Err(e) => {
                warn!(error = %e, "resync failed; keeping current set until next event");
            }
        }
    }

    async fn rescope(&mut self, actor: Actor) -> Result<(), SessionError> {
        let snapshot = self
            .store
            .query_snapshot(&ScopeFilter::for_actor(&actor))
            .await?;
        info!(
            from = %self.actor.id,
            to = %actor.id,
            role = ?actor.role,
            "session rescoped"
        );
        self.actor = actor;
        self.set.seed(&self.actor, snapshot);
        Ok(())
    }
}
