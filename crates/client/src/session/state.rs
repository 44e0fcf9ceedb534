//! Shared session state.
//!
//! Exactly one logical session exists per client; both the session manager
//! and the request pipeline hold the same `Arc<SharedSession>`. All writes
//! replace whole fields, persist through the store, and publish a snapshot
//! on the watch channel.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};

use super::store::SessionStore;
use super::{Session, SessionSnapshot};

pub(crate) struct SharedSession {
    current: RwLock<Session>,
    store: Arc<dyn SessionStore>,
    /// Serializes persist-and-notify so records reach the store (and
    /// subscribers) in mutation order.
    write_gate: Mutex<()>,
    changes: watch::Sender<SessionSnapshot>,
}

impl SharedSession {
    /// Rehydrate the session from the store. A corrupt or unreadable record
    /// starts the session anonymous rather than failing construction.
    pub(crate) fn load(store: Arc<dyn SessionStore>) -> Arc<Self> {
        let session = match store.load() {
            Ok(Some(session)) => session,
            Ok(None) => Session::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load persisted session, starting anonymous");
                Session::default()
            }
        };
        let (changes, _) = watch::channel(session.snapshot());
        Arc::new(Self {
            current: RwLock::new(session),
            store,
            write_gate: Mutex::new(()),
            changes,
        })
    }

    pub(crate) async fn access_token(&self) -> Option<String> {
        self.current.read().await.access_token.clone()
    }

    pub(crate) async fn refresh_token(&self) -> Option<String> {
        self.current.read().await.refresh_token.clone()
    }

    pub(crate) async fn snapshot(&self) -> SessionSnapshot {
        self.current.read().await.snapshot()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.changes.subscribe()
    }

    /// Apply a mutation, persist the result, and notify subscribers.
    ///
    /// The store runs on the blocking pool after the write lock is released,
    /// so readers never wait on file I/O. Persistence is best-effort: a
    /// failing store never blocks the in-memory transition, it only logs.
    pub(crate) async fn mutate(&self, apply: impl FnOnce(&mut Session)) {
        let _gate = self.write_gate.lock().await;

        let (record, snapshot) = {
            let mut session = self.current.write().await;
            apply(&mut session);
            (session.clone(), session.snapshot())
        };

        let store = Arc::clone(&self.store);
        let persisted = tokio::task::spawn_blocking(move || {
            if record.is_anonymous() {
                store.clear()
            } else {
                store.save(&record)
            }
        })
        .await;
        match persisted {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "failed to persist session"),
            Err(e) => tracing::warn!(error = %e, "session persistence task failed"),
        }

        self.changes.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    /// Clear every field. Idempotent: clearing an already-cleared session is
    /// a no-op that notifies nobody.
    pub(crate) async fn clear(&self) {
        self.mutate(|session| *session = Session::default()).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    #[tokio::test]
    async fn test_mutations_persist_latest_record() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let state = SharedSession::load(Arc::clone(&store));

        state
            .mutate(|s| s.access_token = Some("T1".to_string()))
            .await;
        state
            .mutate(|s| s.refresh_token = Some("R1".to_string()))
            .await;

        let record = store.load().unwrap().unwrap();
        assert_eq!(record.access_token.as_deref(), Some("T1"));
        assert_eq!(record.refresh_token.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_clear_removes_persisted_record() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let state = SharedSession::load(Arc::clone(&store));

        state
            .mutate(|s| s.access_token = Some("T1".to_string()))
            .await;
        state.clear().await;

        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reads_proceed_during_mutation() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let state = SharedSession::load(Arc::clone(&store));
        state
            .mutate(|s| s.access_token = Some("T1".to_string()))
            .await;

        let reader = Arc::clone(&state);
        let writer = Arc::clone(&state);
        let (read, ()) = tokio::join!(
            async move { reader.access_token().await },
            async move {
                writer
                    .mutate(|s| s.refresh_token = Some("R1".to_string()))
                    .await;
            }
        );
        assert!(read.is_some());
    }
}
