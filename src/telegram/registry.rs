use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::client::{self, BuiltClient};

/// A cached live client for one phone. The registry owns the handle; other
/// components borrow it through `Arc` and never outlive an eviction because
/// disposal only stops the pool, it does not invalidate in-flight clones of
/// the inner `Client`.
pub struct ClientHandle {
    pub built: BuiltClient,
    pub created_at: Instant,
    authorized: AtomicBool,
}

impl ClientHandle {
    pub fn new(built: BuiltClient, authorized: bool) -> Self {
        Self {
            built,
            created_at: Instant::now(),
            authorized: AtomicBool::new(authorized),
        }
    }

    pub fn authorized(&self) -> bool {
        self.authorized.load(Ordering::Relaxed)
    }

    pub fn set_authorized(&self, value: bool) {
        self.authorized.store(value, Ordering::Relaxed);
    }

    /// The pool runner exits when the connection is gone for good, so a
    /// finished runner task means the handle is no longer usable.
    pub fn connected(&self) -> bool {
        !self.built.pool_task.is_finished()
    }
}

/// Process-local map phone → live client handle, with per-phone
/// single-flight locks. Purely in-memory: a restart forfeits cached handles
/// and the persisted session blob is the root of trust.
#[derive(Default)]
pub struct SessionRegistry {
    handles: Mutex<HashMap<String, Arc<ClientHandle>>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single-flight lock for a phone. All auth-flow transitions and
    /// client construction for that phone serialize on this lock; different
    /// phones proceed in parallel.
    pub async fn lock_for(&self, phone: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(phone.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// A handle is served only while younger than `ttl` and still connected.
    pub async fn get_fresh(&self, phone: &str, ttl: Duration) -> Option<Arc<ClientHandle>> {
        let handles = self.handles.lock().await;
        let handle = handles.get(phone)?;
        if handle.created_at.elapsed() <= ttl && handle.connected() {
            Some(Arc::clone(handle))
        } else {
            None
        }
    }

    pub async fn insert(&self, phone: &str, handle: ClientHandle) -> Arc<ClientHandle> {
        let handle = Arc::new(handle);
        let mut handles = self.handles.lock().await;
        if let Some(old) = handles.insert(phone.to_string(), Arc::clone(&handle)) {
            client::dispose(&old.built);
        }
        handle
    }

    /// Remove and dispose the handle for a phone, if any. Idempotent.
    pub async fn evict(&self, phone: &str) {
        let removed = self.handles.lock().await.remove(phone);
        if let Some(handle) = removed {
            tracing::debug!(phone, "evicting telegram client");
            client::dispose(&handle.built);
        }
    }

    /// Sweep pass used by the cleanup loop: drop every handle past its TTL
    /// or whose connection died, with a best-effort disconnect.
    pub async fn evict_expired(&self, ttl: Duration) -> usize {
        let mut handles = self.handles.lock().await;
        let expired: Vec<String> = handles
            .iter()
            .filter(|(_, h)| h.created_at.elapsed() > ttl || !h.connected())
            .map(|(phone, _)| phone.clone())
            .collect();
        for phone in &expired {
            if let Some(handle) = handles.remove(phone) {
                tracing::debug!(phone, "ttl sweep evicting telegram client");
                client::dispose(&handle.built);
            }
        }
        expired.len()
    }

    pub async fn evict_all(&self) {
        let mut handles = self.handles.lock().await;
        for (_, handle) in handles.drain() {
            client::dispose(&handle.built);
        }
    }

    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }
}
