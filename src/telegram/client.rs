use std::sync::Arc;

use grammers_client::client::updates::UpdatesLike;
use grammers_client::Client;
use grammers_mtsender::{SenderPool, SenderPoolHandle};
#[allow(deprecated)]
use grammers_session::storages::TlSession;
use grammers_session::Session as _;
use tokio::sync::{mpsc::UnboundedReceiver, Mutex};
use tokio::task::JoinHandle;

use crate::error::{OrchestratorError, Result};

/// A constructed client plus the sender-pool plumbing that keeps it alive.
/// `Client::new` only wires the client logically; the pool runner task does
/// the actual I/O and must keep running for as long as the client is used.
pub struct BuiltClient {
    pub client: Client,
    #[allow(deprecated)]
    pub session: Arc<TlSession>,
    pub pool_handle: SenderPoolHandle,
    pub pool_task: JoinHandle<()>,
    pub updates: Arc<Mutex<UnboundedReceiver<UpdatesLike>>>,
}

#[allow(deprecated)]
pub fn build_client(session: Arc<TlSession>, api_id: i32) -> BuiltClient {
    let pool = SenderPool::new(Arc::clone(&session), api_id);
    let client = Client::new(&pool);

    let SenderPool {
        runner,
        handle,
        updates,
    } = pool;

    let pool_task = tokio::spawn(runner.run());

    BuiltClient {
        client,
        session,
        pool_handle: handle,
        pool_task,
        updates: Arc::new(Mutex::new(updates)),
    }
}

/// Serialize the in-memory session to the opaque blob persisted (wrapped)
/// in `users.telegram_session`.
#[allow(deprecated)]
pub fn save_session(session: &TlSession) -> Vec<u8> {
    session.save()
}

/// Rebuild the in-memory session from a previously saved blob.
#[allow(deprecated)]
pub fn load_session(blob: &[u8]) -> Result<TlSession> {
    TlSession::load(blob)
        .map_err(|e| OrchestratorError::Internal(format!("session blob unreadable: {e}")))
}

/// Stop the pool and drop the connection. Idempotent; failures are ignored
/// since the handle is discarded right after.
pub fn dispose(built: &BuiltClient) {
    built.pool_handle.quit();
    built.pool_task.abort();
    built.client.disconnect();
}
