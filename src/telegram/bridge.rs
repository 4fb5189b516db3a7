use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use super::engine::TelegramEngine;
use super::{ChatInfo, SendCodeOutcome, VerifyOutcome};
use crate::error::{OrchestratorError, Result};

/// Pending-command high-water mark; overflow is reported as `SystemBusy`.
pub const QUEUE_DEPTH: usize = 100;
/// Outer wall-clock budget for one bridged operation.
const OUTER_TIMEOUT: Duration = Duration::from_secs(30);

thread_local! {
    // Set on the bridge's worker thread so a nested submit fails fast
    // instead of deadlocking on its own queue.
    static ON_BRIDGE_THREAD: Cell<bool> = const { Cell::new(false) };
}

/// One queued Telegram operation. Same shape as the request messages the
/// client library itself queues to its sender: payload plus a oneshot reply.
enum Command {
    SendCode {
        phone: String,
        force_new: bool,
        reply: oneshot::Sender<Result<SendCodeOutcome>>,
    },
    VerifyCode {
        phone: String,
        code: String,
        password: Option<String>,
        reply: oneshot::Sender<Result<VerifyOutcome>>,
    },
    Reactivate {
        phone: String,
        reply: oneshot::Sender<Result<bool>>,
    },
    CachedCode {
        phone: String,
        reply: oneshot::Sender<(bool, Option<String>)>,
    },
    ClearCachedCode {
        phone: String,
        reply: oneshot::Sender<bool>,
    },
    GetChats {
        phone: String,
        reply: oneshot::Sender<Result<Vec<ChatInfo>>>,
    },
    Disconnect {
        phone: String,
        reply: oneshot::Sender<()>,
    },
    Sweep {
        reply: oneshot::Sender<usize>,
    },
}

/// Synchronous-side handle: HTTP handlers call these methods and never see
/// the scheduler underneath. All Telegram clients live on one dedicated
/// single-threaded runtime owned by the bridge worker.
#[derive(Clone)]
pub struct TelegramBridge {
    tx: mpsc::Sender<Command>,
}

impl TelegramBridge {
    /// Spawn the bridge worker thread and hand back the submit side.
    pub fn start(engine: TelegramEngine) -> Self {
        let (tx, mut rx) = mpsc::channel::<Command>(QUEUE_DEPTH);
        let engine = Arc::new(engine);

        std::thread::Builder::new()
            .name("telegram-bridge".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        tracing::error!(error = %e, "telegram bridge runtime failed to start");
                        return;
                    }
                };

                ON_BRIDGE_THREAD.with(|flag| flag.set(true));

                runtime.block_on(async move {
                    // Commands run as independent tasks: per-phone locks
                    // serialize one phone, other phones interleave freely on
                    // this one scheduler.
                    while let Some(command) = rx.recv().await {
                        let engine = Arc::clone(&engine);
                        tokio::spawn(dispatch(engine, command));
                    }
                    engine.shutdown().await;
                });

                tracing::info!("telegram bridge stopped");
            })
            .expect("failed to spawn telegram bridge thread");

        Self { tx }
    }

    fn submit(&self, command: Command) -> Result<()> {
        if ON_BRIDGE_THREAD.with(|flag| flag.get()) {
            return Err(OrchestratorError::Internal(
                "nested telegram bridge call".into(),
            ));
        }
        self.tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => OrchestratorError::SystemBusy,
            mpsc::error::TrySendError::Closed(_) => {
                OrchestratorError::Internal("telegram bridge is down".into())
            }
        })
    }

    /// Await a reply under the outer timeout. On expiry the affected phone's
    /// client is evicted (best effort) so no handle is left half-open.
    async fn wait<T>(&self, rx: oneshot::Receiver<T>, phone: Option<&str>) -> Result<T> {
        match timeout(OUTER_TIMEOUT, rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(OrchestratorError::Internal(
                "telegram bridge dropped the reply".into(),
            )),
            Err(_) => {
                if let Some(phone) = phone {
                    let (reply, _discard) = oneshot::channel();
                    let _ = self.submit(Command::Disconnect {
                        phone: phone.to_string(),
                        reply,
                    });
                }
                Err(OrchestratorError::Timeout)
            }
        }
    }

    pub async fn send_code(&self, phone: &str, force_new: bool) -> Result<SendCodeOutcome> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::SendCode {
            phone: phone.to_string(),
            force_new,
            reply,
        })?;
        self.wait(rx, Some(phone)).await?
    }

    pub async fn verify_code(
        &self,
        phone: &str,
        code: &str,
        password: Option<String>,
    ) -> Result<VerifyOutcome> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::VerifyCode {
            phone: phone.to_string(),
            code: code.to_string(),
            password,
            reply,
        })?;
        self.wait(rx, Some(phone)).await?
    }

    pub async fn reactivate(&self, phone: &str) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Reactivate {
            phone: phone.to_string(),
            reply,
        })?;
        self.wait(rx, Some(phone)).await?
    }

    pub async fn cached_code(&self, phone: &str) -> Result<(bool, Option<String>)> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::CachedCode {
            phone: phone.to_string(),
            reply,
        })?;
        self.wait(rx, None).await
    }

    pub async fn clear_cached_code(&self, phone: &str) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::ClearCachedCode {
            phone: phone.to_string(),
            reply,
        })?;
        self.wait(rx, None).await
    }

    pub async fn get_chats(&self, phone: &str) -> Result<Vec<ChatInfo>> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::GetChats {
            phone: phone.to_string(),
            reply,
        })?;
        self.wait(rx, Some(phone)).await?
    }

    pub async fn disconnect(&self, phone: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Disconnect {
            phone: phone.to_string(),
            reply,
        })?;
        self.wait(rx, None).await
    }

    pub async fn sweep(&self) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Sweep { reply })?;
        self.wait(rx, None).await
    }

    #[cfg(test)]
    fn with_sender(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }
}

#[cfg(test)]
fn mark_bridge_thread(value: bool) {
    ON_BRIDGE_THREAD.with(|flag| flag.set(value));
}

async fn dispatch(engine: Arc<TelegramEngine>, command: Command) {
    // Replies may be dropped when the HTTP side timed out; that is fine.
    match command {
        Command::SendCode {
            phone,
            force_new,
            reply,
        } => {
            let _ = reply.send(engine.send_code(&phone, force_new).await);
        }
        Command::VerifyCode {
            phone,
            code,
            password,
            reply,
        } => {
            let _ = reply.send(engine.verify_code(&phone, &code, password.as_deref()).await);
        }
        Command::Reactivate { phone, reply } => {
            let _ = reply.send(engine.reactivate(&phone).await);
        }
        Command::CachedCode { phone, reply } => {
            let _ = reply.send(engine.cached_code(&phone).await);
        }
        Command::ClearCachedCode { phone, reply } => {
            let _ = reply.send(engine.clear_cached_code(&phone).await);
        }
        Command::GetChats { phone, reply } => {
            let _ = reply.send(engine.get_chats(&phone).await);
        }
        Command::Disconnect { phone, reply } => {
            engine.disconnect(&phone).await;
            let _ = reply.send(());
        }
        Command::Sweep { reply } => {
            let _ = reply.send(engine.sweep().await);
        }
    }
}
