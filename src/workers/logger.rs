use std::path::Path;

use grammers_client::{Update, UpdatesConfiguration};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{
    bundle_dir_from_env, classify_media, connect_from_bundle, load_bundle, message_chat_id,
    sender_info, WorkerConfig,
};
use crate::db::messages::{self, NewMessageLog};
use crate::error::{OrchestratorError, Result};
use crate::telegram::client::BuiltClient;

/// Entry point of the logging worker: capture every message of one chat
/// into `message_logs` until the container is stopped.
pub async fn run() -> Result<()> {
    let dir = bundle_dir_from_env();
    run_with_bundle(&dir).await
}

async fn run_with_bundle(dir: &Path) -> Result<()> {
    let bundle = load_bundle(dir)?;
    let config = bundle.config.clone();
    tracing::info!(
        chat_id = config.chat_id,
        session = config.session_db_id,
        "logger worker starting"
    );

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_dsn)
        .await?;

    let built = connect_from_bundle(&bundle).await?;
    let BuiltClient {
        client,
        session: _,
        pool_handle,
        mut pool_task,
        updates,
    } = built;

    let updates_rx = std::sync::Arc::try_unwrap(updates)
        .map_err(|_| OrchestratorError::Internal("updates receiver is shared".into()))?
        .into_inner();

    // Warm the peer cache so updates resolve their peers.
    let mut dialogs = client.iter_dialogs();
    while let Some(_dialog) = dialogs
        .next()
        .await
        .map_err(|e| crate::telegram::errors::classify_invocation(&e))?
    {}

    let mut stream = client.stream_updates(
        updates_rx,
        UpdatesConfiguration {
            catch_up: false,
            ..Default::default()
        },
    );

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(|e| OrchestratorError::Internal(format!("signal handler: {e}")))?;

    tracing::info!(chat_id = config.chat_id, "logger worker listening");
    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("logger worker received SIGTERM, shutting down");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("logger worker interrupted, shutting down");
                break;
            }
            _ = &mut pool_task => {
                pool_handle.quit();
                return Err(OrchestratorError::TransportDisconnected);
            }
            update = stream.next() => {
                match update {
                    Ok(update) => handle_update(&pool, &config, update).await,
                    Err(e) => {
                        tracing::error!(error = %e, "update stream error");
                        continue;
                    }
                }
            }
        }
    }

    pool_handle.quit();
    pool_task.abort();
    client.disconnect();
    Ok(())
}

async fn handle_update(pool: &PgPool, config: &WorkerConfig, update: Update) {
    let Update::NewMessage(message) = update else {
        return;
    };
    if message.outgoing() {
        return;
    }
    if message_chat_id(&message) != Some(config.chat_id) {
        return;
    }

    let (message_type, media_file_id) = classify_media(&message);
    let (sender_id, sender_name, sender_username) = sender_info(&message);
    let text = message.text();

    let inserted = messages::insert(
        pool,
        NewMessageLog {
            user_id: config.user_id,
            chat_id: config.chat_id,
            chat_title: config.chat_title.as_deref(),
            chat_username: config.chat_username.as_deref(),
            chat_type: config.chat_type.as_deref(),
            message_id: message.id(),
            sender_id,
            sender_name: sender_name.as_deref(),
            sender_username: sender_username.as_deref(),
            message_text: (!text.is_empty()).then_some(text),
            message_type,
            media_file_id: media_file_id.as_deref(),
            message_date: Some(message.date()),
            logging_session_id: config.session_db_id,
        },
    )
    .await;

    match inserted {
        Ok(true) => {
            if let Err(e) = messages::bump_logged_counter(pool, config.session_db_id).await {
                tracing::warn!(error = %e, "counter update failed");
            }
            tracing::debug!(message_id = message.id(), "message logged");
        }
        // Replay of an already captured message; nothing to do.
        Ok(false) => {}
        Err(e) => {
            tracing::error!(message_id = message.id(), error = %e, "message insert failed");
        }
    }
}
