use std::path::Path;

use grammers_client::types::Message;
use grammers_client::{Client, Update, UpdatesConfiguration};
use grammers_session::defs::PeerRef;
use regex::Regex;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{
    bundle_dir_from_env, connect_from_bundle, load_bundle, message_chat_id, sender_info,
    ElaborationSpec, WorkerConfig,
};
use crate::db::listeners::{self, NewSavedMessage};
use crate::error::{OrchestratorError, Result};
use crate::telegram::client::BuiltClient;

#[derive(Debug, Deserialize)]
struct ExtractorConfig {
    rules: Vec<RuleSpec>,
}

#[derive(Debug, Deserialize)]
struct RuleSpec {
    name: String,
    pattern: String,
}

#[derive(Debug, Deserialize)]
struct RedirectConfig {
    target_chat_id: i64,
}

/// Compiled extractor: ordered named regexes.
struct Extractor {
    elaboration_id: i32,
    rules: Vec<(String, Regex)>,
}

struct Redirect {
    elaboration_id: i32,
    target_chat_id: i64,
    target: Option<PeerRef>,
}

/// Entry point of the listener worker: save every message of the source
/// chat, run the extractors, forward through the redirect if one exists.
pub async fn run() -> Result<()> {
    let dir = bundle_dir_from_env();
    run_with_bundle(&dir).await
}

async fn run_with_bundle(dir: &Path) -> Result<()> {
    let bundle = load_bundle(dir)?;
    let config = bundle.config.clone();
    tracing::info!(
        source_chat = config.chat_id,
        listener = config.session_db_id,
        elaborations = config.elaborations.len(),
        "listener worker starting"
    );

    let (extractors, mut redirect) = compile_elaborations(&config.elaborations)?;

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

    // Dialog pass warms the peer cache and resolves the redirect target.
    let mut dialogs = client.iter_dialogs();
    while let Some(dialog) = dialogs
        .next()
        .await
        .map_err(|e| crate::telegram::errors::classify_invocation(&e))?
    {
        if let Some(redirect) = redirect.as_mut() {
            let peer = dialog.peer();
            if peer.id().bot_api_dialog_id() == redirect.target_chat_id {
                redirect.target = Some(PeerRef::from(peer.clone()));
            }
        }
    }
    if let Some(r) = &redirect {
        if r.target.is_none() {
            tracing::error!(
                target_chat = r.target_chat_id,
                "redirect target not among dialogs, forwarding disabled"
            );
        }
    }

    let mut stream = client.stream_updates(
        updates_rx,
        UpdatesConfiguration {
            catch_up: false,
            ..Default::default()
        },
    );

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(|e| OrchestratorError::Internal(format!("signal handler: {e}")))?;

    tracing::info!(source_chat = config.chat_id, "listener worker listening");
    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("listener worker received SIGTERM, shutting down");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("listener worker interrupted, shutting down");
                break;
            }
            _ = &mut pool_task => {
                pool_handle.quit();
                return Err(OrchestratorError::TransportDisconnected);
            }
            update = stream.next() => {
                match update {
                    Ok(Update::NewMessage(message)) if !message.outgoing() => {
                        if message_chat_id(&message) == Some(config.chat_id) {
                            handle_message(&pool, &client, &config, &extractors, &redirect, &message).await;
                        }
                    }
                    Ok(_) => {}
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

fn compile_elaborations(
    specs: &[ElaborationSpec],
) -> Result<(Vec<Extractor>, Option<Redirect>)> {
    let mut extractors = Vec::new();
    let mut redirect = None;

    // Specs arrive already ordered by priority; at most one redirect is
    // enforced upstream, the worker just takes the first.
    for spec in specs {
        match spec.kind.as_str() {
            "extractor" => {
                let parsed: ExtractorConfig = serde_json::from_value(spec.config.clone())
                    .map_err(|e| {
                        OrchestratorError::Internal(format!(
                            "extractor '{}' config invalid: {e}",
                            spec.name
                        ))
                    })?;
                let mut rules = Vec::new();
                for rule in parsed.rules {
                    let regex = Regex::new(&rule.pattern).map_err(|e| {
                        OrchestratorError::Internal(format!(
                            "extractor rule '{}' invalid: {e}",
                            rule.name
                        ))
                    })?;
                    rules.push((rule.name, regex));
                }
                extractors.push(Extractor {
                    elaboration_id: spec.id,
                    rules,
                });
            }
            "redirect" if redirect.is_none() => {
                let parsed: RedirectConfig =
                    serde_json::from_value(spec.config.clone()).map_err(|e| {
                        OrchestratorError::Internal(format!(
                            "redirect '{}' config invalid: {e}",
                            spec.name
                        ))
                    })?;
                redirect = Some(Redirect {
                    elaboration_id: spec.id,
                    target_chat_id: parsed.target_chat_id,
                    target: None,
                });
            }
            other => {
                tracing::warn!(kind = other, name = %spec.name, "skipping unknown elaboration");
            }
        }
    }

    Ok((extractors, redirect))
}

async fn handle_message(
    pool: &PgPool,
    client: &Client,
    config: &WorkerConfig,
    extractors: &[Extractor],
    redirect: &Option<Redirect>,
    message: &Message,
) {
    let (sender_id, sender_name, _sender_username) = sender_info(message);
    let text = message.text();

    let inserted = listeners::save_message(
        pool,
        NewSavedMessage {
            listener_id: config.session_db_id,
            message_id: message.id(),
            text: (!text.is_empty()).then_some(text),
            data: None,
            sender_id,
            sender_name: sender_name.as_deref(),
            message_date: Some(message.date()),
        },
    )
    .await;

    match inserted {
        Ok(true) => {
            if let Err(e) = listeners::bump_saved_counter(pool, config.session_db_id).await {
                tracing::warn!(error = %e, "saved counter update failed");
            }
        }
        // Replayed message: elaborations already ran for it.
        Ok(false) => return,
        Err(e) => {
            tracing::error!(message_id = message.id(), error = %e, "saved message insert failed");
            return;
        }
    }

    for extractor in extractors.iter() {
        let values = apply_rules(&extractor.rules, text);
        let mut failed = false;
        for (rule_name, value, occurrence) in &values {
            match listeners::insert_extracted_value(
                pool,
                extractor.elaboration_id,
                message.id(),
                rule_name,
                value,
                *occurrence,
            )
            .await
            {
                Ok(_) => {}
                Err(e) => {
                    failed = true;
                    tracing::error!(rule = %rule_name, error = %e, "extracted value insert failed");
                }
            }
        }
        let bookkeeping = if failed {
            listeners::record_elaboration_error(pool, extractor.elaboration_id).await
        } else {
            listeners::bump_elaboration_counter(pool, extractor.elaboration_id).await
        };
        if let Err(e) = bookkeeping {
            tracing::warn!(error = %e, "elaboration counter update failed");
        }
    }

    if let Some(redirect) = redirect {
        let Some(target) = &redirect.target else {
            return;
        };
        let source = match message.peer() {
            Ok(peer) => PeerRef::from(peer),
            Err(e) => {
                tracing::error!(error = ?e, "cannot forward message with unresolved peer");
                return;
            }
        };
        match client
            .forward_messages(target.clone(), &[message.id()], source)
            .await
        {
            Ok(_) => {
                if let Err(e) =
                    listeners::bump_elaboration_counter(pool, redirect.elaboration_id).await
                {
                    tracing::warn!(error = %e, "redirect counter update failed");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "forward failed");
                let _ = listeners::record_elaboration_error(pool, redirect.elaboration_id).await;
            }
        }
    }
}

/// One `(rule, value, occurrence_index)` per regex match. The first capture
/// group wins when present, otherwise the whole match.
fn apply_rules(rules: &[(String, Regex)], text: &str) -> Vec<(String, String, i32)> {
    let mut out = Vec::new();
    for (name, regex) in rules {
        for (index, captures) in regex.captures_iter(text).enumerate() {
            let value = captures
                .get(1)
                .or_else(|| captures.get(0))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            out.push((name.clone(), value, index as i32));
        }
    }
    out
}
