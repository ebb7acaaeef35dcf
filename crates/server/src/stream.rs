//! Streaming answer emitter.
//!
//! Drives the generation capability and serializes the ordered event
//! protocol: every fragment is forwarded immediately as a token event,
//! then exactly one sources event, then exactly one done event. Done is
//! always last, even when generation produced zero tokens or failed
//! mid-stream. A closed channel means the client went away; the emitter
//! then stops pulling fragments, which drops the generation stream and
//! releases the runtime connection.

use crate::events::StreamEvent;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use grounded_core::AppError;
use grounded_llm::{GenerationRequest, TextGenerator};
use std::sync::Arc;

/// Render a generation failure as best-effort token content so the
/// caller sees an explanation inside the stream instead of a hung
/// connection.
fn failure_token(error: &AppError) -> StreamEvent {
    StreamEvent::Token(format!("\n*Answer generation failed: {}*\n", error))
}

/// Stream a generated answer and its sources into the event channel.
///
/// The emitted sequence is `Token* Sources Done`. Returns early only
/// when the receiver is dropped (client disconnect); no failure of the
/// generation capability escapes as an error.
pub async fn emit_answer(
    generator: Arc<dyn TextGenerator>,
    request: GenerationRequest,
    sources: Vec<String>,
    mut tx: mpsc::Sender<StreamEvent>,
) {
    match generator.generate_stream(&request).await {
        Ok(mut fragments) => {
            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) => {
                        if !fragment.text.is_empty()
                            && tx.send(StreamEvent::Token(fragment.text)).await.is_err()
                        {
                            tracing::debug!("Client disconnected mid-stream, aborting generation");
                            return;
                        }
                        if fragment.done {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Generation failed mid-stream: {}", e);
                        if tx.send(failure_token(&e)).await.is_err() {
                            return;
                        }
                        break;
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!("Failed to start generation: {}", e);
            if tx.send(failure_token(&e)).await.is_err() {
                return;
            }
        }
    }

    if tx.send(StreamEvent::Sources(sources)).await.is_err() {
        return;
    }

    let _ = tx.send(StreamEvent::Done).await;
}
