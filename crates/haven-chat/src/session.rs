//! The streaming chat session.
//!
//! One session owns the transcript and runs one turn at a time: it pushes the
//! user turn, opens the response stream, accumulates fragments into a buffer,
//! publishes render snapshots on a cadence, and commits the buffer to the
//! transcript exactly once when the stream closes, whether it closed
//! naturally, by cancellation, or by a mid-stream failure.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::backend::ChatBackend;
use crate::error::{Error, Result};
use crate::events::ChatEvent;
use crate::handle::SessionHandle;
use crate::prompts::PERSONALIZED_PROMPT;
use crate::transcript::Transcript;
use haven_api::Turn;

/// How often the in-flight buffer is published for rendering
pub const RENDER_TICK: Duration = Duration::from_millis(500);

/// Minimum transcript length before a personalized query is allowed
pub const PERSONALIZED_MIN_TURNS: usize = 10;

/// A chat conversation against one backend
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    transcript: Transcript,
    event_tx: broadcast::Sender<ChatEvent>,
    handle: SessionHandle,
    render_tick: Duration,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            backend,
            transcript: Transcript::new(),
            event_tx,
            handle: SessionHandle::new(),
            render_tick: RENDER_TICK,
        }
    }

    /// Override the render cadence (tests use a short tick)
    pub fn with_render_tick(mut self, tick: Duration) -> Self {
        self.render_tick = tick;
        self
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    /// Get a cloneable handle for stopping the stream from external code.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether a response is currently streaming
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Drop the whole conversation history
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Submit a query and stream the reply to completion.
    ///
    /// Returns once the turn is committed (or failed before the stream
    /// opened). Progress arrives on the event channel.
    pub async fn ask(&mut self, prompt: impl Into<String>) -> Result<()> {
        self.run_turn(prompt.into(), false).await
    }

    /// Submit the fixed personalized query against the personalized endpoint.
    ///
    /// Only allowed once the conversation has enough history for the backend
    /// to personalize from.
    pub async fn ask_personalized(&mut self) -> Result<()> {
        if self.transcript.len() < PERSONALIZED_MIN_TURNS {
            return Err(Error::HistoryTooShort {
                have: self.transcript.len(),
                need: PERSONALIZED_MIN_TURNS,
            });
        }
        self.run_turn(PERSONALIZED_PROMPT.to_string(), true).await
    }

    async fn run_turn(&mut self, prompt: String, personalized: bool) -> Result<()> {
        if self.handle.is_running() {
            return Err(Error::Busy);
        }
        let cancel = self.handle.begin_turn();
        let result = self.stream_turn(prompt, personalized, cancel).await;
        self.handle.finish_turn();
        result
    }

    async fn stream_turn(
        &mut self,
        prompt: String,
        personalized: bool,
        cancel: tokio_util::sync::CancellationToken,
    ) -> Result<()> {
        self.transcript.push(Turn::user(prompt));

        let mut stream = match self
            .backend
            .stream_chat(self.transcript.turns(), personalized)
            .await
        {
            Ok(stream) => stream,
            Err(err) => {
                // Nothing streamed, so nothing commits. The user turn stays
                // in the transcript and a resubmission retries it.
                tracing::warn!(error = %err, "chat request failed");
                let _ = self.event_tx.send(ChatEvent::Error {
                    message: err.user_message(),
                });
                return Err(err.into());
            }
        };

        let _ = self.event_tx.send(ChatEvent::TurnStart);

        let mut buffer = String::new();
        let mut tick = tokio::time::interval(self.render_tick);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(chars = buffer.len(), "stream cancelled");
                    break;
                }
                fragment = stream.next() => {
                    match fragment {
                        Some(Ok(text)) => {
                            buffer.push_str(&text);
                            if cancel.is_cancelled() {
                                break;
                            }
                        }
                        Some(Err(err)) => {
                            // Fail soft: keep what decoded, surface the rest.
                            tracing::warn!(error = %err, "stream failed mid-response");
                            let _ = self.event_tx.send(ChatEvent::Error {
                                message: err.user_message(),
                            });
                            break;
                        }
                        None => break,
                    }
                }
                _ = tick.tick() => {
                    let _ = self.event_tx.send(ChatEvent::TurnUpdate {
                        content: buffer.clone(),
                    });
                }
            }
        }

        // Single commit point. Ordered after the last buffer mutation, so a
        // stream that closed before the first tick still renders in full.
        let _ = self.event_tx.send(ChatEvent::TurnUpdate {
            content: buffer.clone(),
        });
        let turn = Turn::assistant(buffer);
        self.transcript.push(turn.clone());
        let _ = self.event_tx.send(ChatEvent::TurnEnd { turn });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use haven_api::TextFragmentStream;
    use parking_lot::Mutex;

    /// Scripted backend: each call pops the next canned response.
    struct MockBackend {
        responses: Mutex<Vec<MockResponse>>,
    }

    enum MockResponse {
        Fragments(Vec<&'static str>),
        /// Yields the fragments, then never closes
        Hang(Vec<&'static str>),
        SubmitError,
        MidStreamError(Vec<&'static str>),
    }

    impl MockBackend {
        fn new(responses: Vec<MockResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn stream_chat(
            &self,
            _history: &[Turn],
            _personalized: bool,
        ) -> haven_api::Result<TextFragmentStream> {
            let response = self.responses.lock().remove(0);
            match response {
                MockResponse::SubmitError => Err(haven_api::Error::server(500, "backend down")),
                MockResponse::Fragments(parts) => Ok(Box::pin(async_stream::stream! {
                    for part in parts {
                        yield Ok(part.to_string());
                    }
                })),
                MockResponse::Hang(parts) => Ok(Box::pin(async_stream::stream! {
                    for part in parts {
                        yield Ok(part.to_string());
                    }
                    futures::future::pending::<()>().await;
                })),
                MockResponse::MidStreamError(parts) => Ok(Box::pin(async_stream::stream! {
                    for part in parts {
                        yield Ok(part.to_string());
                    }
                    yield Err(haven_api::Error::InvalidUtf8 { offset: 7 });
                })),
            }
        }
    }

    fn drain(rx: &mut broadcast::Receiver<ChatEvent>) -> Vec<ChatEvent> {
        let mut events = vec![];
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_fragments_accumulate_in_order() {
        let backend = MockBackend::new(vec![MockResponse::Fragments(vec![
            "Hel", "lo, wo", "rld",
        ])]);
        let mut session = ChatSession::new(backend);
        let mut rx = session.subscribe();

        session.ask("hi").await.unwrap();

        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], Turn::user("hi"));
        assert_eq!(turns[1], Turn::assistant("Hello, world"));

        let events = drain(&mut rx);
        assert!(matches!(events.first(), Some(ChatEvent::TurnStart)));
        assert!(matches!(
            events.last(),
            Some(ChatEvent::TurnEnd { turn }) if turn.content == "Hello, world"
        ));
        // The final snapshot carries the full text even though the stream
        // closed well inside the first render tick.
        assert!(events.iter().any(
            |e| matches!(e, ChatEvent::TurnUpdate { content } if content == "Hello, world")
        ));
    }

    #[tokio::test]
    async fn test_cancel_commits_partial_text_exactly_once() {
        let backend = MockBackend::new(vec![MockResponse::Hang(vec!["Hel"])]);
        let mut session = ChatSession::new(backend);
        let handle = session.handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.stop();
        });

        session.ask("hi").await.unwrap();

        let assistant: Vec<_> = session
            .transcript()
            .turns()
            .iter()
            .filter(|t| t.role == haven_api::Role::Assistant)
            .collect();
        assert_eq!(assistant.len(), 1);
        assert_eq!(assistant[0].content, "Hel");
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_submit_failure_appends_no_assistant_turn() {
        let backend = MockBackend::new(vec![MockResponse::SubmitError]);
        let mut session = ChatSession::new(backend);
        let mut rx = session.subscribe();

        let err = session.ask("hi").await.unwrap_err();
        assert!(matches!(err, Error::Api(_)));

        // User turn stays so a resubmission retries it.
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().turns()[0].role, haven_api::Role::User);

        let events = drain(&mut rx);
        assert!(matches!(
            events.as_slice(),
            [ChatEvent::Error { message }] if message == "backend down"
        ));
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_mid_stream_decode_failure_commits_decoded_prefix() {
        let backend = MockBackend::new(vec![MockResponse::MidStreamError(vec!["partial"])]);
        let mut session = ChatSession::new(backend);
        let mut rx = session.subscribe();

        session.ask("hi").await.unwrap();

        assert_eq!(session.transcript().last().unwrap().content, "partial");
        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(e, ChatEvent::Error { .. })));
        assert!(matches!(events.last(), Some(ChatEvent::TurnEnd { .. })));
    }

    #[tokio::test]
    async fn test_personalized_gate_requires_history() {
        let backend = MockBackend::new(vec![]);
        let mut session = ChatSession::new(backend);
        let err = session.ask_personalized().await.unwrap_err();
        assert!(matches!(
            err,
            Error::HistoryTooShort { have: 0, need: PERSONALIZED_MIN_TURNS }
        ));
    }

    #[tokio::test]
    async fn test_personalized_submits_fixed_prompt() {
        let mut responses = vec![];
        for _ in 0..5 {
            responses.push(MockResponse::Fragments(vec!["ok"]));
        }
        responses.push(MockResponse::Fragments(vec!["picked one"]));
        let backend = MockBackend::new(responses);
        let mut session = ChatSession::new(backend);

        for i in 0..5 {
            session.ask(format!("query {i}")).await.unwrap();
        }
        assert_eq!(session.transcript().len(), 10);

        session.ask_personalized().await.unwrap();
        let turns = session.transcript().turns();
        assert_eq!(turns[10].content, PERSONALIZED_PROMPT);
        assert_eq!(turns[11].content, "picked one");
    }

    #[tokio::test]
    async fn test_render_tick_publishes_while_streaming() {
        let backend = MockBackend::new(vec![MockResponse::Hang(vec!["early"])]);
        let mut session =
            ChatSession::new(backend).with_render_tick(Duration::from_millis(10));
        let mut rx = session.subscribe();
        let handle = session.handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            handle.stop();
        });
        session.ask("hi").await.unwrap();

        let snapshots = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, ChatEvent::TurnUpdate { .. }))
            .count();
        // Several periodic snapshots before the final one.
        assert!(snapshots > 2, "expected periodic snapshots, got {snapshots}");
    }
}
