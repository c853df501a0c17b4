//! The chat session engine.
//!
//! One [`ChatSession`] owns everything a single visitor conversation needs:
//! the gateway, the active configuration, the transcript, the delivery
//! scheduler, the usage accountant, and the speech synthesizer. A send runs
//! one complete exchange: history capture, gateway call, split decision,
//! staggered delivery. Gateway failures never propagate to the caller; the
//! visitor sees the fixed error message and the session stays usable.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use mostrador_config::ChatConfig;
use mostrador_context::build_instruction;
use mostrador_core::{ChatRequest, Gateway, GatewayError, Message, SessionError, Transcript};
use mostrador_delivery::{
    DeliveryEvent, DeliveryScheduler, NullSpeech, SpeechSynthesizer, split_reply,
    strip_emphasis,
};
use mostrador_usage::{UsageAccountant, UsageStats, format_mxn, format_tokens};

use crate::calendar::calendar_tool;

/// What the model is asked when the proactive assistant opens the
/// conversation. No user message is appended for it.
pub const GREETING_PROMPT: &str = "Saluda brevemente al visitante y ofrécele \
    tu ayuda como asistente del negocio.";

/// Delivery channel depth. A reply produces at most two chunks, so the
/// channel never fills in practice.
const EVENT_BUFFER: usize = 8;

/// One chunk handed to the caller, already appended to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredChunk {
    pub text: String,
    /// Whether this chunk completes the exchange.
    pub last: bool,
}

/// A single visitor conversation.
pub struct ChatSession {
    gateway: Arc<dyn Gateway>,
    config: ChatConfig,
    transcript: Transcript,
    scheduler: DeliveryScheduler,
    events: mpsc::Receiver<DeliveryEvent>,
    accountant: UsageAccountant,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl ChatSession {
    pub fn new(gateway: Arc<dyn Gateway>, config: ChatConfig) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            gateway,
            config,
            transcript: Transcript::new(),
            scheduler: DeliveryScheduler::new(tx),
            events: rx,
            accountant: UsageAccountant::new(),
            speech: Arc::new(NullSpeech::new()),
        }
    }

    /// Use the given synthesizer for voice output.
    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = speech;
        self
    }

    /// Run one exchange for a visitor message.
    ///
    /// The message is appended to the transcript; the history sent to the
    /// gateway is the transcript as it stood before the append. Rejected
    /// with [`SessionError::Busy`] while a previous exchange is in flight.
    pub async fn send(&mut self, content: impl Into<String>) -> Result<(), SessionError> {
        let content = content.into();
        self.scheduler.begin_exchange()?;

        let history = self.transcript.messages.clone();
        self.transcript.push(Message::user(content.clone()));
        self.run_exchange(content, history).await;
        Ok(())
    }

    /// Open the conversation proactively, if the configuration asks for it.
    ///
    /// The greeting prompt is sent as the exchange message but never
    /// appended to the transcript; only the assistant's reply appears.
    pub async fn greet(&mut self) -> Result<(), SessionError> {
        if !self.config.proactive_assistant {
            debug!("Proactive assistant disabled, skipping greeting");
            return Ok(());
        }
        self.scheduler.begin_exchange()?;

        let history = self.transcript.messages.clone();
        self.run_exchange(GREETING_PROMPT.to_string(), history).await;
        Ok(())
    }

    async fn run_exchange(&mut self, new_message: String, history: Vec<Message>) {
        let request = ChatRequest {
            new_message,
            history,
            instruction: build_instruction(&self.config),
            model: self.config.model,
            max_output_tokens: self.config.max_tokens,
            tools: if self.config.google_calendar_integration {
                vec![calendar_tool()]
            } else {
                Vec::new()
            },
        };

        match self.gateway.complete(request).await {
            Ok(reply) => {
                self.accountant.record(self.config.model, reply.usage);
                self.scheduler.deliver(split_reply(&reply.text)).await;
            }
            Err(e) => {
                warn!(error = %e, "Gateway call failed");
                self.scheduler.fail().await;
            }
        }
    }

    /// Receive the next delivered chunk, speak it when speech is enabled,
    /// and append it to the transcript as an assistant message.
    ///
    /// `None` means the session has been torn down.
    pub async fn next_chunk(&mut self) -> Option<DeliveredChunk> {
        let event = self.events.recv().await?;

        if self.config.enable_speech {
            self.speech.speak(
                &strip_emphasis(&event.text),
                self.config.speech_voice.as_deref(),
            );
        }

        self.transcript.push(Message::assistant(event.text.clone()));
        Some(DeliveredChunk {
            text: event.text,
            last: event.last,
        })
    }

    /// Wipe the conversation: cancel any pending chunk, drop queued events,
    /// clear the transcript, and zero the usage totals.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        while self.events.try_recv().is_ok() {}
        self.transcript.clear();
        self.accountant.reset();
    }

    /// Replace the active configuration. Takes effect on the next exchange.
    pub fn update_config(&mut self, config: ChatConfig) {
        self.config = config;
    }

    /// Rewrite a knowledge-base block through the gateway.
    pub async fn enhance(&self, text: &str, label: &str) -> Result<String, GatewayError> {
        self.gateway.enhance(text, label).await
    }

    /// True while an exchange is in flight or a staggered chunk is pending.
    pub fn is_busy(&self) -> bool {
        self.scheduler.is_busy()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn stats(&self) -> &UsageStats {
        self.accountant.stats()
    }

    /// The usage footer line, e.g.
    /// `Último: 150 tokens ($0.00126) | Total Sesión: 150 tokens ($0.00126)`.
    pub fn usage_summary(&self) -> String {
        let stats = self.accountant.stats();
        format!(
            "Último: {} tokens ({}) | Total Sesión: {} tokens ({})",
            format_tokens(stats.last_exchange_tokens),
            format_mxn(stats.last_exchange_cost),
            format_tokens(stats.total_session_tokens),
            format_mxn(stats.total_session_cost),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use mostrador_core::{ChatReply, Role, TokenCounts};
    use mostrador_delivery::GATEWAY_ERROR_MESSAGE;

    struct StubGateway {
        reply: ChatReply,
        fail: bool,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl StubGateway {
        fn with_text(text: &str) -> Self {
            Self {
                reply: ChatReply {
                    text: text.into(),
                    usage: None,
                },
                fail: false,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn with_usage(text: &str, prompt: u32, total: u32) -> Self {
            let mut stub = Self::with_text(text);
            stub.reply.usage = Some(TokenCounts {
                prompt_tokens: prompt,
                total_tokens: total,
            });
            stub
        }

        fn failing() -> Self {
            let mut stub = Self::with_text("");
            stub.fail = true;
            stub
        }

        fn last_request(&self) -> Option<ChatRequest> {
            self.requests.lock().unwrap().last().cloned()
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Gateway for StubGateway {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, request: ChatRequest) -> Result<ChatReply, GatewayError> {
            self.requests.lock().unwrap().push(request);
            if self.fail {
                return Err(GatewayError::Network("connection refused".into()));
            }
            Ok(self.reply.clone())
        }
    }

    fn session_with(stub: Arc<StubGateway>, config: ChatConfig) -> ChatSession {
        ChatSession::new(stub, config)
    }

    fn long_reply() -> (String, String, String) {
        let first = format!("{}.", "a".repeat(199));
        let second = "b".repeat(150);
        let full = format!("{first} {second}");
        (full, first, second)
    }

    #[tokio::test]
    async fn send_delivers_reply_and_builds_transcript() {
        let stub = Arc::new(StubGateway::with_text("¡Hola! ¿En qué puedo ayudarte?"));
        let mut session = session_with(stub.clone(), ChatConfig::default());

        session.send("Hola").await.unwrap();
        let chunk = session.next_chunk().await.unwrap();

        assert_eq!(chunk.text, "¡Hola! ¿En qué puedo ayudarte?");
        assert!(chunk.last);
        assert!(!session.is_busy());

        let roles: Vec<Role> =
            session.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn history_excludes_the_message_being_sent() {
        let stub = Arc::new(StubGateway::with_text("Claro."));
        let mut session = session_with(stub.clone(), ChatConfig::default());

        session.send("Primera pregunta").await.unwrap();
        session.next_chunk().await.unwrap();

        session.send("Segunda pregunta").await.unwrap();
        session.next_chunk().await.unwrap();

        let request = stub.last_request().unwrap();
        assert_eq!(request.new_message, "Segunda pregunta");
        let contents: Vec<&str> =
            request.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Primera pregunta", "Claro."]);
    }

    #[tokio::test]
    async fn gateway_failure_shows_fixed_message_and_skips_usage() {
        let stub = Arc::new(StubGateway::failing());
        let mut session = session_with(stub, ChatConfig::default());

        session.send("Hola").await.unwrap();
        let chunk = session.next_chunk().await.unwrap();

        assert_eq!(chunk.text, GATEWAY_ERROR_MESSAGE);
        assert!(chunk.last);
        assert!(!session.is_busy());
        assert_eq!(*session.stats(), UsageStats::default());
        // the error message still lands in the transcript
        assert_eq!(session.transcript().last().unwrap().role, Role::Assistant);
    }

    #[tokio::test(start_paused = true)]
    async fn long_reply_arrives_as_two_chunks() {
        let (full, first, second) = long_reply();
        let stub = Arc::new(StubGateway::with_text(&full));
        let mut session = session_with(stub, ChatConfig::default());

        session.send("Cuéntame todo").await.unwrap();

        let chunk = session.next_chunk().await.unwrap();
        assert_eq!(chunk.text, first);
        assert!(!chunk.last);
        assert!(session.is_busy());

        let chunk = session.next_chunk().await.unwrap();
        assert_eq!(chunk.text, second);
        assert!(chunk.last);

        tokio::task::yield_now().await;
        assert!(!session.is_busy());
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn send_rejected_while_second_chunk_pending() {
        let (full, ..) = long_reply();
        let stub = Arc::new(StubGateway::with_text(&full));
        let mut session = session_with(stub, ChatConfig::default());

        session.send("Hola").await.unwrap();
        session.next_chunk().await.unwrap();

        assert!(matches!(
            session.send("¿Sigues ahí?").await,
            Err(SessionError::Busy)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_chunk_and_wipes_state() {
        let (full, first, _) = long_reply();
        let stub = Arc::new(StubGateway::with_usage(&full, 100, 150));
        let mut session = session_with(stub, ChatConfig::default());

        session.send("Hola").await.unwrap();
        session.next_chunk().await.unwrap();

        session.reset();
        assert!(!session.is_busy());
        assert!(session.transcript().is_empty());
        assert_eq!(*session.stats(), UsageStats::default());

        // the aborted second chunk never surfaces; the next exchange's
        // first chunk is the next thing received
        session.send("Hola otra vez").await.unwrap();
        let chunk = session.next_chunk().await.unwrap();
        assert_eq!(chunk.text, first);
        assert!(!chunk.last);
    }

    #[tokio::test]
    async fn update_config_takes_effect_on_next_exchange() {
        let stub = Arc::new(StubGateway::with_text("ok"));
        let mut session = session_with(stub.clone(), ChatConfig::default());

        session.send("Hola").await.unwrap();
        session.next_chunk().await.unwrap();
        assert!(stub.last_request().unwrap().tools.is_empty());

        let mut updated = ChatConfig::default();
        updated.google_calendar_integration = true;
        session.update_config(updated);

        session.send("¿Tengo eventos?").await.unwrap();
        session.next_chunk().await.unwrap();
        assert_eq!(stub.last_request().unwrap().tools.len(), 1);
    }

    #[tokio::test]
    async fn greeting_runs_without_a_user_message() {
        let stub = Arc::new(StubGateway::with_text("¡Bienvenido a Innovatech!"));
        let mut config = ChatConfig::default();
        config.proactive_assistant = true;
        let mut session = session_with(stub.clone(), config);

        session.greet().await.unwrap();
        let chunk = session.next_chunk().await.unwrap();

        assert_eq!(chunk.text, "¡Bienvenido a Innovatech!");
        let request = stub.last_request().unwrap();
        assert_eq!(request.new_message, GREETING_PROMPT);
        assert!(request.history.is_empty());
        // only the assistant's greeting appears in the transcript
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().last().unwrap().role, Role::Assistant);
    }

    #[tokio::test]
    async fn greeting_disabled_is_a_noop() {
        let stub = Arc::new(StubGateway::with_text("no debería llamarse"));
        let mut config = ChatConfig::default();
        config.proactive_assistant = false;
        let mut session = session_with(stub.clone(), config);

        session.greet().await.unwrap();
        assert_eq!(stub.request_count(), 0);
        assert!(!session.is_busy());
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn calendar_tool_follows_the_toggle() {
        let stub = Arc::new(StubGateway::with_text("ok"));
        let mut config = ChatConfig::default();
        config.google_calendar_integration = true;
        let mut session = session_with(stub.clone(), config);

        session.send("¿Tengo eventos mañana?").await.unwrap();
        session.next_chunk().await.unwrap();

        let request = stub.last_request().unwrap();
        assert_eq!(request.tools.len(), 1);
        assert_eq!(request.tools[0].name, "get_calendar_events");

        let stub = Arc::new(StubGateway::with_text("ok"));
        let mut config = ChatConfig::default();
        config.google_calendar_integration = false;
        let mut session = session_with(stub.clone(), config);

        session.send("Hola").await.unwrap();
        session.next_chunk().await.unwrap();
        assert!(stub.last_request().unwrap().tools.is_empty());
    }

    #[tokio::test]
    async fn request_carries_instruction_and_token_cap() {
        let stub = Arc::new(StubGateway::with_text("ok"));
        let config = ChatConfig::default();
        let max_tokens = config.max_tokens;
        let mut session = session_with(stub.clone(), config);

        session.send("Hola").await.unwrap();
        session.next_chunk().await.unwrap();

        let request = stub.last_request().unwrap();
        assert_eq!(request.max_output_tokens, max_tokens);
        assert!(request.instruction.contains("Responde en español."));
    }

    struct RecordingSpeech {
        spoken: Mutex<Vec<(String, Option<String>)>>,
    }

    impl RecordingSpeech {
        fn new() -> Self {
            Self {
                spoken: Mutex::new(Vec::new()),
            }
        }
    }

    impl SpeechSynthesizer for RecordingSpeech {
        fn is_supported(&self) -> bool {
            true
        }

        fn speak(&self, text: &str, voice: Option<&str>) {
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_string(), voice.map(String::from)));
        }
    }

    #[tokio::test]
    async fn speech_speaks_chunks_without_emphasis_markers() {
        let stub = Arc::new(StubGateway::with_text("**Optimizador Pro** es genial"));
        let speech = Arc::new(RecordingSpeech::new());
        let mut config = ChatConfig::default();
        config.enable_speech = true;
        config.speech_voice = Some("Paulina".into());
        let mut session =
            session_with(stub, config).with_speech(speech.clone());

        session.send("¿Qué venden?").await.unwrap();
        session.next_chunk().await.unwrap();

        let spoken = speech.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].0, "Optimizador Pro es genial");
        assert_eq!(spoken[0].1.as_deref(), Some("Paulina"));
    }

    #[tokio::test]
    async fn speech_disabled_stays_silent() {
        let stub = Arc::new(StubGateway::with_text("Hola"));
        let speech = Arc::new(RecordingSpeech::new());
        let mut config = ChatConfig::default();
        config.enable_speech = false;
        let mut session =
            session_with(stub, config).with_speech(speech.clone());

        session.send("Hola").await.unwrap();
        session.next_chunk().await.unwrap();

        assert!(speech.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn enhance_failure_leaves_session_untouched() {
        let stub = Arc::new(StubGateway::with_text("ok"));
        let session = session_with(stub, ChatConfig::default());

        // the stub does not implement enhancement, so the default trait
        // impl reports the capability as unavailable
        let result = session.enhance("texto original", "Productos y Servicios").await;
        assert!(matches!(result, Err(GatewayError::NotConfigured(_))));
        assert!(session.transcript().is_empty());
        assert_eq!(*session.stats(), UsageStats::default());
    }

    #[tokio::test]
    async fn usage_summary_prices_the_exchange() {
        let stub = Arc::new(StubGateway::with_usage("ok", 100, 150));
        let mut session = session_with(stub, ChatConfig::default());

        session.send("Hola").await.unwrap();
        session.next_chunk().await.unwrap();

        assert_eq!(
            session.usage_summary(),
            "Último: 150 tokens ($0.00126) | Total Sesión: 150 tokens ($0.00126)"
        );
    }
}
