//! Delivery cadence — emits reply chunks on the schedule a human would
//! send them, and keeps the single "awaiting" flag consistent.
//!
//! State machine: `Idle → Awaiting → { delivered single | first chunk
//! delivered, second pending } → Idle`. The delivered states are
//! transient; [`DeliveryState`] only names the observable ones. At most
//! one exchange is in flight at a time: [`DeliveryScheduler::begin_exchange`]
//! rejects a send while the scheduler is busy.
//!
//! The staggered second chunk runs as an abortable task whose handle the
//! scheduler keeps, so a session reset cancels it instead of leaving an
//! orphaned timer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use mostrador_core::SessionError;

use crate::splitter::SplitDecision;

/// Pause between the first and second chunk of a staggered reply.
pub const STAGGER_DELAY: Duration = Duration::from_millis(1500);

/// What the visitor sees when the model call fails.
pub const GATEWAY_ERROR_MESSAGE: &str = "Lo siento, ocurrió un error al \
    procesar tu solicitud. Por favor, revisa la configuración o intenta de \
    nuevo más tarde.";

/// Observable scheduler states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// No exchange in flight; input enabled.
    Idle,
    /// A gateway request is in flight.
    Awaiting,
    /// First chunk delivered; the second is pending on the stagger timer.
    PendingSecond,
}

/// A chunk ready to be appended to the transcript as an assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryEvent {
    pub text: String,
    /// Whether this chunk completes the exchange.
    pub last: bool,
}

/// Emits reply chunks and tracks the awaiting flag for one session.
#[derive(Debug)]
pub struct DeliveryScheduler {
    state: Arc<Mutex<DeliveryState>>,
    events: mpsc::Sender<DeliveryEvent>,
    stagger: Option<JoinHandle<()>>,
    stagger_delay: Duration,
}

impl DeliveryScheduler {
    pub fn new(events: mpsc::Sender<DeliveryEvent>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeliveryState::Idle)),
            events,
            stagger: None,
            stagger_delay: STAGGER_DELAY,
        }
    }

    pub fn state(&self) -> DeliveryState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// True while an exchange is in flight or a staggered chunk is pending.
    /// Callers disable the send control while this holds.
    pub fn is_busy(&self) -> bool {
        self.state() != DeliveryState::Idle
    }

    /// Mark the start of an exchange. Fails with [`SessionError::Busy`]
    /// unless the scheduler is idle; blocked sends are rejected, not queued.
    pub fn begin_exchange(&mut self) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != DeliveryState::Idle {
            return Err(SessionError::Busy);
        }
        *state = DeliveryState::Awaiting;
        Ok(())
    }

    /// Deliver a successful reply according to the split decision.
    ///
    /// A single reply is emitted at once and the scheduler returns to idle.
    /// A staggered reply emits the first chunk now, then the second after
    /// the stagger delay; the awaiting flag stays set in between.
    pub async fn deliver(&mut self, decision: SplitDecision) {
        match decision {
            SplitDecision::Single(text) => {
                self.emit(DeliveryEvent { text, last: true }).await;
                self.set_state(DeliveryState::Idle);
            }
            SplitDecision::Staggered { first, second } => {
                self.emit(DeliveryEvent {
                    text: first,
                    last: false,
                })
                .await;
                self.set_state(DeliveryState::PendingSecond);

                let state = Arc::clone(&self.state);
                let events = self.events.clone();
                let delay = self.stagger_delay;
                self.stagger = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if events
                        .send(DeliveryEvent {
                            text: second,
                            last: true,
                        })
                        .await
                        .is_err()
                    {
                        tracing::debug!("Delivery channel closed before second chunk");
                    }
                    *state.lock().unwrap_or_else(|e| e.into_inner()) =
                        DeliveryState::Idle;
                }));
            }
        }
    }

    /// Deliver the fixed error message for a failed gateway call and return
    /// to idle.
    pub async fn fail(&mut self) {
        self.emit(DeliveryEvent {
            text: GATEWAY_ERROR_MESSAGE.to_string(),
            last: true,
        })
        .await;
        self.set_state(DeliveryState::Idle);
    }

    /// Abort any pending staggered chunk and return to idle. Called on
    /// session reset.
    pub fn reset(&mut self) {
        if let Some(handle) = self.stagger.take() {
            handle.abort();
        }
        self.set_state(DeliveryState::Idle);
    }

    fn set_state(&self, new: DeliveryState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = new;
    }

    async fn emit(&self, event: DeliveryEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("Delivery channel closed, dropping chunk");
        }
    }
}

impl Drop for DeliveryScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.stagger.take() {
            handle.abort();
        }
    }
}
