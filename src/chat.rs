use crate::models::{ConversationTurn, GatewayRequest, GatewayResponse, Speaker};
use std::sync::mpsc::Sender;

/// Seeded tutor greeting, the first turn of every conversation.
pub const GREETING: &str = "Cześć! Jestem Twoim nauczycielem gramatyki. W czym mogę Ci dzisiaj pomóc? Napisz dowolne zdanie, a sprawdzę jego poprawność!";

/// Fixed tutor turn appended when a reply cannot be fetched, so the user
/// turn is never left unpaired.
pub const CONNECTIVITY_MESSAGE: &str =
    "Wystąpił błąd przy połączeniu z AI. Spróbuj ponownie za chwilę.";

pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

/// Turn-by-turn chat with the grammar tutor.
///
/// History is append-only and retained in full for display; the gateway
/// only ever sees the trailing context window as it existed before the new
/// user turn. One turn in flight at a time.
pub struct ConversationManager {
    history: Vec<ConversationTurn>,
    context_window: usize,
    in_flight: bool,
    request_tx: Option<Sender<GatewayRequest>>,
}

impl ConversationManager {
    pub fn new(request_tx: Option<Sender<GatewayRequest>>) -> Self {
        Self::with_context_window(request_tx, DEFAULT_CONTEXT_WINDOW)
    }

    pub fn with_context_window(
        request_tx: Option<Sender<GatewayRequest>>,
        context_window: usize,
    ) -> Self {
        Self {
            history: vec![ConversationTurn {
                speaker: Speaker::Tutor,
                text: GREETING.to_string(),
            }],
            context_window,
            in_flight: false,
            request_tx,
        }
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Appends the user turn optimistically and requests the tutor reply.
    /// Empty input and calls made while a turn is pending are rejected.
    pub fn send_message(&mut self, text: &str) {
        let message = text.trim();
        if message.is_empty() || self.in_flight {
            return;
        }

        // Window computed before the new user turn joins the history.
        let start = self.history.len().saturating_sub(self.context_window);
        let context: Vec<ConversationTurn> = self.history[start..].to_vec();

        self.history.push(ConversationTurn {
            speaker: Speaker::User,
            text: message.to_string(),
        });
        self.in_flight = true;

        if let Some(ref tx) = self.request_tx {
            tx.send(GatewayRequest::Converse {
                context,
                message: message.to_string(),
            })
            .ok();
        }
    }

    /// Pairs the pending user turn with a tutor turn: the reply on success,
    /// the fixed connectivity message otherwise.
    pub fn apply_response(&mut self, response: GatewayResponse) {
        let GatewayResponse::Reply { result } = response else {
            return;
        };
        if !self.in_flight {
            return;
        }
        self.in_flight = false;

        let text = match result {
            Ok(reply) => reply,
            Err(_) => CONNECTIVITY_MESSAGE.to_string(),
        };
        self.history.push(ConversationTurn {
            speaker: Speaker::Tutor,
            text,
        });
    }
}
