use crate::ai::client::{ModelConfig, OpenRouterClient};
use crate::error::GatewayError;
use crate::logger;
use crate::models::{ConversationTurn, SentencePair, Speaker, Task};
use async_trait::async_trait;
use openrouter_api::types::chat::Message;

/// Shown when sentence generation returns something unusable. Still a
/// renderable prompt, so the translation exercise never dead-ends.
pub const FALLBACK_PAIR: (&str, &str) = (
    "Nie udało się wygenerować zdania. Spróbuj ponownie.",
    "Sentence generation failed. Try again.",
);

/// The seed sentence shown before any generation has happened.
pub fn default_sentence_pair() -> SentencePair {
    SentencePair {
        source: "Ona zazwyczaj pije kawę rano.".to_string(),
        reference: "She usually drinks coffee in the morning.".to_string(),
    }
}

pub fn fallback_sentence_pair() -> SentencePair {
    SentencePair {
        source: FALLBACK_PAIR.0.to_string(),
        reference: FALLBACK_PAIR.1.to_string(),
    }
}

/// Typed boundary to the external generation service.
///
/// Each operation is a single request/response round trip with no retry
/// policy of its own; the gateway holds no state between calls. Transport
/// failures surface as errors; malformed list/object responses degrade to
/// empty or sentinel content instead.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Request a fixed-size batch of mixed task kinds for a named topic.
    /// An empty batch means "no content available" and is not an error.
    async fn generate_task_batch(&self, topic: &str) -> Result<Vec<Task>, GatewayError>;

    /// Request one practice sentence pair. Parse failure yields the
    /// fallback pair rather than an error.
    async fn generate_sentence_pair(&self) -> Result<SentencePair, GatewayError>;

    /// Free-form critique of a candidate translation.
    async fn analyze(
        &self,
        source: &str,
        reference: &str,
        candidate: &str,
    ) -> Result<String, GatewayError>;

    /// Stateless text translation into Polish.
    async fn translate_text(&self, text: &str) -> Result<String, GatewayError>;

    /// One tutor turn. `context` is the bounded recent-turn suffix; all
    /// conversation memory lives in the caller.
    async fn converse(
        &self,
        context: &[ConversationTurn],
        message: &str,
    ) -> Result<String, GatewayError>;
}

/// Strips markdown fencing and surrounding chatter, keeping the outermost
/// `open`..`close` span. Generation output frequently wraps JSON this way.
fn clean_json_response(response: &str, open: char, close: char) -> String {
    let mut cleaned = response.trim().to_string();

    if cleaned.starts_with("```") {
        let lines: Vec<&str> = cleaned.lines().collect();
        if lines.len() > 2 {
            cleaned = lines[1..lines.len() - 1].join("\n");
        }
    }

    if let Some(start) = cleaned.find(open)
        && let Some(end) = cleaned.rfind(close)
        && start < end
    {
        cleaned = cleaned[start..=end].to_string();
    }

    cleaned.trim().to_string()
}

/// Parses a generated task batch. The body must be a JSON array or the
/// whole response counts as "no content"; individual items that fail
/// required-field validation are dropped, never surfaced.
pub fn parse_task_batch(response: &str) -> Result<Vec<Task>, GatewayError> {
    let cleaned = clean_json_response(response, '[', ']');
    let items: Vec<serde_json::Value> = serde_json::from_str(&cleaned)
        .map_err(|e| GatewayError::Malformed(format!("task batch is not a JSON array: {}", e)))?;

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Task>(item).ok())
        .filter(Task::is_well_formed)
        .collect())
}

pub fn parse_sentence_pair(response: &str) -> Result<SentencePair, GatewayError> {
    let cleaned = clean_json_response(response, '{', '}');
    let pair: SentencePair = serde_json::from_str(&cleaned)
        .map_err(|e| GatewayError::Malformed(format!("sentence pair: {}", e)))?;

    if pair.source.trim().is_empty() || pair.reference.trim().is_empty() {
        return Err(GatewayError::Malformed("empty sentence pair".to_string()));
    }

    Ok(pair)
}

const TUTOR_SYSTEM_PROMPT: &str = "Jesteś ekspertem gramatyki angielskiej dla poziomu B1/B2/C1. Twoim celem jest pomoc polskim uczniom.
1. Zawsze odpowiadaj po angielsku, ale dodaj tłumaczenie na polski najważniejszych części (szczególnie reguł).
2. Analizuj błędy gramatyczne użytkownika.
3. Podawaj krótkie, konkretne reguły z przykładami.
4. Na końcu zaproponuj 3 zdania do samodzielnego przećwiczenia.
5. Bądź motywujący i precyzyjny.";

/// Gateway backed by the OpenRouter chat-completion API.
#[derive(Debug)]
pub struct OpenRouterGateway {
    client: OpenRouterClient,
    config: ModelConfig,
}

impl OpenRouterGateway {
    pub fn new() -> Result<Self, GatewayError> {
        Ok(Self {
            client: OpenRouterClient::new()?,
            config: ModelConfig::default(),
        })
    }

    pub fn with_config(config: ModelConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: OpenRouterClient::new()?,
            config,
        })
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, GatewayError> {
        let text = self.client.complete(messages, Some(&self.config)).await?;
        if text.trim().is_empty() {
            return Err(GatewayError::NoContent);
        }
        Ok(text)
    }
}

#[async_trait]
impl ContentGateway for OpenRouterGateway {
    async fn generate_task_batch(&self, topic: &str) -> Result<Vec<Task>, GatewayError> {
        let prompt = format!(
            r#"Generate 5 challenging quiz questions for the English grammar topic "{}". Mix fill-in-the-blank and multiple choice.

IMPORTANT:
- Respond ONLY with a valid JSON array (no markdown, no extra text).
- Each element must have this exact shape:
{{
    "id": "unique string",
    "type": "multiple-choice" | "fill-in-blank" | "drag-drop" | "correct-mistake" | "translation",
    "question": "the task prompt",
    "options": ["only for multiple-choice"],
    "answer": "the expected answer",
    "explanation": "short explanation in Polish"
}}
"#,
            topic
        );

        let messages = vec![
            Message::text(
                "system",
                "You are an educational assistant creating English grammar exercises for Polish learners.",
            ),
            Message::text("user", &prompt),
        ];

        let response = self.complete(messages).await?;
        match parse_task_batch(&response) {
            Ok(tasks) => Ok(tasks),
            Err(e) => {
                logger::log(&format!("Task batch degraded to empty: {}", e));
                Ok(Vec::new())
            }
        }
    }

    async fn generate_sentence_pair(&self) -> Result<SentencePair, GatewayError> {
        let prompt = r#"Generate one Polish sentence for an English learner to translate, together with a correct English reference translation. Vary tense and difficulty (B1-C1).

IMPORTANT: Respond ONLY with this exact JSON structure (no markdown, no extra text):
{"pl": "polskie zdanie", "en": "the English translation"}"#;

        let messages = vec![
            Message::text(
                "system",
                "You are an educational assistant creating translation practice for Polish learners of English.",
            ),
            Message::text("user", prompt),
        ];

        let response = self.complete(messages).await?;
        match parse_sentence_pair(&response) {
            Ok(pair) => Ok(pair),
            Err(e) => {
                logger::log(&format!("Sentence pair degraded to fallback: {}", e));
                Ok(fallback_sentence_pair())
            }
        }
    }

    async fn analyze(
        &self,
        source: &str,
        reference: &str,
        candidate: &str,
    ) -> Result<String, GatewayError> {
        let prompt = format!(
            r#"You are an expert English teacher.
Polish sentence: "{}"
Correct pattern: "{}"
User's translation: "{}"

Task:
1. Analyze the user's translation.
2. Point out grammatical, spelling, or word order mistakes.
3. Explain the relevant grammar rules.
4. Provide 2-3 natural alternative ways to say this.

IMPORTANT: Response MUST be entirely in English. Do not use Markdown characters like # or *."#,
            source, reference, candidate
        );

        let messages = vec![
            Message::text("system", "You are an expert English teacher."),
            Message::text("user", &prompt),
        ];

        self.complete(messages).await
    }

    async fn translate_text(&self, text: &str) -> Result<String, GatewayError> {
        let prompt = format!(
            r#"Translate the following English grammar analysis into clear, professional Polish. Keep the structure identical and preserve English examples in their original form. Text to translate: "{}""#,
            text
        );

        let messages = vec![
            Message::text("system", "You are a professional English-to-Polish translator."),
            Message::text("user", &prompt),
        ];

        self.complete(messages).await
    }

    async fn converse(
        &self,
        context: &[ConversationTurn],
        message: &str,
    ) -> Result<String, GatewayError> {
        let mut messages = vec![Message::text("system", TUTOR_SYSTEM_PROMPT)];
        for turn in context {
            let role = match turn.speaker {
                Speaker::User => "user",
                Speaker::Tutor => "assistant",
            };
            messages.push(Message::text(role, &turn.text));
        }
        messages.push(Message::text("user", message));

        self.complete(messages).await
    }
}

/// Scripted gateway for worker and integration tests.
#[cfg(test)]
pub struct MockGateway {
    pub tasks: Result<Vec<Task>, GatewayError>,
    pub pair: Result<SentencePair, GatewayError>,
    pub analysis: Result<String, GatewayError>,
    pub translation: Result<String, GatewayError>,
    pub reply: Result<String, GatewayError>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockGateway {
    pub fn new() -> Self {
        Self {
            tasks: Ok(Vec::new()),
            pair: Ok(default_sentence_pair()),
            analysis: Ok("Well done. The tense is correct.".to_string()),
            translation: Ok("Brawo. Czas jest poprawny.".to_string()),
            reply: Ok("Good question! 'Since' marks a starting point.".to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[async_trait]
impl ContentGateway for MockGateway {
    async fn generate_task_batch(&self, _topic: &str) -> Result<Vec<Task>, GatewayError> {
        self.record();
        self.tasks.clone()
    }

    async fn generate_sentence_pair(&self) -> Result<SentencePair, GatewayError> {
        self.record();
        self.pair.clone()
    }

    async fn analyze(
        &self,
        _source: &str,
        _reference: &str,
        _candidate: &str,
    ) -> Result<String, GatewayError> {
        self.record();
        self.analysis.clone()
    }

    async fn translate_text(&self, _text: &str) -> Result<String, GatewayError> {
        self.record();
        self.translation.clone()
    }

    async fn converse(
        &self,
        _context: &[ConversationTurn],
        _message: &str,
    ) -> Result<String, GatewayError> {
        self.record();
        self.reply.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskKind;

    #[test]
    fn test_clean_json_response_simple() {
        let json = r#"{"pl":"Ona śpi.","en":"She is sleeping."}"#;
        let cleaned = clean_json_response(json, '{', '}');
        assert_eq!(cleaned, json);
    }

    #[test]
    fn test_clean_json_response_markdown() {
        let json = "```json\n[{\"id\": \"q1\"}]\n```";
        let cleaned = clean_json_response(json, '[', ']');
        assert_eq!(cleaned, r#"[{"id": "q1"}]"#);
    }

    #[test]
    fn test_clean_json_response_with_text() {
        let json = r#"Here are your tasks: [{"id": "q1"}] enjoy!"#;
        let cleaned = clean_json_response(json, '[', ']');
        assert_eq!(cleaned, r#"[{"id": "q1"}]"#);
    }

    #[test]
    fn test_parse_task_batch_valid() {
        let json = r#"[
            {"id": "q1", "type": "multiple-choice", "question": "She ___ to school.",
             "options": ["walk", "walks"], "answer": "walks", "explanation": "Końcówka -s."},
            {"id": "q2", "type": "fill-in-blank", "question": "They ___ (not/like) pizza.",
             "answer": "don't like", "explanation": "Operator don't."}
        ]"#;

        let tasks = parse_task_batch(json).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].kind, TaskKind::MultipleChoice);
        assert_eq!(tasks[1].expected_answer, "don't like");
    }

    #[test]
    fn test_parse_task_batch_drops_invalid_items() {
        let json = r#"[
            {"id": "q1", "type": "fill-in-blank", "question": "Q?", "answer": "A", "explanation": "E"},
            {"id": "q2", "type": "fill-in-blank", "question": "Q?"},
            {"id": "", "type": "fill-in-blank", "question": "Q?", "answer": "A", "explanation": "E"},
            {"id": "q4", "type": "no-such-kind", "question": "Q?", "answer": "A", "explanation": "E"}
        ]"#;

        let tasks = parse_task_batch(json).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "q1");
    }

    #[test]
    fn test_parse_task_batch_not_an_array() {
        assert!(parse_task_batch("I cannot help with that.").is_err());
        assert!(parse_task_batch(r#"{"id": "q1"}"#).is_err());
    }

    #[test]
    fn test_parse_sentence_pair_with_markdown() {
        let json = "```json\n{\"pl\": \"Pada deszcz.\", \"en\": \"It is raining.\"}\n```";
        let pair = parse_sentence_pair(json).unwrap();
        assert_eq!(pair.source, "Pada deszcz.");
        assert_eq!(pair.reference, "It is raining.");
    }

    #[test]
    fn test_parse_sentence_pair_rejects_empty_fields() {
        assert!(parse_sentence_pair(r#"{"pl": "", "en": "x"}"#).is_err());
        assert!(parse_sentence_pair("no json here").is_err());
    }

    #[test]
    fn test_fallback_pair_is_renderable() {
        let pair = fallback_sentence_pair();
        assert!(!pair.source.is_empty());
        assert!(!pair.reference.is_empty());
    }
}
