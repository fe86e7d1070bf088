use crate::ai::default_sentence_pair;
use crate::logger;
use crate::models::{GatewayRequest, GatewayResponse, SentencePair};
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStage {
    Idle,
    /// A replacement sentence pair is on its way.
    FetchingPrompt,
    Analyzing,
    /// English analysis available; Polish translation can be requested.
    Analyzed,
    Translating,
    Translated,
}

/// Two-stage translation exercise: the learner translates a Polish prompt,
/// asks for an English critique, and may then have that critique translated
/// into Polish.
///
/// The Polish rendering is derived from the analysis and never outlives it:
/// any re-analysis or prompt replacement clears both together. Requests are
/// stamped with a generation token so responses for a superseded prompt are
/// discarded on arrival.
pub struct TranslationPipeline {
    prompt: SentencePair,
    input_text: String,
    stage: TranslationStage,
    analysis_text: Option<String>,
    translated_text: Option<String>,
    error: Option<String>,
    generation: u64,
    request_tx: Option<Sender<GatewayRequest>>,
}

impl TranslationPipeline {
    pub fn new(request_tx: Option<Sender<GatewayRequest>>) -> Self {
        Self {
            prompt: default_sentence_pair(),
            input_text: String::new(),
            stage: TranslationStage::Idle,
            analysis_text: None,
            translated_text: None,
            error: None,
            generation: 0,
            request_tx,
        }
    }

    pub fn prompt(&self) -> &SentencePair {
        &self.prompt
    }

    pub fn stage(&self) -> TranslationStage {
        self.stage
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn analysis_text(&self) -> Option<&str> {
        self.analysis_text.as_deref()
    }

    pub fn translated_text(&self) -> Option<&str> {
        self.translated_text.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    fn in_flight(&self) -> bool {
        matches!(
            self.stage,
            TranslationStage::FetchingPrompt
                | TranslationStage::Analyzing
                | TranslationStage::Translating
        )
    }

    /// Requests an English critique of the current input. Re-analysis
    /// overwrites prior feedback, including any Polish rendering.
    pub fn analyze(&mut self) {
        if self.in_flight() || self.input_text.trim().is_empty() {
            return;
        }

        self.analysis_text = None;
        self.translated_text = None;
        self.error = None;
        self.stage = TranslationStage::Analyzing;

        if let Some(ref tx) = self.request_tx {
            tx.send(GatewayRequest::Analyze {
                generation: self.generation,
                source: self.prompt.source.clone(),
                reference: self.prompt.reference.clone(),
                candidate: self.input_text.clone(),
            })
            .ok();
        }
    }

    /// Requests the Polish rendering of the analysis. A second call while
    /// one is pending is a no-op.
    pub fn translate(&mut self) {
        if self.stage != TranslationStage::Analyzed {
            return;
        }
        let Some(ref analysis) = self.analysis_text else {
            return;
        };

        self.error = None;
        self.stage = TranslationStage::Translating;

        if let Some(ref tx) = self.request_tx {
            tx.send(GatewayRequest::Translate {
                generation: self.generation,
                text: analysis.clone(),
            })
            .ok();
        }
    }

    /// Swaps in a freshly generated sentence pair. Legal from any stage;
    /// whatever was in flight for the old prompt is discarded on arrival.
    pub fn next_prompt(&mut self) {
        if self.stage == TranslationStage::FetchingPrompt {
            return;
        }

        self.generation += 1;
        self.analysis_text = None;
        self.translated_text = None;
        self.error = None;
        self.stage = TranslationStage::FetchingPrompt;

        if let Some(ref tx) = self.request_tx {
            tx.send(GatewayRequest::SentencePair {
                generation: self.generation,
            })
            .ok();
        }
    }

    pub fn apply_response(&mut self, response: GatewayResponse) {
        match response {
            GatewayResponse::SentencePair { generation, result } => {
                if generation != self.generation
                    || self.stage != TranslationStage::FetchingPrompt
                {
                    logger::log("Discarding stale sentence pair");
                    return;
                }
                match result {
                    Ok(pair) => {
                        self.prompt = pair;
                        self.input_text.clear();
                        self.stage = TranslationStage::Idle;
                    }
                    Err(e) => {
                        // Old prompt stays usable.
                        self.error = Some(format!("Failed to generate new sentence: {}", e));
                        self.stage = TranslationStage::Idle;
                    }
                }
            }
            GatewayResponse::Analysis { generation, result } => {
                if generation != self.generation || self.stage != TranslationStage::Analyzing {
                    logger::log("Discarding stale analysis");
                    return;
                }
                match result {
                    Ok(text) => {
                        self.analysis_text = Some(text);
                        self.translated_text = None;
                        self.stage = TranslationStage::Analyzed;
                    }
                    Err(e) => {
                        // No partial feedback is ever shown.
                        self.analysis_text = None;
                        self.error = Some(format!("Analysis failed: {}", e));
                        self.stage = TranslationStage::Idle;
                    }
                }
            }
            GatewayResponse::Translation { generation, result } => {
                if generation != self.generation || self.stage != TranslationStage::Translating {
                    logger::log("Discarding stale translation");
                    return;
                }
                match result {
                    Ok(text) => {
                        self.translated_text = Some(text);
                        self.stage = TranslationStage::Translated;
                    }
                    Err(e) => {
                        // The English analysis already shown survives.
                        self.error = Some(format!("Translation failed: {}", e));
                        self.stage = TranslationStage::Analyzed;
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use std::sync::mpsc::{self, Receiver};

    fn pipeline() -> (TranslationPipeline, Receiver<GatewayRequest>) {
        let (tx, rx) = mpsc::channel();
        (TranslationPipeline::new(Some(tx)), rx)
    }

    fn analyzed_pipeline() -> (TranslationPipeline, Receiver<GatewayRequest>) {
        let (mut p, rx) = pipeline();
        p.set_input("She usually drink coffee in the morning.");
        p.analyze();
        rx.recv().unwrap();
        p.apply_response(GatewayResponse::Analysis {
            generation: 0,
            result: Ok("'Drink' needs the third-person -s: 'drinks'.".to_string()),
        });
        assert_eq!(p.stage(), TranslationStage::Analyzed);
        (p, rx)
    }

    #[test]
    fn test_analyze_requires_input() {
        let (mut p, rx) = pipeline();
        p.set_input("   ");
        p.analyze();
        assert_eq!(p.stage(), TranslationStage::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_analyze_sends_prompt_and_candidate() {
        let (mut p, rx) = pipeline();
        p.set_input("She usually drinks coffee in the morning.");
        p.analyze();
        assert_eq!(p.stage(), TranslationStage::Analyzing);

        match rx.recv().unwrap() {
            GatewayRequest::Analyze {
                generation,
                source,
                reference,
                candidate,
            } => {
                assert_eq!(generation, 0);
                assert_eq!(source, p.prompt().source);
                assert_eq!(reference, p.prompt().reference);
                assert_eq!(candidate, "She usually drinks coffee in the morning.");
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_analysis_failure_leaves_no_partial_feedback() {
        let (mut p, _rx) = pipeline();
        p.set_input("some attempt");
        p.analyze();
        p.apply_response(GatewayResponse::Analysis {
            generation: 0,
            result: Err(GatewayError::Transport("timeout".to_string())),
        });

        assert_eq!(p.stage(), TranslationStage::Idle);
        assert!(p.analysis_text().is_none());
        assert!(p.translated_text().is_none());
        assert!(p.error().unwrap().contains("timeout"));
    }

    #[test]
    fn test_translate_only_after_analysis() {
        let (mut p, rx) = pipeline();
        p.translate();
        assert_eq!(p.stage(), TranslationStage::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_translate_twice_sends_one_request() {
        let (mut p, rx) = analyzed_pipeline();

        p.translate();
        p.translate();
        assert_eq!(p.stage(), TranslationStage::Translating);

        assert!(matches!(
            rx.try_recv().unwrap(),
            GatewayRequest::Translate { .. }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_translate_failure_keeps_analysis() {
        let (mut p, _rx) = analyzed_pipeline();
        p.translate();
        p.apply_response(GatewayResponse::Translation {
            generation: 0,
            result: Err(GatewayError::Transport("timeout".to_string())),
        });

        assert_eq!(p.stage(), TranslationStage::Analyzed);
        assert!(p.analysis_text().is_some());
        assert!(p.translated_text().is_none());
        assert!(p.error().is_some());
    }

    #[test]
    fn test_translate_success_derives_from_analysis() {
        let (mut p, _rx) = analyzed_pipeline();
        p.translate();
        p.apply_response(GatewayResponse::Translation {
            generation: 0,
            result: Ok("'Drink' wymaga końcówki -s: 'drinks'.".to_string()),
        });

        assert_eq!(p.stage(), TranslationStage::Translated);
        assert!(p.analysis_text().is_some());
        assert!(p.translated_text().is_some());
    }

    #[test]
    fn test_next_prompt_discards_in_flight_analysis() {
        let (mut p, _rx) = pipeline();
        p.set_input("an attempt");
        p.analyze();
        assert_eq!(p.stage(), TranslationStage::Analyzing);

        p.next_prompt();
        assert_eq!(p.stage(), TranslationStage::FetchingPrompt);
        assert!(p.analysis_text().is_none());

        // The old analysis resolves late and must not be applied.
        p.apply_response(GatewayResponse::Analysis {
            generation: 0,
            result: Ok("stale critique".to_string()),
        });
        assert!(p.analysis_text().is_none());

        p.apply_response(GatewayResponse::SentencePair {
            generation: 1,
            result: Ok(SentencePair {
                source: "Pada deszcz.".to_string(),
                reference: "It is raining.".to_string(),
            }),
        });
        assert_eq!(p.stage(), TranslationStage::Idle);
        assert_eq!(p.prompt().source, "Pada deszcz.");
        assert!(p.input_text().is_empty());
        assert!(p.analysis_text().is_none());
        assert!(p.error().is_none());
    }

    #[test]
    fn test_next_prompt_failure_keeps_old_prompt() {
        let (mut p, _rx) = pipeline();
        let old_source = p.prompt().source.clone();

        p.next_prompt();
        p.apply_response(GatewayResponse::SentencePair {
            generation: 1,
            result: Err(GatewayError::Transport("offline".to_string())),
        });

        assert_eq!(p.stage(), TranslationStage::Idle);
        assert_eq!(p.prompt().source, old_source);
        assert!(p.error().is_some());
    }

    #[test]
    fn test_next_prompt_is_single_flight() {
        let (mut p, rx) = pipeline();
        p.next_prompt();
        p.next_prompt();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reanalysis_clears_polish_rendering() {
        let (mut p, _rx) = analyzed_pipeline();
        p.translate();
        p.apply_response(GatewayResponse::Translation {
            generation: 0,
            result: Ok("po polsku".to_string()),
        });
        assert_eq!(p.stage(), TranslationStage::Translated);

        p.set_input("a corrected attempt");
        p.analyze();
        assert_eq!(p.stage(), TranslationStage::Analyzing);
        assert!(p.analysis_text().is_none());
        assert!(p.translated_text().is_none());
    }
}
