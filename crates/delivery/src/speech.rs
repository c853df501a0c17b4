//! Voice output — the narrow interface to a speech synthesizer.
//!
//! The session speaks each delivered chunk when speech is enabled. Markdown
//! emphasis markers are stripped first so the synthesizer does not read
//! asterisks aloud. An environment without synthesis support surfaces a
//! one-time notice and otherwise stays silent; the notice is never appended
//! to the transcript.

use std::sync::atomic::{AtomicBool, Ordering};

/// A speech synthesis backend.
pub trait SpeechSynthesizer: Send + Sync {
    /// Whether this environment can actually produce audio.
    fn is_supported(&self) -> bool;

    /// Speak `text` with the given voice, if any. Fire-and-forget; failures
    /// are the implementation's problem to log.
    fn speak(&self, text: &str, voice: Option<&str>);
}

/// The unsupported-environment synthesizer: warns once, then stays quiet.
#[derive(Debug, Default)]
pub struct NullSpeech {
    notified: AtomicBool,
}

impl NullSpeech {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechSynthesizer for NullSpeech {
    fn is_supported(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str, _voice: Option<&str>) {
        if !self.notified.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "La síntesis de voz no está disponible en este entorno."
            );
        }
    }
}

/// Strip markdown emphasis markers (`*`, `_`, `` ` ``) so spoken text does
/// not include them.
pub fn strip_emphasis(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '*' | '_' | '`')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bold_and_italic_markers() {
        assert_eq!(
            strip_emphasis("**Optimizador Pro** es _excelente_"),
            "Optimizador Pro es excelente"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_emphasis("Hola, ¿en qué puedo ayudarte?"),
            "Hola, ¿en qué puedo ayudarte?");
    }

    #[test]
    fn null_speech_reports_unsupported() {
        let speech = NullSpeech::new();
        assert!(!speech.is_supported());
        // both calls are no-ops; the notice fires once internally
        speech.speak("hola", None);
        speech.speak("hola", Some("Paulina"));
    }
}
