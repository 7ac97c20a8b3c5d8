use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::transport::Endpoint;

/// Which response contract a submission asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    #[default]
    Standard,
    Debug,
}

impl ResponseMode {
    pub fn from_debug_flag(debug: bool) -> Self {
        if debug {
            ResponseMode::Debug
        } else {
            ResponseMode::Standard
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            ResponseMode::Standard => Endpoint::Prompt,
            ResponseMode::Debug => Endpoint::PromptDebug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    pub response: String,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
}

/// Three-stage debug contract. `model_used` is always present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DebugAnswer {
    pub raw_input: String,
    pub refined_prompt: String,
    pub final_response: String,
    pub model_used: String,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default)]
    pub refinement_time_ms: Option<f64>,
    #[serde(default)]
    pub generation_time_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    Answer(Answer),
    DebugAnswer(DebugAnswer),
}

impl PromptOutcome {
    /// Decode a success body according to the contract that was requested.
    pub fn decode(mode: ResponseMode, body: Value) -> Result<Self> {
        Ok(match mode {
            ResponseMode::Standard => PromptOutcome::Answer(serde_json::from_value(body)?),
            ResponseMode::Debug => PromptOutcome::DebugAnswer(serde_json::from_value(body)?),
        })
    }

    /// Decide the shape from the payload alone, by presence of `raw_input`.
    /// Only for bodies whose originating call is not known.
    pub fn classify(body: Value) -> Result<Self> {
        let mode = ResponseMode::from_debug_flag(body.get("raw_input").is_some());
        Self::decode(mode, body)
    }

    pub fn mode(&self) -> ResponseMode {
        match self {
            PromptOutcome::Answer(_) => ResponseMode::Standard,
            PromptOutcome::DebugAnswer(_) => ResponseMode::Debug,
        }
    }

    /// The text the user asked for, whichever contract produced it.
    pub fn response_text(&self) -> &str {
        match self {
            PromptOutcome::Answer(a) => &a.response,
            PromptOutcome::DebugAnswer(d) => &d.final_response,
        }
    }

    pub fn model_used(&self) -> Option<&str> {
        match self {
            PromptOutcome::Answer(a) => a.model_used.as_deref(),
            PromptOutcome::DebugAnswer(d) => Some(&d.model_used),
        }
    }

    pub fn processing_time_ms(&self) -> Option<f64> {
        match self {
            PromptOutcome::Answer(a) => a.processing_time_ms,
            PromptOutcome::DebugAnswer(d) => d.processing_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;

    fn debug_body() -> Value {
        json!({
            "raw_input": "Explain machine learning",
            "refined_prompt": "Explain machine learning in a balanced way",
            "final_response": "Machine learning is...",
            "model_used": "gpt-x",
            "processing_time_ms": 340.0,
            "refinement_time_ms": 90.0,
            "generation_time_ms": 250.0
        })
    }

    #[test]
    fn test_standard_body_decodes_to_answer() {
        let outcome = PromptOutcome::decode(
            ResponseMode::Standard,
            json!({"response": "ML is...", "model_used": "gpt-x", "processing_time_ms": 120}),
        )
        .unwrap();

        assert_eq!(
            outcome,
            PromptOutcome::Answer(Answer {
                response: "ML is...".into(),
                model_used: Some("gpt-x".into()),
                processing_time_ms: Some(120.0),
            })
        );
    }

    #[test]
    fn test_timings_are_optional() {
        let outcome =
            PromptOutcome::decode(ResponseMode::Standard, json!({"response": "ok"})).unwrap();
        assert_eq!(outcome.model_used(), None);
        assert_eq!(outcome.processing_time_ms(), None);

        let mut body = debug_body();
        for key in ["processing_time_ms", "refinement_time_ms", "generation_time_ms"] {
            body.as_object_mut().unwrap().remove(key);
        }
        let outcome = PromptOutcome::decode(ResponseMode::Debug, body).unwrap();
        assert_eq!(outcome.model_used(), Some("gpt-x"));
    }

    #[test]
    fn test_decode_follows_mode_not_payload() {
        // A standard answer that happens to carry a `raw_input` key is still an Answer.
        let outcome = PromptOutcome::decode(
            ResponseMode::Standard,
            json!({"response": "ok", "raw_input": "leaked"}),
        )
        .unwrap();
        assert_eq!(outcome.mode(), ResponseMode::Standard);
    }

    #[test]
    fn test_debug_requires_model_used() {
        let mut body = debug_body();
        body.as_object_mut().unwrap().remove("model_used");
        let err = PromptOutcome::decode(ResponseMode::Debug, body).unwrap_err();
        assert!(matches!(err, ClientError::Decoding(_)));
    }

    #[test]
    fn test_missing_response_is_decoding_error() {
        let err = PromptOutcome::decode(ResponseMode::Standard, json!({"model_used": "gpt-x"}))
            .unwrap_err();
        assert!(matches!(err, ClientError::Decoding(_)));
    }

    #[test]
    fn test_classify_by_structure() {
        let debug = PromptOutcome::classify(debug_body()).unwrap();
        assert_eq!(debug.mode(), ResponseMode::Debug);
        assert_eq!(debug.response_text(), "Machine learning is...");

        let plain = PromptOutcome::classify(json!({"response": "hi"})).unwrap();
        assert_eq!(plain.mode(), ResponseMode::Standard);

        assert!(PromptOutcome::classify(json!({"unrelated": true})).is_err());
    }

    #[test]
    fn test_mode_endpoints() {
        assert_eq!(ResponseMode::from_debug_flag(true).endpoint(), Endpoint::PromptDebug);
        assert_eq!(ResponseMode::from_debug_flag(false).endpoint(), Endpoint::Prompt);
    }
}
