//! Turns form state into the canonical prompt payload.

use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{PromptPayload, ResponseStyle};

/// Hard ceiling on prompt length, in characters. Prompts at the ceiling are rejected.
pub const MAX_PROMPT_CHARS: usize = 5000;

const APPROACHING_THRESHOLD: usize = 4500;
const ALMOST_REACHED_THRESHOLD: usize = 4800;

pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "Explain machine learning",
    "How does blockchain work?",
    "What is quantum computing?",
    "Describe neural networks",
];

/// How close a draft is to the length ceiling, for the input counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterBudget {
    Within,
    Approaching,
    AlmostReached,
    LimitReached,
}

pub fn character_budget(text: &str) -> CharacterBudget {
    match text.chars().count() {
        n if n >= MAX_PROMPT_CHARS => CharacterBudget::LimitReached,
        n if n > ALMOST_REACHED_THRESHOLD => CharacterBudget::AlmostReached,
        n if n > APPROACHING_THRESHOLD => CharacterBudget::Approaching,
        _ => CharacterBudget::Within,
    }
}

/// Validate and assemble a payload. The text is sent as typed, not trimmed.
pub fn build(
    text: &str,
    style: ResponseStyle,
    skip_refinement: bool,
) -> Result<PromptPayload, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let length = text.chars().count();
    if length >= MAX_PROMPT_CHARS {
        return Err(ValidationError::TooLong {
            length,
            limit: MAX_PROMPT_CHARS,
        });
    }

    Ok(PromptPayload {
        text: text.to_string(),
        style,
        skip_refinement,
    })
}

/// One user submission, captured from the form at submit time.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSubmission {
    pub id: Uuid,
    pub text: String,
    pub style: ResponseStyle,
    pub skip_refinement: bool,
}

impl PromptSubmission {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            style: ResponseStyle::default(),
            skip_refinement: false,
        }
    }

    pub fn with_style(mut self, style: ResponseStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_skip_refinement(mut self, skip: bool) -> Self {
        self.skip_refinement = skip;
        self
    }

    pub fn to_payload(&self) -> Result<PromptPayload, ValidationError> {
        build(&self.text, self.style, self.skip_refinement)
    }
}
