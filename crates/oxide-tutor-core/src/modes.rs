//! Mode registry
//!
//! A mode is a named persona; each one maps to the fixed system prompt sent
//! to the completion API. The registry is immutable and ordered.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Callback data prefix for inline mode selection buttons
pub const MODE_CALLBACK_PREFIX: &str = "setmode:";

/// Tutor persona selecting the system prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Friendly teacher that corrects mistakes (the default)
    Teacher,
    /// Sentence-by-sentence grammar checker
    Grammar,
    /// English to Russian translator
    Translator,
    /// Proficiency exam instructor
    Examiner,
    /// Casual conversation partner
    Companion,
}

/// Mode used for chats that never selected one
pub const DEFAULT_MODE: Mode = Mode::Teacher;

impl Mode {
    /// All modes in registry order.
    pub const ALL: [Self; 5] = [
        Self::Teacher,
        Self::Grammar,
        Self::Translator,
        Self::Examiner,
        Self::Companion,
    ];

    /// Lowercase registry name, as typed after `/setmode`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Grammar => "grammar",
            Self::Translator => "translator",
            Self::Examiner => "examiner",
            Self::Companion => "companion",
        }
    }

    /// Title-case label for buttons.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Teacher => "Teacher",
            Self::Grammar => "Grammar",
            Self::Translator => "Translator",
            Self::Examiner => "Examiner",
            Self::Companion => "Companion",
        }
    }

    /// System prompt sent to the completion API.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Teacher => {
                "You are a friendly English teacher. Correct grammar mistakes, explain difficult words when asked, and encourage the student to speak more."
            }
            Self::Grammar => {
                "You are an English grammar checker. Whenever the user sends a sentence, reply with a corrected version and a brief explanation of the corrections."
            }
            Self::Translator => {
                "You are a professional English-Russian translator. Translate the user's messages from English to Russian while preserving the tone and context."
            }
            Self::Examiner => {
                "You are an English proficiency exam instructor. Ask the user speaking or writing test questions, evaluate the answers, and provide feedback with a score from 1 to 10."
            }
            Self::Companion => {
                "You are a friendly English-speaking companion. Hold casual conversations in English. Keep replies short and light. Avoid teaching unless asked."
            }
        }
    }

    /// Exact-name lookup (registry names are lowercase).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name() == name)
    }

    /// Reverse lookup by prompt text.
    #[must_use]
    pub fn from_prompt(prompt: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.prompt() == prompt)
    }

    /// Inline button callback payload for this mode.
    #[must_use]
    pub fn callback_data(self) -> String {
        format!("{MODE_CALLBACK_PREFIX}{}", self.name())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name that is not in the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    /// Case-insensitive, whitespace-tolerant parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::from_name(&normalized).ok_or(UnknownMode(normalized))
    }
}

/// Parsed `/setmode` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetModeArgument {
    /// No argument given
    Missing,
    /// Argument is not a registry mode
    Unknown(String),
    /// Valid mode
    Valid(Mode),
}

/// Parses everything after `/setmode`.
///
/// # Examples
///
/// ```
/// use oxide_tutor_core::modes::{parse_setmode_argument, Mode, SetModeArgument};
/// assert_eq!(parse_setmode_argument(" Examiner "), SetModeArgument::Valid(Mode::Examiner));
/// assert_eq!(parse_setmode_argument(""), SetModeArgument::Missing);
/// ```
#[must_use]
pub fn parse_setmode_argument(args: &str) -> SetModeArgument {
    if args.trim().is_empty() {
        return SetModeArgument::Missing;
    }
    match args.parse::<Mode>() {
        Ok(mode) => SetModeArgument::Valid(mode),
        Err(UnknownMode(name)) => SetModeArgument::Unknown(name),
    }
}

/// Extracts the mode from an inline button payload.
///
/// Returns `None` for foreign payloads and for unknown mode tags; callers
/// treat both as a no-op.
#[must_use]
pub fn parse_mode_callback(data: &str) -> Option<Mode> {
    data.strip_prefix(MODE_CALLBACK_PREFIX)
        .and_then(Mode::from_name)
}

/// What `/currentmode` reports for a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentMode {
    /// Nothing stored; the teacher default applies
    Default,
    /// A registry mode is stored
    Selected(Mode),
    /// A prompt outside the registry is stored
    Custom,
}

impl CurrentMode {
    /// Resolves the stored prompt (if any) against the registry.
    #[must_use]
    pub fn resolve(stored_prompt: Option<&str>) -> Self {
        match stored_prompt {
            None => Self::Default,
            Some(prompt) => Mode::from_prompt(prompt).map_or(Self::Custom, Self::Selected),
        }
    }
}

impl fmt::Display for CurrentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "{DEFAULT_MODE} (default)"),
            Self::Selected(mode) => write!(f, "{mode}"),
            Self::Custom => f.write_str("Custom / Unknown"),
        }
    }
}

/// Mode name shown by `/currentmode` for the given stored prompt.
#[must_use]
pub fn describe_current_mode(stored_prompt: Option<&str>) -> String {
    CurrentMode::resolve(stored_prompt).to_string()
}
