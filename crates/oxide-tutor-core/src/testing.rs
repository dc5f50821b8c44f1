//! Testing helpers and mock utilities.
//!
//! Provides convenient constructors for mocked grammar checkers and
//! completion providers.

use crate::grammar::{GrammarError, GrammarMatch, MockGrammarChecker};
use crate::llm::{LlmError, MockCompletionProvider};

/// Create a mock grammar checker that returns `matches` for every call.
///
/// # Example
///
/// ```rust,ignore
/// use oxide_tutor_core::grammar::GrammarMatch;
/// use oxide_tutor_core::testing::mock_grammar_with;
///
/// let checker = mock_grammar_with(vec![GrammarMatch::new(2, 3, "Agreement", &["have"])]);
/// ```
#[must_use]
pub fn mock_grammar_with(matches: Vec<GrammarMatch>) -> MockGrammarChecker {
    let mut mock = MockGrammarChecker::new();
    mock.expect_check().returning(move |_| Ok(matches.clone()));
    mock
}

/// Create a mock grammar checker that fails every call with a status error.
#[must_use]
pub fn mock_grammar_failing(status: u16) -> MockGrammarChecker {
    let mut mock = MockGrammarChecker::new();
    mock.expect_check().returning(move |_| {
        Err(GrammarError::Status {
            status,
            body: "Service Unavailable".to_string(),
        })
    });
    mock
}

/// Create a mock completion provider that returns `response_text` for all
/// `chat_completion` calls.
#[must_use]
pub fn mock_completion_simple(response_text: &'static str) -> MockCompletionProvider {
    let mut mock = MockCompletionProvider::new();
    mock.expect_chat_completion()
        .returning(move |_, _| Ok(response_text.to_string()));
    mock
}

/// Create a mock completion provider that behaves as if no API key were set.
#[must_use]
pub fn mock_completion_missing_key() -> MockCompletionProvider {
    let mut mock = MockCompletionProvider::new();
    mock.expect_chat_completion()
        .returning(|_, _| Err(LlmError::MissingConfig("OpenRouter API key".to_string())));
    mock
}
