use anyhow::Result;
use async_trait::async_trait;
use oxide_tutor_core::grammar::report::build_report_parts;
use oxide_tutor_core::grammar::{GrammarChecker, GrammarError};
use oxide_tutor_core::llm::{CompletionProvider, LlmError};
use oxide_tutor_core::session::{ChatKey, SessionStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Notice sent while the completion is being generated
pub const THINKING_NOTICE: &str = "Thinking... 🤔";

/// Longest grammar report message before it is split
pub const REPORT_PART_MAX_CHARS: usize = 4000;

/// Outbound side of the relay, one call per chat message.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Send (part of) a grammar report, formatted as legacy Markdown.
    async fn send_grammar_report(&self, report: &str) -> Result<()>;

    /// Send a plain-text status message.
    async fn send_notice(&self, text: &str) -> Result<()>;

    /// Send the final reply with the main keyboard attached.
    async fn send_reply(&self, text: &str) -> Result<()>;
}

/// Services a relay needs, shared across all chats.
#[derive(Clone)]
pub struct RelayServices {
    /// Per-chat mode state
    pub sessions: Arc<dyn SessionStore>,
    /// Grammar checker
    pub grammar: Arc<dyn GrammarChecker>,
    /// Completion provider
    pub completion: Arc<dyn CompletionProvider>,
}

/// Summary of one relay run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Findings included in the grammar report
    pub reported_matches: usize,
    /// The grammar check itself failed
    pub grammar_failed: bool,
    /// The completion call succeeded
    pub completion_ok: bool,
}

/// Text shown instead of the report when the grammar check fails.
#[must_use]
pub fn grammar_failure_notice(err: &GrammarError) -> String {
    format!("⚠️ Grammar check failed: {err}")
}

/// Text shown instead of the reply when the completion fails.
#[must_use]
pub fn render_completion_error(err: &LlmError) -> String {
    format!("❌ {err}")
}

/// Relays one freeform chat message.
///
/// Order is fixed: grammar report (only when there are findings), working
/// notice, completion reply. Failures to send the report or the notice are
/// logged and skipped; downstream failures become user-visible text.
///
/// # Errors
///
/// Returns an error only if the final reply cannot be sent.
pub async fn relay_message<T>(
    services: &RelayServices,
    transport: &T,
    chat: ChatKey,
    text: &str,
) -> Result<RelayOutcome>
where
    T: RelayTransport + ?Sized,
{
    let mut outcome = RelayOutcome::default();
    let system_prompt = services.sessions.get(chat).await;

    match services.grammar.check(text).await {
        Ok(matches) => {
            for part in build_report_parts(text, &matches, REPORT_PART_MAX_CHARS) {
                if let Err(e) = transport.send_grammar_report(&part).await {
                    warn!(chat_id = chat, error = %e, "Failed to send grammar report");
                }
            }
            outcome.reported_matches = matches.len();
        }
        Err(e) => {
            warn!(chat_id = chat, error = %e, "Grammar check failed");
            outcome.grammar_failed = true;
            if let Err(send_err) = transport.send_notice(&grammar_failure_notice(&e)).await {
                warn!(
                    chat_id = chat,
                    error = %send_err,
                    "Failed to send grammar failure notice"
                );
            }
        }
    }

    if let Err(e) = transport.send_notice(THINKING_NOTICE).await {
        warn!(chat_id = chat, error = %e, "Failed to send thinking notice");
    }

    let reply = match services.completion.chat_completion(&system_prompt, text).await {
        Ok(reply) => {
            outcome.completion_ok = true;
            reply
        }
        Err(e) => {
            warn!(chat_id = chat, error = %e, "Completion failed");
            render_completion_error(&e)
        }
    };

    transport.send_reply(&reply).await?;

    info!(
        chat_id = chat,
        matches = outcome.reported_matches,
        grammar_failed = outcome.grammar_failed,
        completion_ok = outcome.completion_ok,
        "Message relayed"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_tutor_core::grammar::GrammarMatch;
    use oxide_tutor_core::modes::Mode;
    use oxide_tutor_core::session::InMemorySessionStore;
    use oxide_tutor_core::testing::{
        mock_completion_missing_key, mock_completion_simple, mock_grammar_failing,
        mock_grammar_with,
    };
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        Report(String),
        Notice(String),
        Reply(String),
    }

    #[derive(Default)]
    struct DummyTransport {
        sent: Mutex<Vec<Sent>>,
        fail_report: bool,
    }

    #[async_trait]
    impl RelayTransport for DummyTransport {
        async fn send_grammar_report(&self, report: &str) -> Result<()> {
            if self.fail_report {
                anyhow::bail!("simulated markdown rejection");
            }
            self.sent.lock().await.push(Sent::Report(report.to_string()));
            Ok(())
        }

        async fn send_notice(&self, text: &str) -> Result<()> {
            self.sent.lock().await.push(Sent::Notice(text.to_string()));
            Ok(())
        }

        async fn send_reply(&self, text: &str) -> Result<()> {
            self.sent.lock().await.push(Sent::Reply(text.to_string()));
            Ok(())
        }
    }

    fn services(
        grammar: impl GrammarChecker + 'static,
        completion: impl CompletionProvider + 'static,
    ) -> RelayServices {
        RelayServices {
            sessions: Arc::new(InMemorySessionStore::default()),
            grammar: Arc::new(grammar),
            completion: Arc::new(completion),
        }
    }

    #[tokio::test]
    async fn report_then_notice_then_reply() -> Result<()> {
        let services = services(
            mock_grammar_with(vec![GrammarMatch::new(
                2,
                3,
                "Subject-verb agreement",
                &["have"],
            )]),
            mock_completion_simple("I have an apple!"),
        );
        let transport = DummyTransport::default();

        let outcome = relay_message(&services, &transport, 1, "I has a apple").await?;

        assert_eq!(outcome.reported_matches, 1);
        assert!(outcome.completion_ok);
        let sent = transport.sent.lock().await;
        assert_eq!(
            *sent,
            vec![
                Sent::Report(
                    "✏️ *Language check:*\n\n🔸 *has* → *have*\n_Subject-verb agreement_\n\n"
                        .to_string()
                ),
                Sent::Notice(THINKING_NOTICE.to_string()),
                Sent::Reply("I have an apple!".to_string()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn no_matches_means_no_report() -> Result<()> {
        let services = services(mock_grammar_with(Vec::new()), mock_completion_simple("Nice!"));
        let transport = DummyTransport::default();

        relay_message(&services, &transport, 1, "I have an apple").await?;

        let sent = transport.sent.lock().await;
        assert_eq!(
            *sent,
            vec![
                Sent::Notice(THINKING_NOTICE.to_string()),
                Sent::Reply("Nice!".to_string()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn grammar_failure_is_reported_and_relay_continues() -> Result<()> {
        let services = services(mock_grammar_failing(503), mock_completion_simple("Sure."));
        let transport = DummyTransport::default();

        let outcome = relay_message(&services, &transport, 1, "hello").await?;

        assert!(outcome.grammar_failed);
        assert!(outcome.completion_ok);
        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 3);
        assert!(matches!(
            &sent[0],
            Sent::Notice(n) if n.starts_with("⚠️ Grammar check failed: ") && n.contains("503")
        ));
        assert_eq!(sent[2], Sent::Reply("Sure.".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn failed_report_send_does_not_abort() -> Result<()> {
        let services = services(
            mock_grammar_with(vec![GrammarMatch::new(0, 1, "x", &[])]),
            mock_completion_simple("ok"),
        );
        let transport = DummyTransport {
            fail_report: true,
            ..DummyTransport::default()
        };

        let outcome = relay_message(&services, &transport, 1, "a *broken_ message").await?;

        assert!(outcome.completion_ok);
        let sent = transport.sent.lock().await;
        assert_eq!(sent.last(), Some(&Sent::Reply("ok".to_string())));
        Ok(())
    }

    #[tokio::test]
    async fn completion_failure_becomes_error_text() -> Result<()> {
        let services = services(mock_grammar_with(Vec::new()), mock_completion_missing_key());
        let transport = DummyTransport::default();

        let outcome = relay_message(&services, &transport, 1, "hi").await?;
        assert!(!outcome.completion_ok);

        // Later messages are still handled the same way
        relay_message(&services, &transport, 1, "hi again").await?;

        let sent = transport.sent.lock().await;
        let expected = Sent::Reply("❌ Error: OpenRouter API key not found.".to_string());
        assert_eq!(sent[1], expected);
        assert_eq!(sent[3], expected);
        Ok(())
    }

    #[tokio::test]
    async fn provider_status_becomes_descriptive_reply() -> Result<()> {
        let mut completion = oxide_tutor_core::llm::MockCompletionProvider::new();
        completion.expect_chat_completion().returning(|_, _| {
            Err(LlmError::Status {
                status: 402,
                body: "Insufficient credits".to_string(),
            })
        });
        let services = services(mock_grammar_with(Vec::new()), completion);
        let transport = DummyTransport::default();

        let outcome = relay_message(&services, &transport, 1, "hi").await?;

        assert!(!outcome.completion_ok);
        let sent = transport.sent.lock().await;
        assert_eq!(
            sent.last(),
            Some(&Sent::Reply("❌ Error 402: Insufficient credits".to_string()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn relay_uses_the_chat_prompt() -> Result<()> {
        let mut completion = oxide_tutor_core::llm::MockCompletionProvider::new();
        completion.expect_chat_completion().returning(|prompt, _| {
            Ok(Mode::from_prompt(prompt).map_or("?", Mode::name).to_string())
        });
        let services = services(mock_grammar_with(Vec::new()), completion);
        services.sessions.set(5, Mode::Examiner.prompt().to_string()).await;
        let transport = DummyTransport::default();

        relay_message(&services, &transport, 5, "Ask me something").await?;
        relay_message(&services, &transport, 6, "Ask me something").await?;

        let sent = transport.sent.lock().await;
        assert_eq!(sent[1], Sent::Reply("examiner".to_string()));
        assert_eq!(sent[3], Sent::Reply("teacher".to_string()));
        Ok(())
    }
}
