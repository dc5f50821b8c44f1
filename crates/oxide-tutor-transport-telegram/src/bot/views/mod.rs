//! View layer for bot UI components
//!
//! Contains keyboards and text messages for the tutor commands.

use oxide_tutor_core::modes::{CurrentMode, Mode};
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

// ─────────────────────────────────────────────────────────────────────────────
// Trait definition
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for tutor UI view rendering
pub trait TutorView {
    /// Greeting sent on `/start`
    fn greeting() -> &'static str;

    /// Help text (legacy Markdown)
    fn help_text() -> &'static str;

    /// Prompt above the inline mode keyboard
    fn choose_mode_prompt() -> &'static str;

    /// Confirmation after a mode change
    fn mode_set(mode: Mode) -> String;

    /// `/setmode` without an argument
    fn missing_mode_argument() -> &'static str;

    /// `/setmode` with a name outside the registry
    fn unknown_mode() -> &'static str;

    /// Answer to `/currentmode`
    fn current_mode(current: CurrentMode) -> String;
}

// ─────────────────────────────────────────────────────────────────────────────
// Default implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Default implementation of `TutorView`: English replies, Russian help
pub struct DefaultTutorView;

impl TutorView for DefaultTutorView {
    fn greeting() -> &'static str {
        "👋 Hello! I'm your AI English companion bot.\n\nChoose a command from the menu below or type your message."
    }

    fn help_text() -> &'static str {
        concat!(
            "📖 *Справка по боту:*\n\n",
            "Я — твой AI-помощник для изучения английского. Вот что я умею:\n\n",
            "🗨️ /choosemode — выбрать режим общения:\n",
            "• *Teacher* — исправляет ошибки, даёт пояснения.\n",
            "• *Grammar* — проверяет грамматику.\n",
            "• *Translator* — переводит на русский.\n",
            "• *Examiner* — экзаменатор.\n",
            "• *Companion* — лёгкий разговорный собеседник.\n\n",
            "🎛️ /currentmode — узнать текущий режим.\n",
            "📑 /help — показать эту справку.\n",
            "🎛️ /start — перезапуск."
        )
    }

    fn choose_mode_prompt() -> &'static str {
        "📲 Choose a mode:"
    }

    fn mode_set(mode: Mode) -> String {
        format!("✅ Mode set to: {mode}")
    }

    fn missing_mode_argument() -> &'static str {
        "❗ Please specify a mode. Use /choosemode."
    }

    fn unknown_mode() -> &'static str {
        "❌ Unknown mode."
    }

    fn current_mode(current: CurrentMode) -> String {
        format!("ℹ️ Current mode: {current}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyboards
// ─────────────────────────────────────────────────────────────────────────────

/// Create the main reply keyboard
///
/// # Examples
///
/// ```
/// use oxide_tutor_transport_telegram::bot::views::main_menu_keyboard;
/// let keyboard = main_menu_keyboard();
/// assert_eq!(keyboard.keyboard.len(), 2);
/// ```
#[must_use]
pub fn main_menu_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("/start"), KeyboardButton::new("/help")],
        vec![
            KeyboardButton::new("/choosemode"),
            KeyboardButton::new("/currentmode"),
        ],
    ];
    KeyboardMarkup::new(keyboard).resize_keyboard()
}

/// Create the inline mode selection keyboard, one button per mode
#[must_use]
pub fn mode_keyboard() -> InlineKeyboardMarkup {
    let rows = Mode::ALL.into_iter().map(|mode| {
        vec![InlineKeyboardButton::callback(
            mode.label(),
            mode.callback_data(),
        )]
    });
    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn mode_keyboard_lists_registry_in_order() {
        let keyboard = mode_keyboard();
        let buttons: Vec<_> = keyboard.inline_keyboard.iter().flatten().collect();
        assert_eq!(buttons.len(), Mode::ALL.len());

        for (button, mode) in buttons.iter().zip(Mode::ALL) {
            assert_eq!(button.text, mode.label());
            match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => {
                    assert_eq!(data, &format!("setmode:{}", mode.name()));
                }
                other => panic!("unexpected button kind: {other:?}"),
            }
        }
    }

    #[test]
    fn main_keyboard_rows() {
        let keyboard = main_menu_keyboard();
        let labels: Vec<Vec<&str>> = keyboard
            .keyboard
            .iter()
            .map(|row| row.iter().map(|b| b.text.as_str()).collect())
            .collect();
        assert_eq!(
            labels,
            vec![vec!["/start", "/help"], vec!["/choosemode", "/currentmode"]]
        );
    }

    #[test]
    fn replies() {
        assert_eq!(
            DefaultTutorView::mode_set(Mode::Grammar),
            "✅ Mode set to: grammar"
        );
        assert_eq!(
            DefaultTutorView::current_mode(CurrentMode::Default),
            "ℹ️ Current mode: teacher (default)"
        );
        assert_eq!(
            DefaultTutorView::current_mode(CurrentMode::Custom),
            "ℹ️ Current mode: Custom / Unknown"
        );
        assert!(DefaultTutorView::help_text().starts_with("📖 *Справка"));
    }
}
