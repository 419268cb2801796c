//! Static keyword tables for intent classification.
//!
//! Matching is done on trimmed, lowercased text, so every entry here must
//! already be lowercase.

/// Whole-message phrases acknowledged with the fixed gratitude reply.
/// Compared for equality, not containment: "спасибо, а что по BTC?" is a
/// question, not a thank-you.
pub(super) const GRATITUDE_KW: &[&str] = &[
    "спасибо",
    "спасибо!",
    "спасибо.",
    "спасибо большое",
    "спасибо большое!",
    "большое спасибо",
    "большое спасибо!",
    "спасибки",
    "спс",
    "благодарю",
    "благодарю!",
    "мерси",
    "thanks",
    "thanks!",
    "thank you",
    "thank you!",
    "thx",
];

/// Substrings that mark a position-sizing request. A match only counts when
/// the message also carries a number.
pub(super) const RISK_TRIGGER_KW: &[&str] = &[
    "рассчитать",
    "рассчитай",
    "посчитать",
    "посчитай",
    "риск",
    "баланс",
    "депозит",
    "размер позиции",
    "risk",
    "balance",
    "position size",
];

/// Bot command that triggers the welcome reply.
pub(super) const START_COMMAND: &str = "/start";
