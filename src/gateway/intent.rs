//! Ordered classification rules: welcome > gratitude > risk > fallback.

use super::keywords::*;
use rust_decimal::Decimal;
use sigma_core::intent::{Content, Intent};
use std::str::FromStr;

/// Classify resolved message content.
///
/// Images always go to chart analysis, whatever the caption says. Text is
/// matched in a fixed order; anything unmatched is a general question and
/// keeps its original, untrimmed wording.
pub(crate) fn classify(content: Content) -> Intent {
    let text = match content {
        Content::Image(image_bytes) => return Intent::ChartAnalysis { image_bytes },
        Content::Text(text) => text,
    };

    let normalized = text.trim().to_lowercase();

    if is_start_command(&normalized) {
        return Intent::Welcome;
    }

    if GRATITUDE_KW.iter().any(|kw| normalized == *kw) {
        return Intent::Gratitude;
    }

    if RISK_TRIGGER_KW.iter().any(|kw| normalized.contains(kw)) {
        if let Some(balance) = last_number(&normalized) {
            return Intent::RiskQuery { balance };
        }
    }

    Intent::GeneralQuery { text }
}

/// `/start`, optionally addressed as `/start@botname`, with or without a
/// deep-link payload.
fn is_start_command(normalized: &str) -> bool {
    let command = normalized.split_whitespace().next().unwrap_or_default();
    command == START_COMMAND
        || command
            .strip_prefix(START_COMMAND)
            .is_some_and(|rest| rest.starts_with('@'))
}

/// Parse the last numeric token. `,` is read as a decimal point.
fn last_number(text: &str) -> Option<Decimal> {
    let token = numeric_tokens(text).pop()?;
    Decimal::from_str(&token.replace(',', ".")).ok()
}

/// Runs of ASCII digits, allowing one `.` or `,` between digits.
///
/// A `-` directly before a digit is kept as a sign unless it follows
/// another digit, so "-500" is negative while "10-15" is two tokens.
fn numeric_tokens(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let next_is_digit = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        let prev_is_digit = i > 0 && bytes[i - 1].is_ascii_digit();
        let is_sign = bytes[i] == b'-' && next_is_digit && !prev_is_digit;
        if !bytes[i].is_ascii_digit() && !is_sign {
            i += 1;
            continue;
        }

        let start = i;
        if is_sign {
            i += 1;
        }
        let mut seen_separator = false;
        while i < bytes.len() {
            let b = bytes[i];
            let next_is_digit = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
            if b.is_ascii_digit() {
                i += 1;
            } else if (b == b'.' || b == b',') && !seen_separator && next_is_digit {
                seen_separator = true;
                i += 1;
            } else {
                break;
            }
        }
        // Only ASCII bytes were consumed, so both ends are char boundaries.
        tokens.push(&text[start..i]);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Intent {
        classify(Content::Text(s.to_string()))
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_image_is_always_chart_analysis() {
        let intent = classify(Content::Image(vec![0xff, 0xd8]));
        assert_eq!(
            intent,
            Intent::ChartAnalysis {
                image_bytes: vec![0xff, 0xd8]
            }
        );
    }

    #[test]
    fn test_start_command() {
        assert_eq!(text("/start"), Intent::Welcome);
        assert_eq!(text("  /START@SigmaBot "), Intent::Welcome);
        assert_eq!(text("/start promo"), Intent::Welcome);
        assert!(matches!(text("/started"), Intent::GeneralQuery { .. }));
    }

    #[test]
    fn test_gratitude_exact_match_after_normalization() {
        assert_eq!(text("Спасибо"), Intent::Gratitude);
        assert_eq!(text("  СПАСИБО  "), Intent::Gratitude);
        assert_eq!(text("Thank you!"), Intent::Gratitude);
    }

    #[test]
    fn test_gratitude_inside_question_is_general() {
        assert_eq!(
            text("спасибо, а что по BTC?"),
            Intent::GeneralQuery {
                text: "спасибо, а что по BTC?".into()
            }
        );
    }

    #[test]
    fn test_risk_query_uses_last_number() {
        assert_eq!(
            text("хочу рассчитать риск для 500"),
            Intent::RiskQuery {
                balance: dec("500")
            }
        );
        assert_eq!(
            text("рассчитать баланс 2000"),
            Intent::RiskQuery {
                balance: dec("2000")
            }
        );
        assert_eq!(
            text("риск 2 сделки, баланс 1500"),
            Intent::RiskQuery {
                balance: dec("1500")
            }
        );
    }

    #[test]
    fn test_risk_query_decimal_comma_and_point() {
        assert_eq!(
            text("Рассчитай риск 1234,56"),
            Intent::RiskQuery {
                balance: dec("1234.56")
            }
        );
        assert_eq!(
            text("risk for 99.5"),
            Intent::RiskQuery {
                balance: dec("99.5")
            }
        );
    }

    #[test]
    fn test_risk_trigger_without_number_is_general() {
        let original = "Как рассчитать риск?";
        assert_eq!(
            text(original),
            Intent::GeneralQuery {
                text: original.into()
            }
        );
    }

    #[test]
    fn test_number_without_trigger_is_general() {
        assert!(matches!(
            text("что будет с BTC на 70000?"),
            Intent::GeneralQuery { .. }
        ));
    }

    #[test]
    fn test_unparseable_number_falls_through() {
        // 30 digits overflow Decimal.
        let huge = format!("риск {}", "9".repeat(30));
        assert!(matches!(text(&huge), Intent::GeneralQuery { .. }));
    }

    #[test]
    fn test_general_query_keeps_original_text() {
        assert_eq!(
            text("  Что такое RSI?  "),
            Intent::GeneralQuery {
                text: "  Что такое RSI?  ".into()
            }
        );
    }

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(numeric_tokens("a 1,5 b 20. c 3.1.4"), vec!["1,5", "20", "3.1", "4"]);
        assert_eq!(numeric_tokens("баланс: 1000$"), vec!["1000"]);
        assert_eq!(numeric_tokens("стоп 10-15, баланс -2,5"), vec!["10", "15", "-2,5"]);
        assert!(numeric_tokens("без цифр").is_empty());
    }

    #[test]
    fn test_negative_balance_keeps_sign() {
        assert_eq!(
            text("рассчитать риск, баланс -500"),
            Intent::RiskQuery {
                balance: dec("-500")
            }
        );
    }

    #[test]
    fn test_hyphenated_range_is_not_negative() {
        assert_eq!(
            text("риск 1-2"),
            Intent::RiskQuery {
                balance: dec("2")
            }
        );
    }
}
