//! Default value functions used by serde for config deserialization.

use rust_decimal::Decimal;

pub fn default_name() -> String {
    "Sigma \u{03a3}".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_deny_message() -> String {
    "\u{26d4} Доступ запрещён. Этот бот работает только для авторизованных пользователей.".to_string()
}

pub fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

pub fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub fn default_ai_timeout_secs() -> u64 {
    60
}

pub fn default_max_retries() -> u32 {
    2
}

pub fn default_retry_base_ms() -> u64 {
    1000
}

pub fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

pub fn default_poll_timeout_secs() -> u64 {
    30
}

pub fn default_health_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_health_port() -> u16 {
    8080
}

/// 1% of the balance per trade.
pub fn default_risk_fraction() -> Decimal {
    Decimal::new(1, 2)
}
