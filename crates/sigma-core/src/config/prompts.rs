use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Closing line every chart analysis must carry.
pub const DISCLAIMER: &str =
    "\u{26a0}\u{fe0f} Это не финансовая рекомендация. Решения о сделках вы принимаете самостоятельно.";

/// Exact answer expected when the picture is not a trading chart.
pub const NOT_A_CHART: &str = "Пришлите, пожалуйста, скриншот торгового графика.";

/// Instruction templates and fixed reply texts.
///
/// Defaults are compiled in. Any subset can be overridden from a TOML file
/// whose keys match the field names; missing keys keep their default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// Domain-specialist template for free-form text questions.
    pub general_query: String,
    /// Structured trading-signal template for chart screenshots.
    pub chart_analysis: String,
    /// Reply to `/start`.
    pub welcome: String,
    /// Fixed acknowledgement for gratitude messages.
    pub gratitude: String,
    /// Interim notice while a chart is analysed.
    pub chart_notice: String,
    /// Interim notice while a text question is answered.
    pub thinking_notice: String,
    /// Apology when the AI backend times out.
    pub ai_timeout: String,
    /// Apology for any other AI failure.
    pub ai_error: String,
    /// Apology when the photo could not be fetched from the platform.
    pub download_error: String,
    /// Reply to a risk query. Placeholders: `{balance}`, `{percent}`, `{risk}`.
    pub risk_reply: String,
    /// Validation message for a zero or negative balance.
    pub risk_invalid: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            general_query: "Ты опытный трейдер, аналитик финансовых рынков и наставник по риск-менеджменту и психологии трейдинга.\n\
                            Отвечай только на вопросы о трейдинге, биржах, криптовалютах, техническом и фундаментальном анализе, управлении капиталом и психологии торговли.\n\
                            Если вопрос не относится к этим темам, вежливо откажись одной фразой и напомни, с чем ты можешь помочь.\n\
                            Отвечай коротко, по делу и с эмодзи.".into(),
            chart_analysis: format!(
                "Ты профессиональный трейдер и психолог. Проанализируй скриншот графика и ответь строго по шаблону:\n\
                 \u{1f4c8} Направление: LONG / SHORT / ВНЕ РЫНКА\n\
                 \u{1f3af} Точка входа: цена или зона входа\n\
                 \u{23f1} Длительность сделки: ожидаемое время удержания позиции\n\
                 \u{1f9e0} Обоснование: 2-3 коротких пункта\n\
                 \u{2705} Фильтр подтверждения: какое событие на графике должно подтвердить вход\n\
                 \u{1f4bc} Комментарий к балансу: если на скриншоте виден баланс, прокомментируй его и дай совет по риску; иначе напиши «баланс не виден».\n\
                 Последней строкой ответа всегда, без исключений, пиши: «{DISCLAIMER}»\n\
                 Если на изображении нет торгового графика, ответь только: «{NOT_A_CHART}»"
            ),
            welcome: "Привет! Я твой AI-помощник трейдера на Gemini. \u{1f680}\n\
                      Пришли мне скриншот графика, и я его проанализирую.\n\
                      Чтобы рассчитать риск на сделку, напиши, например: «рассчитать риск 1000».".into(),
            gratitude: "Рад помочь! Успешной торговли. \u{1f680}".into(),
            chart_notice: "\u{1f9d0} Анализирую график...".into(),
            thinking_notice: "\u{1f914} Думаю...".into(),
            ai_timeout: "\u{231b} AI-сервис не ответил вовремя. Попробуйте ещё раз чуть позже.".into(),
            ai_error: "\u{26a0}\u{fe0f} Не удалось получить ответ от AI-сервиса. Попробуйте ещё раз позже.".into(),
            download_error: "\u{26a0}\u{fe0f} Не удалось загрузить изображение. Отправьте его ещё раз.".into(),
            risk_reply: "\u{1f4b0} Баланс: {balance}\n\
                         \u{2696}\u{fe0f} Риск на сделку ({percent}%): {risk}\n\
                         Не рискуйте в одной сделке суммой больше этой.".into(),
            risk_invalid: "Баланс должен быть больше нуля. Пример: «рассчитать риск 1000».".into(),
        }
    }
}

impl Prompts {
    /// Load overrides from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        let path = Path::new(path);
        if !path.exists() {
            warn!("prompts file {} not found, using defaults", path.display());
            return Self::default();
        }
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to read {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_toml(&content) {
            Ok(prompts) => {
                info!("prompts loaded from {}", path.display());
                prompts
            }
            Err(e) => {
                warn!("failed to parse {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parse a TOML document of overrides.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
