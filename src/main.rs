mod api;
mod gateway;

use clap::{Parser, Subcommand};
use sigma_channels::telegram::TelegramChannel;
use sigma_core::{
    auth::AccessPolicy,
    config::{self, Config, Prompts, SigmaConfig},
    traits::{Channel, Provider},
};
use sigma_providers::{gemini::GeminiProvider, retry::RetryingProvider};
use sigma_quant::RiskCalculator;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, fmt::MakeWriter, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "sigma",
    version,
    about = "Σ Sigma: Telegram trading assistant backed by Gemini"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "SIGMA_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration and provider availability.
    Status,
    /// Run one text message through the router and print the reply.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config decides the log level, so loading logs through a temporary
    // stderr subscriber until the real one is installed.
    let cfg = with_bootstrap_logging(default_filter("info"), std::io::stderr, || {
        config::load_with_env(&cli.config)
    })?;
    let _log_guard = init_tracing(&cfg.sigma);

    match cli.command {
        Commands::Start => {
            cfg.validate()?;

            let provider = build_provider(&cfg)?;
            let channel: Arc<dyn Channel> =
                Arc::new(TelegramChannel::new(cfg.channel.telegram.clone()));
            let access = Arc::new(AccessPolicy::from_config(&cfg.channel.telegram));
            let prompts = Prompts::load(cfg.sigma.prompts_path.as_deref());

            info!("{} starting...", cfg.sigma.name);
            let gw = Arc::new(gateway::Gateway::new(
                provider,
                channel,
                access,
                cfg.auth.clone(),
                cfg.health.clone(),
                prompts,
                RiskCalculator::new(cfg.risk.fraction),
                cfg.provider.gemini.chart_model.clone(),
            ));
            gw.run().await?;
        }
        Commands::Status => {
            println!("{} - Status Check\n", cfg.sigma.name);
            println!("Config: {}", cli.config);
            match cfg.validate() {
                Ok(()) => println!("Config: valid"),
                Err(e) => println!("Config: {e}"),
            }
            println!();

            let tg = &cfg.channel.telegram;
            println!(
                "  telegram: {}",
                if tg.bot_token.is_empty() {
                    "missing bot_token"
                } else {
                    "configured"
                }
            );
            println!("  authorized senders: {}", tg.allowed_users.len());

            match build_provider(&cfg) {
                Ok(provider) => {
                    let available = provider.is_available().await;
                    println!(
                        "  gemini ({}): {}",
                        cfg.provider.gemini.model,
                        if available { "available" } else { "unreachable" }
                    );
                }
                Err(e) => println!("  gemini: {e}"),
            }

            println!(
                "  liveness: {}",
                if cfg.health.enabled {
                    format!("{}:{}", cfg.health.host, cfg.health.port)
                } else {
                    "disabled".to_string()
                }
            );
        }
        Commands::Ask { message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: sigma ask <message>");
            }

            let provider = build_provider(&cfg)?;
            let prompts = Prompts::load(cfg.sigma.prompts_path.as_deref());
            let risk = RiskCalculator::new(cfg.risk.fraction);

            let reply = gateway::ask(provider.as_ref(), &prompts, &risk, message.join(" ")).await;
            println!("{reply}");
        }
    }

    Ok(())
}

/// `RUST_LOG` if set, otherwise `level`.
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Run `f` with a scoped subscriber writing to `make_writer`.
fn with_bootstrap_logging<W, T>(filter: EnvFilter, make_writer: W, f: impl FnOnce() -> T) -> T
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

/// Console logging always; a daily-rotated file as well when `log_dir` is set.
///
/// `RUST_LOG` wins over the configured level. The returned guard flushes the
/// file writer and must live until exit.
fn init_tracing(cfg: &SigmaConfig) -> Option<WorkerGuard> {
    let filter = default_filter(&cfg.log_level);
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    match cfg.log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "sigma.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Build the Gemini provider wrapped in the retry decorator.
fn build_provider(cfg: &Config) -> anyhow::Result<Arc<dyn Provider>> {
    let gemini = &cfg.provider.gemini;
    let inner: Arc<dyn Provider> = Arc::new(GeminiProvider::new(gemini)?);
    Ok(Arc::new(RetryingProvider::new(
        inner,
        gemini.max_retries,
        Duration::from_millis(gemini.retry_base_ms),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_env_override_warnings_reach_bootstrap_log() {
        let captured = Captured::default();
        let sink = captured.clone();

        let mut cfg = Config::default();
        with_bootstrap_logging(EnvFilter::new("warn"), move || sink.clone(), || {
            cfg.apply_env_overrides(|key| match key {
                config::ENV_PORT => Some("notaport".into()),
                config::ENV_ALLOWED_USERS => Some("1,abc".into()),
                _ => None,
            })
        });

        let log = captured.text();
        assert!(log.contains("ignoring invalid PORT 'notaport'"), "log: {log}");
        assert!(log.contains("ignoring invalid user id 'abc'"), "log: {log}");
        assert_eq!(cfg.health.port, 8080);
        assert_eq!(cfg.channel.telegram.allowed_users, vec![1]);
    }

    #[test]
    fn test_bootstrap_load_missing_file_uses_defaults() {
        let cfg = with_bootstrap_logging(EnvFilter::new("off"), std::io::sink, || {
            config::load("/nonexistent/__sigma_config__.toml")
        })
        .unwrap();
        assert_eq!(cfg.sigma.name, Config::default().sigma.name);
    }
}
