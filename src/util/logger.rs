use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const FILE_STEM: &str = "food-platform";

/// Installs the global subscriber. Keep the value alive for the life of the
/// process or buffered file output is lost.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let guards = Self::setup_logging(Path::new(&log_dir))?;
        Ok(Logger { guards })
    }

    fn setup_logging(dir: &Path) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
        let error_dir = dir.join("error");
        std::fs::create_dir_all(error_dir.join("json"))?;
        std::fs::create_dir_all(dir.join("json"))?;

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,food_platform=debug,tower_http=debug"));
        let file_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        let (general, g1) = non_blocking(rolling::daily(dir, format!("{}.log", FILE_STEM)));
        let (errors, g2) = non_blocking(rolling::daily(&error_dir, format!("{}-error.log", FILE_STEM)));
        let (general_json, g3) = non_blocking(rolling::daily(dir.join("json"), format!("{}.json", FILE_STEM)));
        let (errors_json, g4) = non_blocking(rolling::daily(error_dir.join("json"), format!("{}-error.json", FILE_STEM)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_filter(console_filter),
            )
            .with(
                fmt::layer()
                    .with_writer(general)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&file_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(errors)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(&error_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(general_json)
                    .with_thread_ids(true)
                    .with_filter(EnvFilter::new(&file_level)),
            )
            .with(
                fmt::layer()
                    .json()
                    .with_writer(errors_json)
                    .with_thread_ids(true)
                    .with_filter(EnvFilter::new(&error_level)),
            )
            .try_init()?;

        Ok(vec![g1, g2, g3, g4])
    }
}
