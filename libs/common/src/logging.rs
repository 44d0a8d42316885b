//! Unified logging module for CropSync services
//!
//! Provides console and daily-rolling file logging with a shared event format

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{
        self,
        format::Writer,
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Custom event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2026-08-06T00:50:44.809Z [INFO] Service started`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        // Format timestamp
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        // Format level with brackets and color
        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        // Format the event message and fields
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Global guards for keeping non-blocking writers alive
static GUARDS: OnceLock<Arc<Mutex<Vec<WorkerGuard>>>> = OnceLock::new();

// Custom daily rolling file writer with naming format: {YYYYMMDD}_{service}.log
struct DailyRollingWriter {
    service_name: String,
    log_dir: PathBuf,
    current_date: Arc<Mutex<String>>,
    current_file: Arc<Mutex<Option<File>>>,
}

impl DailyRollingWriter {
    fn new(service_name: String, log_dir: PathBuf) -> std::io::Result<Self> {
        let current_date = chrono::Local::now().format("%Y%m%d").to_string();
        let file_path = log_dir.join(format!("{}_{}.log", current_date, service_name));

        // Create log directory if it doesn't exist
        fs::create_dir_all(&log_dir)?;

        // Open or create the log file
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        Ok(Self {
            service_name,
            log_dir,
            current_date: Arc::new(Mutex::new(current_date)),
            current_file: Arc::new(Mutex::new(Some(file))),
        })
    }

    fn get_writer(&self) -> std::io::Result<std::sync::MutexGuard<'_, Option<File>>> {
        // Check if date has changed
        let today = chrono::Local::now().format("%Y%m%d").to_string();
        let mut current_date = self
            .current_date
            .lock()
            .map_err(|e| std::io::Error::other(format!("Mutex poisoned: {}", e)))?;

        if *current_date != today {
            // Date changed, rotate to new file
            let new_file_path = self
                .log_dir
                .join(format!("{}_{}.log", today, self.service_name));

            // Ensure directory exists (in case it was deleted)
            fs::create_dir_all(&self.log_dir)?;

            let new_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&new_file_path)?;

            *current_date = today;
            let mut current_file = self
                .current_file
                .lock()
                .map_err(|e| std::io::Error::other(format!("Mutex poisoned: {}", e)))?;
            *current_file = Some(new_file);
        }

        self.current_file
            .lock()
            .map_err(|e| std::io::Error::other(format!("Mutex poisoned: {}", e)))
    }
}

impl std::io::Write for DailyRollingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(ref mut file) = *self.get_writer()? {
            file.write(buf)
        } else {
            Ok(0)
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut file) = *self.get_writer()? {
            file.flush()
        } else {
            Ok(())
        }
    }
}

impl Clone for DailyRollingWriter {
    fn clone(&self) -> Self {
        Self {
            service_name: self.service_name.clone(),
            log_dir: self.log_dir.clone(),
            current_date: Arc::clone(&self.current_date),
            current_file: Arc::clone(&self.current_file),
        }
    }
}

// Newtype wrapper so the non-blocking writer can be handed to fmt::layer()
#[derive(Clone)]
struct NonBlockingHandle(tracing_appender::non_blocking::NonBlocking);

impl MakeWriter<'_> for NonBlockingHandle {
    type Writer = tracing_appender::non_blocking::NonBlocking;

    fn make_writer(&'_ self) -> Self::Writer {
        self.0.clone()
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name (e.g., "syncsrv", "cropctl")
    pub service_name: String,
    /// Base directory for logs
    pub log_dir: PathBuf,
    /// Default filter level when RUST_LOG is not set
    pub level: String,
    /// Enable file logging in addition to the console
    pub enable_file_log: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            log_dir: PathBuf::from("logs"),
            level: "info".to_string(),
            enable_file_log: true,
        }
    }
}

/// Initialize logging system with configuration
///
/// RUST_LOG takes precedence over the configured level. The console layer
/// uses the bracketed format with ANSI colors; the file layer writes the
/// same format without colors to `{log_dir}/{YYYYMMDD}_{service}.log`.
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = if let Ok(env_str) = std::env::var("RUST_LOG") {
        EnvFilter::new(env_str)
    } else {
        EnvFilter::new(format!("{},{}=debug", config.level, config.service_name))
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    // Console layer - bracketed format: 2026-08-06T00:50:44.809Z [INFO] message
    let console_layer = fmt::layer()
        .with_ansi(true)
        .event_format(BracketedLevelFormat)
        .boxed();

    let file_layer = if config.enable_file_log {
        let custom_writer =
            DailyRollingWriter::new(config.service_name.clone(), config.log_dir.clone())?;
        let (non_blocking, guard) = tracing_appender::non_blocking(custom_writer);

        // Store guard to prevent dropping
        let guards = GUARDS.get_or_init(|| Arc::new(Mutex::new(Vec::new())));
        match guards.lock() {
            Ok(mut guards) => guards.push(guard),
            Err(poisoned) => {
                eprintln!("Warning: GUARDS lock was poisoned, recovering...");
                poisoned.into_inner().push(guard);
            },
        }

        Some(
            fmt::layer()
                .with_writer(NonBlockingHandle(non_blocking))
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .boxed(),
        )
    } else {
        None
    };

    // Note: .with(Option<Layer>) acts as identity when None
    registry.with(console_layer).with(file_layer).init();

    tracing::info!("Logging: {} @ {:?}", config.service_name, config.log_dir);

    Ok(())
}

/// Simple init with just a level string
pub fn init(service_name: &str, level: &str) -> Result<(), Box<dyn std::error::Error>> {
    init_with_config(LogConfig {
        service_name: service_name.to_string(),
        level: level.to_string(),
        ..Default::default()
    })
}

// ============================================================================
// HTTP API Request Logging Middleware
// ============================================================================

/// HTTP API request logger middleware
///
/// Logs method, path, status and duration for every request on the
/// "api_access" target:
/// - **INFO level**: modifying requests only (POST/PUT/PATCH/DELETE)
/// - **DEBUG level**: all requests
///
/// # Usage
///
/// Add this middleware to your Axum router **before** `.with_state()`:
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use common::logging::http_request_logger;
///
/// let app = Router::new()
///     // ... routes ...
///     .layer(middleware::from_fn(http_request_logger))
///     .with_state(state);
/// ```
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use std::time::Instant;
    use tracing::{debug, info};

    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    if matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE") {
        info!(
            target: "api_access",
            method = %method,
            path = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request"
        );
    } else {
        debug!(
            target: "api_access",
            method = %method,
            path = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request"
        );
    }

    response
}
