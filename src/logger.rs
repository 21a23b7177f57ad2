use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

static STUDIO_LOGGER: Lazy<StudioLogger> = Lazy::new(StudioLogger::new);

/// Installs the logger, or reconfigures it when it is already installed.
pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    STUDIO_LOGGER.update_config(config.clone())?;

    if log::set_logger(&*STUDIO_LOGGER).is_err() {
        log::debug!("Logger already installed, configuration updated");
    }

    log::set_max_level(config.min_level.to_log_level_filter());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_log_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::Trace,
            LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warn,
            LogLevel::Error => Level::Error,
        }
    }

    pub fn to_log_level_filter(&self) -> log::LevelFilter {
        self.to_log_level().to_level_filter()
    }

    pub fn from_log_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub file: String,
    pub line: u32,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String, module: String, file: String, line: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            message,
            module,
            file,
            line,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_file_location: bool,
    pub show_module: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_to_file: bool,
    pub log_file_path: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_file_location: false,
            show_module: false,
            include_timestamp: true,
            timestamp_format: "%H:%M:%S".to_string(),
            output_json: false,
            log_to_file: false,
            log_file_path: "veogen.log".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_to_file = true;
        self.log_file_path = path.to_string();
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    /// JSON lines for log collectors. File output stays opt-in.
    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_colors: true,
            show_emojis: true,
            show_module: true,
            show_file_location: true,
            ..Default::default()
        }
    }
}

/// Writes to stderr so stdout stays free for command output.
pub struct StudioLogger {
    config: Arc<Mutex<LoggerConfig>>,
    log_file: Arc<Mutex<Option<File>>>,
}

impl StudioLogger {
    pub fn new() -> Self {
        Self {
            config: Arc::new(Mutex::new(LoggerConfig::default())),
            log_file: Arc::new(Mutex::new(None)),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) -> Result<(), String> {
        let file = if new_config.log_to_file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&new_config.log_file_path)
                .map_err(|e| format!("Failed to open {}: {}", new_config.log_file_path, e))?;
            Some(file)
        } else {
            None
        };

        // Never hold both locks: `log` takes config first, then the file.
        {
            let mut log_file = self
                .log_file
                .lock()
                .map_err(|e| format!("Logger file lock poisoned: {}", e))?;
            *log_file = file;
        }

        let mut config = self
            .config
            .lock()
            .map_err(|e| format!("Logger config lock poisoned: {}", e))?;
        *config = new_config;
        Ok(())
    }

    fn format_console_output(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        let mut output = String::new();

        if config.include_timestamp {
            let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
            if config.show_colors {
                output.push_str(&format!("{} ", timestamp.bright_black()));
            } else {
                output.push_str(&format!("{} ", timestamp));
            }
        }

        let level_str = if config.show_emojis {
            format!("{} {}", entry.level.emoji(), entry.level.as_str())
        } else {
            entry.level.as_str().to_string()
        };
        if config.show_colors {
            output.push_str(&format!(
                "[{}] ",
                level_str.color(entry.level.color()).bold()
            ));
        } else {
            output.push_str(&format!("[{}] ", level_str));
        }

        if config.show_module && !entry.module.is_empty() {
            if config.show_colors {
                output.push_str(&format!("{}::", entry.module.bright_blue()));
            } else {
                output.push_str(&format!("{}::", entry.module));
            }
        }

        if config.show_colors {
            output.push_str(&entry.message.white().bold().to_string());
        } else {
            output.push_str(&entry.message);
        }

        if config.show_file_location {
            let location = format!("{}:{}", entry.file, entry.line);
            if config.show_colors {
                output.push_str(&format!(" ({})", location.bright_black()));
            } else {
                output.push_str(&format!(" ({})", location));
            }
        }

        output
    }

    fn render(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            serde_json::to_string(entry).unwrap_or_default()
        } else {
            self.format_console_output(entry, config)
        }
    }

    fn write_to_file(&self, entry: &LogEntry, config: &LoggerConfig) {
        if let Ok(mut log_file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *log_file_guard {
                let plain = LoggerConfig {
                    show_colors: false,
                    ..config.clone()
                };
                let content = self.render(entry, &plain) + "\n";
                let _ = file.write_all(content.as_bytes());
            }
        }
    }

    fn create_log_entry(&self, record: &Record) -> LogEntry {
        LogEntry::new(
            LogLevel::from_log_level(record.level()),
            record.args().to_string(),
            record.module_path().unwrap_or("unknown").to_string(),
            record.file().unwrap_or("unknown").to_string(),
            record.line().unwrap_or(0),
        )
    }
}

impl Default for StudioLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for StudioLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level.to_log_level(),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = self.create_log_entry(record);

        if let Ok(config) = self.config.lock() {
            eprintln!("{}", self.render(&entry, &config));
            if config.log_to_file {
                self.write_to_file(&entry, &config);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Ok(mut log_file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *log_file_guard {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long a scope took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting timer: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  '{}' finished in {:.1}s",
            self.name,
            self.elapsed().as_secs_f64()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str) {
    log::debug!("🚀 Starting {} v{}", app_name, version);
}

/// Logs the effective configuration without revealing the key.
pub fn log_config_info(config: &crate::config::Config) {
    log::debug!("⚙️  Configuration loaded:");
    log::debug!("   API base URL: {}", config.veo.base_url);
    log::debug!(
        "   Poll: every {}s, {}",
        config.veo.poll.interval.as_secs(),
        match config.veo.poll.max_attempts {
            Some(max) => format!("at most {} checks", max),
            None => "no limit".to_string(),
        }
    );
    log::debug!(
        "   Batch delay: {}s, status cleared after {}s",
        config.batch.item_delay.as_secs(),
        config.batch.status_clear_delay.as_secs()
    );
    log::debug!("   Output dir: {}", config.output_dir.display());
    log::debug!("   Credential file: {}", config.credential_path.display());
    log::debug!(
        "   API key from environment: {}",
        if config.api_key.is_some() { "✅" } else { "❌" }
    );
    log::debug!("   Locale: {}", config.locale);
}
