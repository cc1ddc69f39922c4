use std::collections::VecDeque;
use std::env;
use std::fmt::Debug;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use directories::BaseDirs;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

const BUFFER_ENTRIES: usize = 200;
const JSON_LOG_ENV: &str = "DOTFILES_JSON_LOG";
const DEBUG_ENV: &str = "DEBUG_DOTFILES";
const LOG_SOURCE: &str = "homeflake";

/// Installs the global subscriber. The terminal belongs to the TUI while it
/// runs, so nothing is printed directly: warnings are buffered for replay
/// and, when enabled, every event goes to the shared JSONL log.
pub fn init() -> LogBuffer {
    let log_buffer = LogBuffer::new(BUFFER_ENTRIES);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(env::var(DEBUG_ENV).ok())));
    let json_layer = if env::var(JSON_LOG_ENV).as_deref() == Ok("1") {
        default_json_log_path().map(JsonFileLayer::new)
    } else {
        None
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(LogLayer::new(log_buffer.clone(), Level::WARN))
        .with(json_layer)
        .init();
    log_buffer
}

pub fn replay_to_stderr(buffer: &LogBuffer) {
    for entry in buffer.entries() {
        eprintln!("{}", entry.format_compact());
    }
}

fn default_directive(debug: Option<String>) -> &'static str {
    let level = debug
        .and_then(|value| value.trim().parse::<i32>().ok())
        .unwrap_or(0);
    if level > 0 { "debug" } else { "info" }
}

fn default_json_log_path() -> Option<PathBuf> {
    let state_home = env::var_os("XDG_STATE_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            let dirs = BaseDirs::new()?;
            Some(
                dirs.state_dir()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| dirs.home_dir().join(".local").join("state")),
            )
        })?;
    Some(state_home.join("dotfiles").join("logs").join("dotfiles.jsonl"))
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    pub target: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn message(&self) -> &str {
        self.fields
            .iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    pub fn format_compact(&self) -> String {
        let mut extras: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, _)| name != "message")
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        extras.sort();
        if extras.is_empty() {
            format!(
                "{} {:<5} {} {}",
                self.timestamp,
                self.level,
                self.target,
                self.message()
            )
        } else {
            format!(
                "{} {:<5} {} {} | {}",
                self.timestamp,
                self.level,
                self.target,
                self.message(),
                extras.join(" ")
            )
        }
    }

    /// One record of the JSONL schema shared with the shell and editor tooling.
    pub fn to_json(&self, session: &str) -> Value {
        let mut object = Map::new();
        object.insert("ts".into(), Value::String(self.timestamp.clone()));
        object.insert("level".into(), Value::String(self.level.to_string()));
        object.insert("component".into(), Value::String(self.target.clone()));
        object.insert("msg".into(), Value::String(self.message().to_string()));
        object.insert("source".into(), Value::String(LOG_SOURCE.to_string()));
        object.insert("pid".into(), Value::from(std::process::id()));
        object.insert("session".into(), Value::String(session.to_string()));
        for (name, value) in &self.fields {
            if name != "message" && !object.contains_key(name) {
                object.insert(name.clone(), Value::String(value.clone()));
            }
        }
        Value::Object(object)
    }
}

#[derive(Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
}

impl LogBuffer {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            max_entries,
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn push(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push_back(entry);
            while entries.len() > self.max_entries {
                entries.pop_front();
            }
        }
    }
}

/// Keeps events at or above `threshold` in a [`LogBuffer`].
#[derive(Clone)]
pub struct LogLayer {
    buffer: LogBuffer,
    threshold: Level,
}

impl LogLayer {
    pub fn new(buffer: LogBuffer, threshold: Level) -> Self {
        Self { buffer, threshold }
    }
}

impl<S> Layer<S> for LogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() > self.threshold {
            return;
        }
        self.buffer.push(capture(event, format_clock));
    }
}

/// Appends every event to a JSONL file; write failures are dropped.
pub struct JsonFileLayer {
    path: PathBuf,
    session: String,
}

impl JsonFileLayer {
    pub fn new(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        Self {
            path,
            session: uuid::Uuid::new_v4().to_string(),
        }
    }

    fn append(&self, line: &str) {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path);
        if let Ok(mut file) = file {
            let _ = writeln!(file, "{line}");
        }
    }
}

impl<S> Layer<S> for JsonFileLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let entry = capture(event, format_rfc3339);
        self.append(&entry.to_json(&self.session).to_string());
    }
}

fn capture(event: &Event<'_>, timestamp: fn(OffsetDateTime) -> String) -> LogEntry {
    let mut visitor = LogVisitor::default();
    event.record(&mut visitor);
    let metadata = event.metadata();
    LogEntry {
        timestamp: timestamp(OffsetDateTime::now_utc()),
        level: *metadata.level(),
        target: metadata.target().to_string(),
        fields: visitor.fields,
    }
}

#[derive(Default)]
struct LogVisitor {
    fields: Vec<(String, String)>,
}

impl LogVisitor {
    fn push(&mut self, field: &tracing::field::Field, value: String) {
        self.fields.push((field.name().to_string(), value));
    }
}

impl tracing::field::Visit for LogVisitor {
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.push(field, value.to_string());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.push(field, value.to_string());
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn Debug) {
        self.push(field, format!("{value:?}"));
    }
}

fn format_clock(timestamp: OffsetDateTime) -> String {
    time::format_description::parse("[hour repr:24]:[minute]:[second]")
        .ok()
        .and_then(|format| timestamp.format(&format).ok())
        .unwrap_or_else(|| timestamp.unix_timestamp().to_string())
}

fn format_rfc3339(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| timestamp.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LogEntry {
        LogEntry {
            timestamp: "12:34:56".to_string(),
            level: Level::WARN,
            target: "homeflake_core::runner".to_string(),
            fields: vec![
                ("message".to_string(), "Flake install failed".to_string()),
                ("flake".to_string(), "web".to_string()),
            ],
        }
    }

    #[test]
    fn format_compact_includes_fields() {
        let formatted = entry().format_compact();
        assert!(formatted.contains("12:34:56"));
        assert!(formatted.contains("WARN"));
        assert!(formatted.contains("homeflake_core::runner"));
        assert!(formatted.contains("Flake install failed"));
        assert!(formatted.contains("flake=web"));
    }

    #[test]
    fn json_record_uses_shared_schema() {
        let value = entry().to_json("abc");
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["component"], "homeflake_core::runner");
        assert_eq!(value["msg"], "Flake install failed");
        assert_eq!(value["source"], "homeflake");
        assert_eq!(value["session"], "abc");
        assert_eq!(value["flake"], "web");
        assert!(value["pid"].is_u64());
    }

    #[test]
    fn buffer_keeps_latest_entries() {
        let buffer = LogBuffer::new(2);
        for index in 0..3 {
            let mut item = entry();
            item.timestamp = index.to_string();
            buffer.push(item);
        }
        let stamps: Vec<_> = buffer.entries().into_iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn debug_env_raises_default_level() {
        assert_eq!(default_directive(None), "info");
        assert_eq!(default_directive(Some("0".into())), "info");
        assert_eq!(default_directive(Some("2".into())), "debug");
        assert_eq!(default_directive(Some("yes".into())), "info");
    }
}
