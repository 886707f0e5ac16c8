use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

const RESERVED_KEYS: [&str; 3] = ["type", "session_id", "ts"];

/// Append-only session journal (`events.jsonl`).
///
/// - every line carries `type`, `session_id`, `ts`
/// - payload keys are merged after the defaults; reserved keys are ignored
/// - one compact JSON object per line
///
/// A journal built with [`SessionJournal::in_memory`] keeps events in a
/// buffer instead of a file, which is what the one-shot commands and tests use.
#[derive(Debug, Clone)]
pub struct SessionJournal {
    inner: Arc<JournalInner>,
}

#[derive(Debug)]
struct JournalInner {
    path: Option<PathBuf>,
    session_id: String,
    buffer: Mutex<Vec<Value>>,
}

impl SessionJournal {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self::build(Some(path.into()), session_id.into())
    }

    pub fn in_memory(session_id: impl Into<String>) -> Self {
        Self::build(None, session_id.into())
    }

    fn build(path: Option<PathBuf>, session_id: String) -> Self {
        Self {
            inner: Arc::new(JournalInner {
                path,
                session_id,
                buffer: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn emit(&self, event_type: &str, payload: EventPayload) -> anyhow::Result<Value> {
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(event_type.to_string()));
        event.insert(
            "session_id".to_string(),
            Value::String(self.inner.session_id.clone()),
        );
        event.insert("ts".to_string(), Value::String(now_utc_iso()));
        for (key, value) in payload {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            event.insert(key, value);
        }
        let event = Value::Object(event);

        let mut buffer = self
            .inner
            .buffer
            .lock()
            .map_err(|_| anyhow::anyhow!("session journal lock poisoned"))?;
        if let Some(path) = self.inner.path.as_ref() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let line = serde_json::to_string(&event)?;
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        buffer.push(event.clone());

        Ok(event)
    }

    /// Events emitted through this handle (and its clones), oldest first.
    pub fn recorded(&self) -> Vec<Value> {
        self.inner
            .buffer
            .lock()
            .map(|buffer| buffer.clone())
            .unwrap_or_default()
    }

    pub fn recorded_types(&self) -> Vec<String> {
        self.recorded()
            .iter()
            .filter_map(|event| event.get("type").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

pub fn new_session_id() -> String {
    format!("session-{}", uuid::Uuid::new_v4().simple())
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
