//! Observability: tracing init and the per-request usage log.
//!
//! Uses config::ObservabilityConfig for SKILLRELAY_QUIET, LOG_LEVEL, LOG_JSON and USAGE_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;
use tracing_subscriber::{prelude::*, EnvFilter};

static USAGE_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call at process startup.
/// When SKILLRELAY_QUIET=1 only WARN and above are logged.
/// Logs go to stderr so stdout stays free for command output.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "skillrelay=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn get_usage_path() -> Option<String> {
    {
        let guard = USAGE_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = crate::config::ObservabilityConfig::from_env()
        .usage_log
        .clone()?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = USAGE_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl(path: &Path, record: &Value) -> std::io::Result<()> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(record)?;
    writeln!(f, "{}", line)
}

/// Stamp `record` with a `ts` field (RFC 3339, UTC) when it is a JSON object.
fn stamped(record: &Value) -> Value {
    let mut record = record.clone();
    if let Value::Object(ref mut map) = record {
        map.insert("ts".to_string(), Value::String(Utc::now().to_rfc3339()));
    }
    record
}

/// Usage: append one record per chat call when SKILLRELAY_USAGE_LOG is set.
/// Write failures are logged and otherwise ignored.
pub fn record_usage(record: &Value) {
    let Some(path) = get_usage_path() else {
        return;
    };
    if let Err(e) = append_jsonl(Path::new(&path), &stamped(record)) {
        tracing::warn!(path = %path, error = %e, "failed to append usage record");
    }
}
