use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn form_log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs/nxgroup.log")
}

pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Destination for form lifecycle events. A sink without a state root drops
/// every line, which is what tests and one-shot library callers want.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    state_root: Option<PathBuf>,
}

impl LogSink {
    pub fn new(state_root: PathBuf) -> Self {
        Self {
            state_root: Some(state_root),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append("info", event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append("warn", event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.append("error", event, message);
    }

    fn append(&self, level: &str, event: &str, message: &str) {
        if let Some(root) = &self.state_root {
            append_form_log(root, level, event, message);
        }
    }
}

pub fn append_form_log(state_root: &Path, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": now_secs(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    let path = form_log_path(state_root);
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
