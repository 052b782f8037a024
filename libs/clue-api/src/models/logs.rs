use serde::{Deserialize, Serialize};

/// The `logs` field of `GET /api/logs` is either one newline separated
/// string or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogLines {
    Text(String),
    Lines(Vec<String>),
}

impl Default for LogLines {
    fn default() -> Self {
        LogLines::Lines(Vec::new())
    }
}

impl LogLines {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            LogLines::Lines(lines) => lines,
            LogLines::Text(text) => text
                .lines()
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// `GET /api/logs`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: LogLines,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// JSON payload of one `data:` event on `/api/logs/stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamPayload {
    Log { log: String },
    Error { error: String },
}
