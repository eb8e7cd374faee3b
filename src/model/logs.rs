// Append-only remark channels embedded in a case record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four independent remark sequences attached to a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogChannel {
    Main,
    Internal,
    Igms,
    Ombudsman,
}

impl LogChannel {
    pub const ALL: [LogChannel; 4] = [
        LogChannel::Main,
        LogChannel::Internal,
        LogChannel::Igms,
        LogChannel::Ombudsman,
    ];

    /// Field holding this channel in a case document
    pub fn field(&self) -> &'static str {
        match self {
            LogChannel::Main => "mainLogs",
            LogChannel::Internal => "internalLogs",
            LogChannel::Igms => "igmsLogs",
            LogChannel::Ombudsman => "ombudsmanLogs",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogChannel::Main => "main",
            LogChannel::Internal => "internal",
            LogChannel::Igms => "igms",
            LogChannel::Ombudsman => "ombudsman",
        }
    }
}

impl fmt::Display for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(LogChannel::Main),
            "internal" => Ok(LogChannel::Internal),
            "igms" => Ok(LogChannel::Igms),
            "ombudsman" => Ok(LogChannel::Ombudsman),
            other => Err(format!(
                "unknown log channel '{other}' (expected main, internal, igms or ombudsman)"
            )),
        }
    }
}

/// A timestamped remark. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: DateTime<Utc>,
    pub remark: String,
}

impl LogEntry {
    pub fn new(date: DateTime<Utc>, remark: impl Into<String>) -> Self {
        Self {
            date,
            remark: remark.into(),
        }
    }
}
