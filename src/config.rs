// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde_json::Value;

use crate::blast::client::{
    DEFAULT_HITLIST_SIZE, DEFAULT_POLL_INTERVAL, DEFAULT_SERVICE_EXPECT, NCBI_BLAST_URL,
};
use crate::errors::SigBlastError;

pub const CONFIG_FILE_NAME: &str = ".sigblastconfig";

// Settings for talking to the BLAST service. Every key is optional; missing or ill-typed values
// fall back to the defaults.
//
// {
//   "url": "https://blast.ncbi.nlm.nih.gov/Blast.cgi",
//   "email": "me@example.org",
//   "tool": "sigblast",
//   "poll_interval": 60,
//   "hitlist_size": 50,
//   "expect": 10.0
// }

#[derive(Debug, Clone, PartialEq)]
pub struct SigBlastConfig {
    pub url: String,
    pub email: Option<String>,
    pub tool: Option<String>,
    pub poll_interval: Duration,
    pub hitlist_size: u32,
    pub expect: f64,
}

impl Default for SigBlastConfig {
    fn default() -> Self {
        SigBlastConfig {
            url: String::from(NCBI_BLAST_URL),
            email: None,
            tool: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            hitlist_size: DEFAULT_HITLIST_SIZE,
            expect: DEFAULT_SERVICE_EXPECT,
        }
    }
}

impl SigBlastConfig {
    pub fn from_file(path: &Path) -> Result<Self, SigBlastError> {
        let text = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        Ok(SigBlastConfig::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let defaults = SigBlastConfig::default();
        let string_at = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        SigBlastConfig {
            url: string_at("url").unwrap_or(defaults.url),
            email: string_at("email"),
            tool: string_at("tool"),
            poll_interval: value
                .get("poll_interval")
                .and_then(Value::as_u64)
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            hitlist_size: value
                .get("hitlist_size")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.hitlist_size),
            expect: value
                .get("expect")
                .and_then(Value::as_f64)
                .filter(|x| *x > 0.0)
                .unwrap_or(defaults.expect),
        }
    }
}

pub fn find_sigblast_config() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        let path = PathBuf::from(home).join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }
    None
}
