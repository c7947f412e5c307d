// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum SigBlastError {
    /// The query file does not exist or is not a readable file.
    FileNotFound(PathBuf),
    Io(io::Error),
    Http(String),
    Parse(String),
    /// The service accepted the request but reported a problem with it.
    Service(String),
}

impl SigBlastError {
    /// The line printed to the user when a search cannot be completed.
    pub fn user_message(&self) -> String {
        match self {
            SigBlastError::FileNotFound(_) => String::from("Error: FASTA file not found."),
            other => format!("An error occurred: {}", other),
        }
    }
}

// These allow conversion to SigBlastError, so that '?' works across the pipeline.

impl From<io::Error> for SigBlastError {
    fn from(e: io::Error) -> Self {
        SigBlastError::Io(e)
    }
}

impl From<serde_json::Error> for SigBlastError {
    fn from(e: serde_json::Error) -> Self {
        SigBlastError::Parse(e.to_string())
    }
}

impl From<ureq::Error> for SigBlastError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, response) => SigBlastError::Http(format!(
                "{} returned status {}",
                response.get_url(),
                code
            )),
            ureq::Error::Transport(t) => SigBlastError::Http(t.to_string()),
        }
    }
}

impl From<String> for SigBlastError {
    fn from(s: String) -> Self {
        SigBlastError::Service(s)
    }
}

impl fmt::Display for SigBlastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigBlastError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            SigBlastError::Io(e) => write!(f, "I/O error: {}", e),
            SigBlastError::Http(msg) => write!(f, "HTTP error: {}", msg),
            SigBlastError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SigBlastError::Service(msg) => write!(f, "BLAST service error: {}", msg),
        }
    }
}
