// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use itertools::Itertools;
use log::{debug, warn};

use crate::errors::SigBlastError;

// A BLAST query as read from disk. The text is sent to the service exactly as it was read; the
// headers are only used for logging.

#[derive(Debug)]
pub struct FastaQuery {
    pub text: String,
}

impl FastaQuery {
    pub fn new(text: impl Into<String>) -> Self {
        FastaQuery { text: text.into() }
    }

    pub fn headers(&self) -> Vec<&str> {
        self.text
            .lines()
            .filter_map(|l| l.strip_prefix('>'))
            .map(str::trim)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub fn read_fasta_query<P: AsRef<Path>>(path: P) -> Result<FastaQuery, SigBlastError> {
    let path = path.as_ref();
    if path.is_dir() {
        return Err(SigBlastError::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => {
            SigBlastError::FileNotFound(path.to_path_buf())
        }
        _ => SigBlastError::Io(e),
    })?;
    let query = FastaQuery::new(text);

    let headers = query.headers();
    if headers.is_empty() {
        warn!("{}: no FastA header found, sending contents as a bare sequence", path.display());
    } else {
        debug!(
            "{}: {} record(s): {}",
            path.display(),
            headers.len(),
            headers.iter().join(", ")
        );
    }
    Ok(query)
}
