// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::io::Read;

use log::debug;
use serde::Deserialize;

use crate::errors::SigBlastError;

// The result of one BLAST search, i.e. one query against one database. Alignments and their HSPs
// are kept in the order the service returned them.

#[derive(Debug, Clone, Default)]
pub struct AlignmentRecord {
    pub program: String,
    pub database: String,
    pub query_id: String,
    pub query_title: String,
    pub query_length: u64,
    pub alignments: Vec<Alignment>,
}

#[derive(Debug, Clone, Default)]
pub struct Alignment {
    /// "<hit_id> <hit_def>", as in the classic XML report.
    pub title: String,
    pub hit_id: String,
    pub hit_def: String,
    pub accession: String,
    pub length: u64,
    pub hsps: Vec<Hsp>,
}

#[derive(Debug, Clone, Default)]
pub struct Hsp {
    pub expect: f64,
    pub score: f64,
    pub bits: f64,
    pub identities: u64,
    pub gaps: u64,
    pub align_length: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub sbjct_start: u64,
    pub sbjct_end: u64,
    pub query: String,
    pub match_: String,
    pub sbjct: String,
}

impl AlignmentRecord {
    /// Reads a report that must contain exactly one search. The handle is consumed (and thus
    /// released) before this returns.
    pub fn read<R: Read>(handle: R) -> Result<AlignmentRecord, SigBlastError> {
        let mut records = AlignmentRecord::parse_all(handle)?;
        match records.len() {
            1 => Ok(records.remove(0)),
            0 => Err(SigBlastError::Parse(String::from("No BLAST report found"))),
            n => Err(SigBlastError::Parse(format!(
                "Expected a single BLAST report, found {}",
                n
            ))),
        }
    }

    /// Reads every search in a single-file JSON (JSON2_S) BLAST report.
    pub fn parse_all<R: Read>(handle: R) -> Result<Vec<AlignmentRecord>, SigBlastError> {
        let output: BlastOutput = serde_json::from_reader(handle)?;
        let records: Vec<AlignmentRecord> = output
            .blast_output2
            .into_iter()
            .map(|entry| AlignmentRecord::from(entry.report))
            .collect();
        debug!("Parsed {} BLAST report(s)", records.len());
        Ok(records)
    }

    pub fn num_hsps(&self) -> usize {
        self.alignments.iter().map(|aln| aln.hsps.len()).sum()
    }
}

// Wire format. Only the fields we use are declared; serde ignores the rest.

#[derive(Debug, Deserialize)]
struct BlastOutput {
    #[serde(rename = "BlastOutput2")]
    blast_output2: Vec<ReportEntry>,
}

#[derive(Debug, Deserialize)]
struct ReportEntry {
    report: Report,
}

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    program: String,
    #[serde(default)]
    search_target: SearchTarget,
    results: Results,
}

#[derive(Debug, Default, Deserialize)]
struct SearchTarget {
    #[serde(default)]
    db: String,
}

#[derive(Debug, Deserialize)]
struct Results {
    search: Search,
}

#[derive(Debug, Deserialize)]
struct Search {
    #[serde(default)]
    query_id: String,
    #[serde(default)]
    query_title: String,
    #[serde(default)]
    query_len: u64,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    description: Vec<HitDescription>,
    len: u64,
    #[serde(default)]
    hsps: Vec<JsonHsp>,
}

#[derive(Debug, Deserialize)]
struct HitDescription {
    #[serde(default)]
    id: String,
    #[serde(default)]
    accession: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct JsonHsp {
    evalue: f64,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    bit_score: f64,
    #[serde(default)]
    identity: u64,
    #[serde(default)]
    gaps: u64,
    #[serde(default)]
    align_len: u64,
    #[serde(default)]
    query_from: u64,
    #[serde(default)]
    query_to: u64,
    #[serde(default)]
    hit_from: u64,
    #[serde(default)]
    hit_to: u64,
    qseq: String,
    midline: String,
    hseq: String,
}

impl From<Report> for AlignmentRecord {
    fn from(report: Report) -> Self {
        let search = report.results.search;
        AlignmentRecord {
            program: report.program,
            database: report.search_target.db,
            query_id: search.query_id,
            query_title: search.query_title,
            query_length: search.query_len,
            alignments: search.hits.into_iter().map(Alignment::from).collect(),
        }
    }
}

impl From<Hit> for Alignment {
    fn from(hit: Hit) -> Self {
        // The first description is the representative one; the others are identical sequences
        // merged into the same hit, and are appended to the definition line as " ><id> <title>".
        let mut descriptions = hit.description.into_iter();
        let (hit_id, mut hit_def, accession) = match descriptions.next() {
            Some(d) => (d.id, d.title, d.accession),
            None => (String::new(), String::new(), String::new()),
        };
        for d in descriptions {
            hit_def.push_str(&format!(" >{} {}", d.id, d.title));
        }
        let title = format!("{} {}", hit_id, hit_def).trim().to_string();
        Alignment {
            title,
            hit_id,
            hit_def,
            accession,
            length: hit.len,
            hsps: hit.hsps.into_iter().map(Hsp::from).collect(),
        }
    }
}

impl From<JsonHsp> for Hsp {
    fn from(h: JsonHsp) -> Self {
        Hsp {
            expect: h.evalue,
            score: h.score,
            bits: h.bit_score,
            identities: h.identity,
            gaps: h.gaps,
            align_length: h.align_len,
            query_start: h.query_from,
            query_end: h.query_to,
            sbjct_start: h.hit_from,
            sbjct_end: h.hit_to,
            query: h.qseq,
            match_: h.midline,
            sbjct: h.hseq,
        }
    }
}
