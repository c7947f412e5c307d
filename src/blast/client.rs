// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::{fmt, io::Read, sync::OnceLock, thread, time::Duration};

use clap::ValueEnum;
use log::{debug, info};
use regex::Regex;

use crate::errors::SigBlastError;

pub const NCBI_BLAST_URL: &str = "https://blast.ncbi.nlm.nih.gov/Blast.cgi";
pub const DEFAULT_DATABASE: &str = "nt";
pub const DEFAULT_HITLIST_SIZE: u32 = 50;
pub const DEFAULT_SERVICE_EXPECT: f64 = 10.0;
// NCBI asks clients not to poll for a given RID more often than once a minute.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Program {
    #[clap(name = "blastn")]
    Blastn,
    #[clap(name = "blastp")]
    Blastp,
    #[clap(name = "blastx")]
    Blastx,
    #[clap(name = "tblastn")]
    Tblastn,
    #[clap(name = "tblastx")]
    Tblastx,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Program::Blastn => "blastn",
            Program::Blastp => "blastp",
            Program::Blastx => "blastx",
            Program::Tblastn => "tblastn",
            Program::Tblastx => "tblastx",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub program: Program,
    pub database: String,
    pub sequence: String,
    pub hitlist_size: u32,
    /// Cutoff applied by the service itself; distinct from the reporting threshold.
    pub expect: f64,
}

impl SearchRequest {
    /// Nucleotide query against the nucleotide collection, with the service's usual limits.
    pub fn blastn_nt(sequence: impl Into<String>) -> Self {
        SearchRequest {
            program: Program::Blastn,
            database: String::from(DEFAULT_DATABASE),
            sequence: sequence.into(),
            hitlist_size: DEFAULT_HITLIST_SIZE,
            expect: DEFAULT_SERVICE_EXPECT,
        }
    }
}

/// A remote alignment service. `qblast()` blocks until the results are available and returns a
/// handle on the report; dropping the handle releases the underlying connection.
pub trait AlignmentService {
    type Handle: Read;

    fn qblast(&self, request: &SearchRequest) -> Result<Self::Handle, SigBlastError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Waiting,
    Ready,
    Failed,
    Unknown,
}

// Request id and estimated time to completion (s), from the QBlastInfo block of a Put reply.
#[derive(Debug, PartialEq, Eq)]
pub struct QBlastInfo {
    pub rid: String,
    pub rtoe: u64,
}

static RID_RE: OnceLock<Regex> = OnceLock::new();
static RTOE_RE: OnceLock<Regex> = OnceLock::new();
static STATUS_RE: OnceLock<Regex> = OnceLock::new();
static ERROR_RE: OnceLock<Regex> = OnceLock::new();

// Constant patterns, so failing to compile one is a bug, not a runtime condition.
fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("invalid built-in pattern"))
}

pub fn parse_qblast_info(page: &str) -> Result<QBlastInfo, SigBlastError> {
    let rid = match cached_regex(&RID_RE, r"RID = (\S+)").captures(page) {
        Some(caps) => caps[1].to_string(),
        None => {
            // No RID: the page should say why.
            return Err(SigBlastError::Service(
                service_error_message(page)
                    .unwrap_or_else(|| String::from("No RID found in BLAST submission reply")),
            ));
        }
    };
    // A missing estimate is not fatal, we just start polling right away.
    let rtoe = cached_regex(&RTOE_RE, r"RTOE = (\d+)")
        .captures(page)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .unwrap_or(0);
    Ok(QBlastInfo { rid, rtoe })
}

pub fn parse_search_status(page: &str) -> SearchStatus {
    let status = cached_regex(&STATUS_RE, r"Status=(\w+)")
        .captures(page)
        .map(|caps| caps[1].to_string());
    match status.as_deref() {
        Some("WAITING") => SearchStatus::Waiting,
        Some("READY") => SearchStatus::Ready,
        Some("FAILED") => SearchStatus::Failed,
        _ => SearchStatus::Unknown,
    }
}

fn service_error_message(page: &str) -> Option<String> {
    cached_regex(&ERROR_RE, r#"class="error[^"]*"[^>]*>([^<]+)<"#)
        .captures(page)
        .map(|caps| caps[1].trim().to_string())
        .filter(|msg| !msg.is_empty())
}

/// The NCBI BLAST URL API: submit (Put), poll (Get SearchInfo), then fetch the JSON report.
pub struct NcbiWww {
    pub url: String,
    pub tool: String,
    pub email: Option<String>,
    pub poll_interval: Duration,
    agent: ureq::Agent,
}

impl NcbiWww {
    pub fn new(url: impl Into<String>) -> Self {
        NcbiWww {
            url: url.into(),
            tool: String::from(env!("CARGO_PKG_NAME")),
            email: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }

    fn submit(&self, request: &SearchRequest) -> Result<QBlastInfo, SigBlastError> {
        let program = request.program.to_string();
        let hitlist_size = request.hitlist_size.to_string();
        let expect = request.expect.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("CMD", "Put"),
            ("PROGRAM", program.as_str()),
            ("DATABASE", request.database.as_str()),
            ("QUERY", request.sequence.as_str()),
            ("HITLIST_SIZE", hitlist_size.as_str()),
            ("EXPECT", expect.as_str()),
            ("TOOL", self.tool.as_str()),
        ];
        if let Some(email) = &self.email {
            form.push(("EMAIL", email.as_str()));
        }
        let page = self.agent.post(&self.url).send_form(&form)?.into_string()?;
        parse_qblast_info(&page)
    }

    fn status(&self, rid: &str) -> Result<SearchStatus, SigBlastError> {
        let page = self
            .agent
            .get(&self.url)
            .query("CMD", "Get")
            .query("FORMAT_OBJECT", "SearchInfo")
            .query("RID", rid)
            .call()?
            .into_string()?;
        Ok(parse_search_status(&page))
    }

    fn wait_until_ready(&self, info: &QBlastInfo) -> Result<(), SigBlastError> {
        thread::sleep(Duration::from_secs(info.rtoe));
        loop {
            match self.status(&info.rid)? {
                SearchStatus::Ready => return Ok(()),
                SearchStatus::Waiting => {
                    debug!("{}: waiting", info.rid);
                    thread::sleep(self.poll_interval);
                }
                SearchStatus::Failed => {
                    return Err(SigBlastError::Service(format!("Search {} failed", info.rid)))
                }
                SearchStatus::Unknown => {
                    return Err(SigBlastError::Service(format!(
                        "Search {} expired or is unknown to the service",
                        info.rid
                    )))
                }
            }
        }
    }
}

impl Default for NcbiWww {
    fn default() -> Self {
        NcbiWww::new(NCBI_BLAST_URL)
    }
}

impl AlignmentService for NcbiWww {
    type Handle = Box<dyn Read + Send + Sync + 'static>;

    fn qblast(&self, request: &SearchRequest) -> Result<Self::Handle, SigBlastError> {
        info!(
            "Submitting {} search against {} to {}",
            request.program, request.database, self.url
        );
        let info = self.submit(request)?;
        info!("RID {}, estimated time to completion {}s", info.rid, info.rtoe);
        self.wait_until_ready(&info)?;
        let response = self
            .agent
            .get(&self.url)
            .query("CMD", "Get")
            .query("FORMAT_TYPE", "JSON2_S")
            .query("RID", &info.rid)
            .call()?;
        Ok(response.into_reader())
    }
}
